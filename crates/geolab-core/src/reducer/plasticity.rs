//! Plasticity chart transform
//!
//! Only `log10(blows)` is derived here; the limits themselves come from the
//! external compute step.

use super::{Reduce, TestParameters};
use crate::measurement::BlowCountPoint;

impl Reduce for BlowCountPoint {
    fn reduce(&self, _preceding: &[Self], _parameters: &TestParameters) -> Self {
        Self {
            log_blow_count: self
                .blow_count
                .filter(|&n| n > 0)
                .map(|n| f64::from(n).log10()),
            ..*self
        }
    }
}
