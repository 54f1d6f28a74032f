//! Hydrometer readings carry no derived fields

use super::{Reduce, TestParameters};
use crate::measurement::SedimentationReading;

impl Reduce for SedimentationReading {
    fn reduce(&self, _preceding: &[Self], _parameters: &TestParameters) -> Self {
        *self
    }
}
