//! Bearing-ratio reference forces
//!
//! Penetration readings carry no derived field of their own. What the form
//! derives is the force at each reference penetration (2.5 mm and 5.0 mm by
//! default), picked from any reading within tolerance of the reference.

use super::{finite, Reduce, TestParameters};
use crate::config::BearingConfig;
use crate::measurement::BearingPoint;
use serde::{Deserialize, Serialize};

/// Absorbs representation error so that e.g. 2.4 mm sits within 0.1 mm of 2.5 mm
const TOLERANCE_SLACK: f64 = 1e-9;

impl Reduce for BearingPoint {
    fn reduce(&self, _preceding: &[Self], _parameters: &TestParameters) -> Self {
        *self
    }
}

/// Force recorded for a reference penetration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceForce {
    /// Reference penetration (mm)
    pub penetration_mm: f64,
    /// Force at the reference (kN), unset until a reading matches
    #[serde(rename = "forceKN")]
    pub force_kn: Option<f64>,
}

impl ReferenceForce {
    /// Reference with no force yet
    #[inline]
    #[must_use]
    pub fn unset(penetration_mm: f64) -> Self {
        Self {
            penetration_mm,
            force_kn: None,
        }
    }

    /// Force recorded for `penetration_mm`, if any
    #[must_use]
    pub fn lookup(references: &[ReferenceForce], penetration_mm: f64) -> Option<f64> {
        references
            .iter()
            .find(|r| (r.penetration_mm - penetration_mm).abs() < TOLERANCE_SLACK)
            .and_then(|r| r.force_kn)
    }
}

/// Extract the force at every configured reference penetration
///
/// `edited` is the index of the reading the operator just changed and
/// `current` the reference forces shown before the edit. For each reference:
/// - the edited reading wins when it lies within tolerance;
/// - otherwise the current force is kept while a matching reading still
///   carries it;
/// - otherwise the first matching reading in list order is taken;
/// - with no matching reading the current force is left as is.
#[must_use]
pub fn extract_references(
    points: &[BearingPoint],
    edited: Option<usize>,
    current: &[ReferenceForce],
    config: &BearingConfig,
) -> Vec<ReferenceForce> {
    config
        .references_mm
        .iter()
        .map(|&reference| {
            let previous = ReferenceForce::lookup(current, reference);
            let matching: Vec<(usize, f64)> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| within(p, reference, config.tolerance_mm))
                .filter_map(|(i, p)| finite(p.force_kn).map(|f| (i, f)))
                .collect();

            let force = edited
                .and_then(|e| matching.iter().find(|(i, _)| *i == e))
                .map(|&(_, f)| f)
                .or_else(|| {
                    previous.filter(|v| matching.iter().any(|(_, f)| f.to_bits() == v.to_bits()))
                })
                .or_else(|| matching.first().map(|&(_, f)| f))
                .or(previous);

            tracing::trace!(reference, ?force, candidates = matching.len(), "bearing reference");
            ReferenceForce {
                penetration_mm: reference,
                force_kn: force,
            }
        })
        .collect()
}

fn within(point: &BearingPoint, reference: f64, tolerance: f64) -> bool {
    finite(point.penetration_mm)
        .is_some_and(|p| (p - reference).abs() <= tolerance + TOLERANCE_SLACK)
}
