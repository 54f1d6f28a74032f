//! Compute readiness
//!
//! Whether a test has enough usable points for the external compute step to
//! produce results. Checked on reduced points.

use crate::config::BearingConfig;
use crate::measurement::MeasurementPoint;
use crate::reducer::extract_references;
use crate::types::{Test, TestType};
use serde::{Deserialize, Serialize};

/// Minimum complete compaction points
pub const MIN_COMPACTION_POINTS: usize = 3;

/// Minimum complete sieve rows
pub const MIN_SIEVE_ROWS: usize = 2;

/// Readiness verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum Readiness {
    /// Compute can run
    Ready,
    /// Compute would have too little data
    Missing(String),
}

impl Readiness {
    /// Check if compute can run
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Check whether `test` can be computed
#[must_use]
pub fn compute_readiness(test: &Test, bearing: &BearingConfig) -> Readiness {
    let points = test.reduced_points();
    let verdict = match test.test_type {
        TestType::Compaction => {
            let complete = points
                .iter()
                .filter_map(MeasurementPoint::as_compaction)
                .filter(|p| p.water_content.is_some() && p.dry_density.is_some())
                .count();
            at_least(complete, MIN_COMPACTION_POINTS, "points with water content and dry density")
        }
        TestType::ParticleSize => {
            if !test.parameters.total_dry_mass.is_some_and(|m| m > 0.0) {
                Readiness::Missing("a positive total dry mass".to_string())
            } else {
                let complete = points
                    .iter()
                    .filter_map(MeasurementPoint::as_sieve_row)
                    .filter(|r| r.sieve_size_mm.is_some() && r.retained_mass.is_some())
                    .count();
                at_least(complete, MIN_SIEVE_ROWS, "rows with sieve size and retained mass")
            }
        }
        TestType::BearingRatio => {
            let readings: Vec<_> = points
                .iter()
                .filter_map(MeasurementPoint::as_bearing)
                .copied()
                .collect();
            let references = extract_references(&readings, None, &[], bearing);
            if references.iter().any(|r| r.force_kn.is_some()) {
                Readiness::Ready
            } else {
                Readiness::Missing("a force at a reference penetration".to_string())
            }
        }
        TestType::Plasticity => {
            let complete = points
                .iter()
                .filter_map(MeasurementPoint::as_blow_count)
                .filter(|p| p.blow_count.is_some() && p.water_content.is_some())
                .count();
            at_least(complete, 1, "blow count and water content pairs")
        }
    };
    if let Readiness::Missing(reason) = &verdict {
        tracing::debug!(test_type = %test.test_type, %reason, "not ready to compute");
    }
    verdict
}

fn at_least(found: usize, required: usize, what: &str) -> Readiness {
    if found >= required {
        Readiness::Ready
    } else {
        Readiness::Missing(format!("{required} {what} (found {found})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{BearingPoint, BlowCountPoint, CompactionPoint, SieveRow};
    use crate::reducer::TestParameters;
    use crate::types::UserId;
    use pretty_assertions::assert_eq;

    fn test(test_type: TestType, points: Vec<MeasurementPoint>) -> Test {
        Test::new(test_type, UserId(1)).with_points(points)
    }

    #[test]
    fn compaction_needs_three_complete_points() {
        let mut points: Vec<MeasurementPoint> = vec![
            CompactionPoint::new(10.0).with_dry_density(1.8).into(),
            CompactionPoint::new(12.0).with_wet_density(2.1).into(),
            CompactionPoint::new(14.0).into(),
        ];
        let t = test(TestType::Compaction, points.clone());
        assert_eq!(
            compute_readiness(&t, &BearingConfig::default()),
            Readiness::Missing("3 points with water content and dry density (found 2)".to_string())
        );

        points.push(CompactionPoint::new(16.0).with_dry_density(1.7).into());
        let t = test(TestType::Compaction, points);
        assert!(compute_readiness(&t, &BearingConfig::default()).is_ready());
    }

    #[test]
    fn particle_size_needs_total_mass() {
        let rows = vec![SieveRow::new(20.0, 100.0).into(), SieveRow::new(10.0, 50.0).into()];
        let t = test(TestType::ParticleSize, rows);
        assert!(!compute_readiness(&t, &BearingConfig::default()).is_ready());
        let t = t.with_parameters(TestParameters::default().with_total_dry_mass(1000.0));
        assert!(compute_readiness(&t, &BearingConfig::default()).is_ready());
    }

    #[test]
    fn bearing_needs_a_reference_force() {
        let t = test(TestType::BearingRatio, vec![BearingPoint::new(1.0, 1.2).into()]);
        assert!(!compute_readiness(&t, &BearingConfig::default()).is_ready());
        let t = test(TestType::BearingRatio, vec![BearingPoint::new(5.05, 4.0).into()]);
        assert!(compute_readiness(&t, &BearingConfig::default()).is_ready());
    }

    #[test]
    fn plasticity_needs_one_pair() {
        let t = test(TestType::Plasticity, vec![]);
        assert!(!compute_readiness(&t, &BearingConfig::default()).is_ready());
        let t = test(TestType::Plasticity, vec![BlowCountPoint::new(25, 40.0).into()]);
        assert!(compute_readiness(&t, &BearingConfig::default()).is_ready());
    }
}
