//! Series builder
//!
//! Maps one test's points onto its chart axes and sorts them by x. Points
//! missing an axis value are dropped; equal x values are kept as separate
//! samples in input order.

use crate::measurement::MeasurementPoint;
use crate::reducer::{Reduce, TestParameters};
use crate::types::TestType;
use serde::{Deserialize, Serialize};

/// One chart sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Abscissa
    pub x: f64,
    /// Ordinate
    pub y: f64,
}

/// Sorted chart samples of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Procedure, which fixes the axes
    pub test_type: TestType,
    /// Samples sorted ascending by x
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// Number of samples
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if there is nothing to plot
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ordinate of the first sample at exactly `x`
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn first_at(&self, x: f64) -> Option<f64> {
        self.points.iter().find(|p| p.x == x).map(|p| p.y)
    }
}

/// Axis titles of a procedure's chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axes {
    /// Abscissa title
    pub x: &'static str,
    /// Ordinate title
    pub y: &'static str,
}

impl TestType {
    /// Axis titles of this procedure's chart
    #[must_use]
    pub fn axes(self) -> Axes {
        match self {
            TestType::Compaction => Axes {
                x: "Water content (%)",
                y: "Dry density (g/cm³)",
            },
            TestType::BearingRatio => Axes {
                x: "Penetration (mm)",
                y: "Force (kN)",
            },
            TestType::ParticleSize => Axes {
                x: "Particle size (mm)",
                y: "Passing (%)",
            },
            TestType::Plasticity => Axes {
                x: "log10(blows)",
                y: "Water content (%)",
            },
        }
    }
}

/// Build the sorted series of `points` for `test_type`
///
/// Points of another procedure are ignored.
#[must_use]
pub fn build_series(test_type: TestType, points: &[MeasurementPoint]) -> Series {
    let mut samples: Vec<SeriesPoint> = points
        .iter()
        .filter(|p| p.test_type() == test_type)
        .filter_map(sample)
        .filter(|s| s.x.is_finite() && s.y.is_finite())
        .collect();
    // stable: equal x keep input order
    samples.sort_by(|a, b| a.x.total_cmp(&b.x));
    Series {
        test_type,
        points: samples,
    }
}

fn sample(point: &MeasurementPoint) -> Option<SeriesPoint> {
    let (x, y) = match point {
        MeasurementPoint::Compaction(p) => (p.water_content?, p.dry_density?.value()),
        MeasurementPoint::BearingRatio(p) => (p.penetration_mm?, p.force_kn?),
        MeasurementPoint::ParticleSize(p) => (p.sieve_size_mm?.mm(), p.percent_passing?),
        MeasurementPoint::Sedimentation(p) => (p.diameter_mm?, p.percent_passing?),
        MeasurementPoint::Plasticity(p) => {
            let reduced = p.reduce(&[], &TestParameters::default());
            (reduced.log_blow_count?, p.water_content?)
        }
    };
    Some(SeriesPoint { x, y })
}
