//! Field reducers
//!
//! One reducer per procedure, each implementing [`Reduce`] for its record
//! type. [`reduce`] dispatches on the [`MeasurementPoint`] variant, so adding a
//! procedure means adding a variant and its reducer.
//!
//! Reducers are pure: the output depends only on the point, the points listed
//! before it and the test parameters. They never fail; a derivation whose
//! operands are missing, non-finite or whose denominator is zero leaves the
//! derived field unset.

mod bearing;
mod compaction;
mod particle_size;
mod plasticity;
mod sedimentation;

pub use bearing::{extract_references, ReferenceForce};
pub use particle_size::reduce_rows;

use crate::measurement::MeasurementPoint;
use serde::{Deserialize, Serialize};

/// Test-wide inputs the reducers need besides the points themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestParameters {
    /// Total dry sample mass of a particle-size test (g)
    pub total_dry_mass: Option<f64>,
}

impl TestParameters {
    /// With total dry sample mass
    #[inline]
    #[must_use]
    pub fn with_total_dry_mass(mut self, mass: f64) -> Self {
        self.total_dry_mass = Some(mass);
        self
    }
}

/// Incremental field reduction for one record type
pub trait Reduce: Sized {
    /// Derive every computed field of `self`
    ///
    /// `preceding` holds the records of the same type listed before this one,
    /// in list order.
    #[must_use]
    fn reduce(&self, preceding: &[Self], parameters: &TestParameters) -> Self;
}

/// Reduce one point of any procedure
///
/// Records of another procedure in `preceding` are ignored.
#[must_use]
pub fn reduce(
    point: &MeasurementPoint,
    preceding: &[MeasurementPoint],
    parameters: &TestParameters,
) -> MeasurementPoint {
    match point {
        MeasurementPoint::Compaction(p) => MeasurementPoint::Compaction(p.reduce(
            &same_kind(preceding, MeasurementPoint::as_compaction),
            parameters,
        )),
        MeasurementPoint::BearingRatio(p) => MeasurementPoint::BearingRatio(p.reduce(
            &same_kind(preceding, MeasurementPoint::as_bearing),
            parameters,
        )),
        MeasurementPoint::ParticleSize(p) => MeasurementPoint::ParticleSize(p.reduce(
            &same_kind(preceding, MeasurementPoint::as_sieve_row),
            parameters,
        )),
        MeasurementPoint::Sedimentation(p) => MeasurementPoint::Sedimentation(p.reduce(
            &same_kind(preceding, MeasurementPoint::as_sedimentation),
            parameters,
        )),
        MeasurementPoint::Plasticity(p) => MeasurementPoint::Plasticity(p.reduce(
            &same_kind(preceding, MeasurementPoint::as_blow_count),
            parameters,
        )),
    }
}

/// Reduce every point of a list, each against its own prefix
#[must_use]
pub fn reduce_points(
    points: &[MeasurementPoint],
    parameters: &TestParameters,
) -> Vec<MeasurementPoint> {
    let reduced: Vec<MeasurementPoint> = points
        .iter()
        .enumerate()
        .map(|(i, point)| reduce(point, &points[..i], parameters))
        .collect();
    tracing::trace!(points = reduced.len(), "reduced measurement points");
    reduced
}

fn same_kind<T: Clone>(
    points: &[MeasurementPoint],
    select: fn(&MeasurementPoint) -> Option<&T>,
) -> Vec<T> {
    points.iter().filter_map(select).cloned().collect()
}

/// Finite value or unset
#[inline]
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `numerator / denominator`, unset on a missing operand or zero denominator
#[allow(clippy::float_cmp)]
pub(crate) fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let numerator = finite(numerator)?;
    let denominator = finite(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    finite(Some(numerator / denominator))
}

/// `1 + w/100` for a water content in percent
#[inline]
pub(crate) fn moisture_factor(water_content: Option<f64>) -> Option<f64> {
    finite(water_content).map(|w| 1.0 + w / 100.0)
}
