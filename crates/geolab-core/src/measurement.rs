//! Raw measurement records
//!
//! One record shape per procedure, unified in [`MeasurementPoint`]. Raw fields
//! are whatever the operator has typed so far; every field is optional because
//! forms are reduced while still incomplete.

use crate::types::TestType;
use serde::{Deserialize, Serialize};

/// Standard sieve openings (mm), coarsest first
pub const STANDARD_SIEVES_MM: [f64; 31] = [
    80.0, 63.0, 50.0, 40.0, 31.5, 25.0, 20.0, 16.0, 12.5, 10.0, 8.0, 6.3, 5.0, 4.0, 3.15, 2.5,
    2.0, 1.6, 1.25, 1.0, 0.8, 0.63, 0.5, 0.4, 0.315, 0.25, 0.2, 0.16, 0.125, 0.1, 0.08,
];

/// A value that was either typed by the operator or derived by a reducer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum Reading {
    /// Typed directly; reducers never overwrite it
    Entered(f64),
    /// Computed from other fields; replaced on every reduction
    Derived(f64),
}

impl Reading {
    /// Numeric value regardless of origin
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Reading::Entered(v) | Reading::Derived(v) => v,
        }
    }

    /// Check if the operator typed this value
    #[inline]
    #[must_use]
    pub fn is_entered(self) -> bool {
        matches!(self, Reading::Entered(_))
    }

    /// Entered value, `None` for derived values
    #[inline]
    #[must_use]
    pub fn entered(self) -> Option<f64> {
        match self {
            Reading::Entered(v) => Some(v),
            Reading::Derived(_) => None,
        }
    }
}

/// One compaction mould reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompactionPoint {
    /// Water content (%)
    pub water_content: Option<f64>,
    /// Wet mass (g)
    pub wet_mass: Option<f64>,
    /// Dry mass (g)
    pub dry_mass: Option<f64>,
    /// Mould volume (cm³)
    pub volume: Option<f64>,
    /// Wet density (g/cm³)
    pub wet_density: Option<Reading>,
    /// Dry density (g/cm³)
    pub dry_density: Option<Reading>,
}

impl CompactionPoint {
    /// Create a point with only the water content set
    #[inline]
    #[must_use]
    pub fn new(water_content: f64) -> Self {
        Self {
            water_content: Some(water_content),
            ..Self::default()
        }
    }

    /// With wet and dry mass and mould volume
    #[inline]
    #[must_use]
    pub fn with_masses(mut self, wet_mass: Option<f64>, dry_mass: Option<f64>, volume: f64) -> Self {
        self.wet_mass = wet_mass;
        self.dry_mass = dry_mass;
        self.volume = Some(volume);
        self
    }

    /// With an entered wet density
    #[inline]
    #[must_use]
    pub fn with_wet_density(mut self, density: f64) -> Self {
        self.wet_density = Some(Reading::Entered(density));
        self
    }

    /// With an entered dry density
    #[inline]
    #[must_use]
    pub fn with_dry_density(mut self, density: f64) -> Self {
        self.dry_density = Some(Reading::Entered(density));
        self
    }
}

/// One penetration reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BearingPoint {
    /// Piston penetration (mm)
    pub penetration_mm: Option<f64>,
    /// Force at that penetration (kN)
    #[serde(rename = "forceKN")]
    pub force_kn: Option<f64>,
}

impl BearingPoint {
    /// Create a complete reading
    #[inline]
    #[must_use]
    pub fn new(penetration_mm: f64, force_kn: f64) -> Self {
        Self {
            penetration_mm: Some(penetration_mm),
            force_kn: Some(force_kn),
        }
    }
}

/// Sieve opening in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SieveSize(pub f64);

impl SieveSize {
    /// Parse a sieve label such as `"31.5mm"` or `"0.08"`
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let number = trimmed.strip_suffix("mm").unwrap_or(trimmed).trim();
        match number.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Some(Self(v)),
            _ => None,
        }
    }

    /// Opening in millimetres
    #[inline]
    #[must_use]
    pub fn mm(self) -> f64 {
        self.0
    }

    /// Check membership in [`STANDARD_SIEVES_MM`]
    #[must_use]
    pub fn is_standard(self) -> bool {
        STANDARD_SIEVES_MM
            .iter()
            .any(|&size| (size - self.0).abs() < 1e-9)
    }
}

impl std::fmt::Display for SieveSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm", self.0)
    }
}

/// One sieve row of a particle-size test
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SieveRow {
    /// Sieve opening
    pub sieve_size_mm: Option<SieveSize>,
    /// Mass retained on the sieve (g)
    pub retained_mass: Option<f64>,
    /// Derived: retained mass over total dry mass (%)
    pub percent_retained: Option<f64>,
    /// Derived: running sum of retained percentages (%)
    pub percent_cumulative: Option<f64>,
    /// Derived: 100 minus cumulative (%)
    pub percent_passing: Option<f64>,
}

impl SieveRow {
    /// Create a row with raw fields only
    #[inline]
    #[must_use]
    pub fn new(sieve_size_mm: f64, retained_mass: f64) -> Self {
        Self {
            sieve_size_mm: Some(SieveSize(sieve_size_mm)),
            retained_mass: Some(retained_mass),
            ..Self::default()
        }
    }
}

/// One hydrometer reading of a particle-size test
///
/// Diameter and passing percentage come from the hydrometer chart and are
/// recorded as read; nothing is derived from time or height here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SedimentationReading {
    /// Elapsed time since the start of sedimentation (min)
    pub time_min: Option<f64>,
    /// Hydrometer height (cm)
    pub height_cm: Option<f64>,
    /// Equivalent particle diameter (mm)
    pub diameter_mm: Option<f64>,
    /// Passing percentage at that diameter (%)
    pub percent_passing: Option<f64>,
}

impl SedimentationReading {
    /// Create a reading with its chart coordinates
    #[inline]
    #[must_use]
    pub fn new(time_min: f64, diameter_mm: f64, percent_passing: f64) -> Self {
        Self {
            time_min: Some(time_min),
            diameter_mm: Some(diameter_mm),
            percent_passing: Some(percent_passing),
            ..Self::default()
        }
    }
}

/// One liquid-limit cup reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlowCountPoint {
    /// Number of blows to close the groove
    pub blow_count: Option<u32>,
    /// Water content (%)
    pub water_content: Option<f64>,
    /// Derived: log10 of the blow count, for charting only
    pub log_blow_count: Option<f64>,
}

impl BlowCountPoint {
    /// Create a complete reading
    #[inline]
    #[must_use]
    pub fn new(blow_count: u32, water_content: f64) -> Self {
        Self {
            blow_count: Some(blow_count),
            water_content: Some(water_content),
            log_blow_count: None,
        }
    }
}

/// Measurement record, tagged by procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MeasurementPoint {
    /// Compaction mould reading
    Compaction(CompactionPoint),
    /// Penetration reading
    BearingRatio(BearingPoint),
    /// Sieve row
    ParticleSize(SieveRow),
    /// Hydrometer reading of a particle-size test
    Sedimentation(SedimentationReading),
    /// Blow-count pair
    Plasticity(BlowCountPoint),
}

impl MeasurementPoint {
    /// Procedure this record belongs to
    #[inline]
    #[must_use]
    pub fn test_type(&self) -> TestType {
        match self {
            MeasurementPoint::Compaction(_) => TestType::Compaction,
            MeasurementPoint::BearingRatio(_) => TestType::BearingRatio,
            MeasurementPoint::ParticleSize(_) | MeasurementPoint::Sedimentation(_) => {
                TestType::ParticleSize
            }
            MeasurementPoint::Plasticity(_) => TestType::Plasticity,
        }
    }

    /// Compaction record, if this is one
    #[inline]
    #[must_use]
    pub fn as_compaction(&self) -> Option<&CompactionPoint> {
        match self {
            MeasurementPoint::Compaction(p) => Some(p),
            _ => None,
        }
    }

    /// Penetration record, if this is one
    #[inline]
    #[must_use]
    pub fn as_bearing(&self) -> Option<&BearingPoint> {
        match self {
            MeasurementPoint::BearingRatio(p) => Some(p),
            _ => None,
        }
    }

    /// Sieve row, if this is one
    #[inline]
    #[must_use]
    pub fn as_sieve_row(&self) -> Option<&SieveRow> {
        match self {
            MeasurementPoint::ParticleSize(p) => Some(p),
            _ => None,
        }
    }

    /// Hydrometer reading, if this is one
    #[inline]
    #[must_use]
    pub fn as_sedimentation(&self) -> Option<&SedimentationReading> {
        match self {
            MeasurementPoint::Sedimentation(p) => Some(p),
            _ => None,
        }
    }

    /// Blow-count pair, if this is one
    #[inline]
    #[must_use]
    pub fn as_blow_count(&self) -> Option<&BlowCountPoint> {
        match self {
            MeasurementPoint::Plasticity(p) => Some(p),
            _ => None,
        }
    }
}

impl From<CompactionPoint> for MeasurementPoint {
    fn from(point: CompactionPoint) -> Self {
        MeasurementPoint::Compaction(point)
    }
}

impl From<BearingPoint> for MeasurementPoint {
    fn from(point: BearingPoint) -> Self {
        MeasurementPoint::BearingRatio(point)
    }
}

impl From<SieveRow> for MeasurementPoint {
    fn from(point: SieveRow) -> Self {
        MeasurementPoint::ParticleSize(point)
    }
}

impl From<SedimentationReading> for MeasurementPoint {
    fn from(point: SedimentationReading) -> Self {
        MeasurementPoint::Sedimentation(point)
    }
}

impl From<BlowCountPoint> for MeasurementPoint {
    fn from(point: BlowCountPoint) -> Self {
        MeasurementPoint::Plasticity(point)
    }
}
