//! Results echoed from the external compute step
//!
//! The core never recomputes these values; it stores them so the workflow can
//! check that results exist and the plausibility checks can inspect them.

use crate::types::TestType;
use serde::{Deserialize, Serialize};

/// Results of a compaction test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompactionResults {
    /// Optimum water content (%)
    pub optimum_water_content: Option<f64>,
    /// Maximum dry density (g/cm³)
    pub max_dry_density: Option<f64>,
    /// Maximum wet density (g/cm³)
    pub max_wet_density: Option<f64>,
    /// Saturation at the optimum (%)
    pub optimum_saturation: Option<f64>,
}

/// Results of a bearing-ratio test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BearingRatioResults {
    /// Index at 2.5 mm
    pub cbr_2_5: Option<f64>,
    /// Index at 5.0 mm
    pub cbr_5_0: Option<f64>,
    /// Retained index
    pub cbr_final: Option<f64>,
    /// Bearing class label
    pub bearing_class: Option<String>,
}

/// Results of a particle-size test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticleSizeResults {
    /// D10 (mm)
    pub d10: Option<f64>,
    /// D30 (mm)
    pub d30: Option<f64>,
    /// D50 (mm)
    pub d50: Option<f64>,
    /// D60 (mm)
    pub d60: Option<f64>,
    /// Uniformity coefficient
    pub cu: Option<f64>,
    /// Curvature coefficient
    pub cc: Option<f64>,
    /// Gravel fraction (%)
    pub gravel_percent: Option<f64>,
    /// Sand fraction (%)
    pub sand_percent: Option<f64>,
    /// Silt fraction (%)
    pub silt_percent: Option<f64>,
    /// Clay fraction (%)
    pub clay_percent: Option<f64>,
}

/// Results of a plasticity test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlasticityResults {
    /// Liquid limit WL (%)
    pub liquid_limit: Option<f64>,
    /// Plastic limit WP (%)
    pub plastic_limit: Option<f64>,
    /// Plasticity index IP
    pub plasticity_index: Option<f64>,
    /// Consistency index IC
    pub consistency_index: Option<f64>,
}

/// Results record, tagged by procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "testType", rename_all = "kebab-case")]
pub enum TestResults {
    /// Compaction results
    Compaction(CompactionResults),
    /// Bearing-ratio results
    BearingRatio(BearingRatioResults),
    /// Particle-size results
    ParticleSize(ParticleSizeResults),
    /// Plasticity results
    Plasticity(PlasticityResults),
}

impl TestResults {
    /// Procedure these results belong to
    #[inline]
    #[must_use]
    pub fn test_type(&self) -> TestType {
        match self {
            TestResults::Compaction(_) => TestType::Compaction,
            TestResults::BearingRatio(_) => TestType::BearingRatio,
            TestResults::ParticleSize(_) => TestType::ParticleSize,
            TestResults::Plasticity(_) => TestType::Plasticity,
        }
    }
}
