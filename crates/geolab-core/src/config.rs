//! Laboratory configuration
//!
//! Reference penetrations, comparison policy and plausibility bounds. Every
//! section has defaults matching the standard procedures, so an empty TOML
//! document is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Laboratory configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Bearing-ratio reference extraction
    pub bearing: BearingConfig,
    /// Comparison view policy
    pub comparison: ComparisonConfig,
    /// Plausibility bounds
    pub plausibility: PlausibilityLimits,
}

impl LabConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With bearing reference penetrations
    #[inline]
    #[must_use]
    pub fn with_bearing_references(mut self, references_mm: Vec<f64>) -> Self {
        self.bearing.references_mm = references_mm;
        self
    }

    /// With bearing tolerance
    #[inline]
    #[must_use]
    pub fn with_bearing_tolerance(mut self, tolerance_mm: f64) -> Self {
        self.bearing.tolerance_mm = tolerance_mm;
        self
    }

    /// With maximum comparison size
    #[inline]
    #[must_use]
    pub fn with_max_selected(mut self, max: usize) -> Self {
        self.comparison.max_selected = max;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: LabConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded laboratory configuration");
        Ok(config)
    }

    /// Check value consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bearing.tolerance_mm.is_finite() && self.bearing.tolerance_mm > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bearing.tolerance_mm must be positive, got {}",
                self.bearing.tolerance_mm
            )));
        }
        if let Some(bad) = self
            .bearing
            .references_mm
            .iter()
            .find(|r| !(r.is_finite() && **r > 0.0))
        {
            return Err(ConfigError::Invalid(format!(
                "bearing.references_mm must be positive, got {bad}"
            )));
        }
        if self.comparison.max_selected == 0 {
            return Err(ConfigError::Invalid(
                "comparison.max_selected must be at least 1".to_string(),
            ));
        }
        self.plausibility.validate()
    }
}

/// Bearing-ratio reference extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingConfig {
    /// Reference penetrations (mm)
    pub references_mm: Vec<f64>,
    /// Matching tolerance either side of a reference (mm)
    pub tolerance_mm: f64,
}

impl Default for BearingConfig {
    fn default() -> Self {
        Self {
            references_mm: vec![2.5, 5.0],
            tolerance_mm: 0.1,
        }
    }
}

/// Comparison view policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Maximum number of tests compared at once
    pub max_selected: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self { max_selected: 3 }
    }
}

/// Closed interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Bounds {
    /// Create new bounds
    #[inline]
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Plausibility bounds per procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibilityLimits {
    /// Compaction water content (%), error outside
    pub compaction_water_content: Bounds,
    /// Compaction dry density (g/cm³), error outside
    pub dry_density: Bounds,
    /// Maximum dry density result (g/cm³), warning outside
    pub max_dry_density: Bounds,
    /// Penetration (mm), error outside
    pub penetration_mm: Bounds,
    /// Force (kN), warning outside
    pub force_kn: Bounds,
    /// Bearing index (%), error outside
    pub bearing_index: Bounds,
    /// Total dry mass below which a warning is raised (g)
    pub min_total_dry_mass: f64,
    /// Allowed deviation of summed retained percentages from 100
    pub retained_sum_tolerance: f64,
    /// Liquid-limit blow count, warning outside
    pub blow_count: Bounds,
    /// Plasticity water content (%), error outside
    pub plasticity_water_content: Bounds,
    /// Plasticity index above which a warning is raised
    pub max_plasticity_index: f64,
}

impl Default for PlausibilityLimits {
    fn default() -> Self {
        Self {
            compaction_water_content: Bounds::new(0.0, 50.0),
            dry_density: Bounds::new(0.0, 3.0),
            max_dry_density: Bounds::new(1.0, 3.0),
            penetration_mm: Bounds::new(0.0, 12.5),
            force_kn: Bounds::new(0.0, 50.0),
            bearing_index: Bounds::new(0.0, 100.0),
            min_total_dry_mass: 100.0,
            retained_sum_tolerance: 5.0,
            blow_count: Bounds::new(15.0, 35.0),
            plasticity_water_content: Bounds::new(0.0, 200.0),
            max_plasticity_index: 100.0,
        }
    }
}

impl PlausibilityLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("compaction_water_content", self.compaction_water_content),
            ("dry_density", self.dry_density),
            ("max_dry_density", self.max_dry_density),
            ("penetration_mm", self.penetration_mm),
            ("force_kn", self.force_kn),
            ("bearing_index", self.bearing_index),
            ("blow_count", self.blow_count),
            ("plasticity_water_content", self.plasticity_water_content),
        ];
        for (name, bounds) in named {
            if !(bounds.min.is_finite() && bounds.max.is_finite() && bounds.min <= bounds.max) {
                return Err(ConfigError::Invalid(format!(
                    "plausibility.{name} is not a valid range: {bounds}"
                )));
            }
        }
        if self.retained_sum_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "plausibility.retained_sum_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
