//! Plausibility checks
//!
//! Range and consistency checks on a test's points and results. Errors mark
//! values that cannot be physically right; warnings mark values worth a second
//! look. Checks run on reduced points, so derived densities and percentages
//! are inspected as well as typed ones. Unset values are never reported.

use crate::config::{Bounds, PlausibilityLimits};
use crate::measurement::MeasurementPoint;
use crate::results::{
    BearingRatioResults, CompactionResults, ParticleSizeResults, PlasticityResults, TestResults,
};
use crate::types::Test;
use serde::{Deserialize, Serialize};

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Checked field
    pub field: String,
    /// Index of the offending point, `None` for test-wide fields
    pub point: Option<usize>,
    /// Human-readable description
    pub message: String,
}

/// Outcome of the plausibility checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlausibilityReport {
    /// Blocking problems
    pub errors: Vec<Finding>,
    /// Non-blocking problems
    pub warnings: Vec<Finding>,
}

impl PlausibilityReport {
    /// Check if no error was found
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, point: Option<usize>, message: String) {
        self.errors.push(Finding {
            field: field.to_string(),
            point,
            message,
        });
    }

    fn warning(&mut self, field: &str, point: Option<usize>, message: String) {
        self.warnings.push(Finding {
            field: field.to_string(),
            point,
            message,
        });
    }

    fn range_error(&mut self, field: &str, point: Option<usize>, value: Option<f64>, bounds: Bounds) {
        if let Some(v) = value.filter(|v| !bounds.contains(*v)) {
            self.error(field, point, format!("{field} {v} outside {bounds}"));
        }
    }

    fn range_warning(&mut self, field: &str, point: Option<usize>, value: Option<f64>, bounds: Bounds) {
        if let Some(v) = value.filter(|v| !bounds.contains(*v)) {
            self.warning(field, point, format!("{field} {v} outside {bounds}"));
        }
    }
}

/// Run every check applicable to `test`
#[must_use]
pub fn check(test: &Test, limits: &PlausibilityLimits) -> PlausibilityReport {
    let mut report = PlausibilityReport::default();
    let points = test.reduced_points();

    for (i, point) in points.iter().enumerate() {
        check_point(&mut report, i, point, limits);
    }
    if test.test_type == crate::types::TestType::ParticleSize {
        check_sieve_totals(&mut report, test, &points, limits);
    }
    match &test.results {
        Some(TestResults::Compaction(r)) => check_compaction_results(&mut report, r, limits),
        Some(TestResults::BearingRatio(r)) => check_bearing_results(&mut report, r, limits),
        Some(TestResults::ParticleSize(r)) => check_particle_results(&mut report, r),
        Some(TestResults::Plasticity(r)) => check_plasticity_results(&mut report, r, limits),
        None => {}
    }

    tracing::debug!(
        test_type = %test.test_type,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "plausibility checked"
    );
    report
}

fn check_point(
    report: &mut PlausibilityReport,
    i: usize,
    point: &MeasurementPoint,
    limits: &PlausibilityLimits,
) {
    let at = Some(i);
    match point {
        MeasurementPoint::Compaction(p) => {
            report.range_error("waterContent", at, p.water_content, limits.compaction_water_content);
            report.range_error(
                "dryDensity",
                at,
                p.dry_density.map(|d| d.value()),
                limits.dry_density,
            );
        }
        MeasurementPoint::BearingRatio(p) => {
            report.range_error("penetrationMm", at, p.penetration_mm, limits.penetration_mm);
            report.range_warning("forceKN", at, p.force_kn, limits.force_kn);
        }
        MeasurementPoint::ParticleSize(p) => {
            report.range_error(
                "percentRetained",
                at,
                p.percent_retained,
                Bounds::new(0.0, 100.0),
            );
            if let Some(size) = p.sieve_size_mm.filter(|s| !s.is_standard()) {
                report.warning("sieveSizeMm", at, format!("{size} is not a standard sieve"));
            }
        }
        MeasurementPoint::Sedimentation(p) => {
            report.range_error(
                "percentPassing",
                at,
                p.percent_passing,
                Bounds::new(0.0, 100.0),
            );
            if let Some(d) = p.diameter_mm.filter(|d| *d <= 0.0) {
                report.error("diameterMm", at, format!("diameter {d} must be positive"));
            }
        }
        MeasurementPoint::Plasticity(p) => {
            report.range_warning(
                "blowCount",
                at,
                p.blow_count.map(f64::from),
                limits.blow_count,
            );
            report.range_error(
                "waterContent",
                at,
                p.water_content,
                limits.plasticity_water_content,
            );
        }
    }
}

fn check_sieve_totals(
    report: &mut PlausibilityReport,
    test: &Test,
    points: &[MeasurementPoint],
    limits: &PlausibilityLimits,
) {
    if let Some(total) = test.parameters.total_dry_mass {
        if total <= 0.0 {
            report.error("totalDryMass", None, format!("total dry mass {total} must be positive"));
        } else if total < limits.min_total_dry_mass {
            report.warning(
                "totalDryMass",
                None,
                format!("total dry mass {total} below {}", limits.min_total_dry_mass),
            );
        }
    }

    let retained: Vec<f64> = points
        .iter()
        .filter_map(MeasurementPoint::as_sieve_row)
        .filter_map(|r| r.percent_retained)
        .collect();
    if retained.is_empty() {
        return;
    }
    let sum: f64 = retained.iter().sum();
    if (sum - 100.0).abs() > limits.retained_sum_tolerance {
        report.warning(
            "percentRetained",
            None,
            format!("retained percentages sum to {sum:.1}"),
        );
    }
}

fn check_compaction_results(
    report: &mut PlausibilityReport,
    results: &CompactionResults,
    limits: &PlausibilityLimits,
) {
    report.range_error(
        "optimumWaterContent",
        None,
        results.optimum_water_content,
        limits.compaction_water_content,
    );
    report.range_warning(
        "maxDryDensity",
        None,
        results.max_dry_density,
        limits.max_dry_density,
    );
}

fn check_bearing_results(
    report: &mut PlausibilityReport,
    results: &BearingRatioResults,
    limits: &PlausibilityLimits,
) {
    report.range_error("cbr25", None, results.cbr_2_5, limits.bearing_index);
    report.range_error("cbr50", None, results.cbr_5_0, limits.bearing_index);
    if let (Some(at_2_5), Some(at_5_0)) = (results.cbr_2_5, results.cbr_5_0) {
        if at_2_5 > at_5_0 {
            report.warning(
                "cbr25",
                None,
                format!("index at 2.5 mm ({at_2_5}) exceeds index at 5.0 mm ({at_5_0})"),
            );
        }
    }
}

fn check_particle_results(report: &mut PlausibilityReport, results: &ParticleSizeResults) {
    if let Some(d10) = results.d10 {
        if d10 <= 0.0 {
            report.error("d10", None, format!("D10 {d10} must be positive"));
        }
        if let Some(d60) = results.d60.filter(|d60| *d60 < d10) {
            report.error("d60", None, format!("D60 {d60} below D10 {d10}"));
        }
    }
}

fn check_plasticity_results(
    report: &mut PlausibilityReport,
    results: &PlasticityResults,
    limits: &PlausibilityLimits,
) {
    if let (Some(wl), Some(wp)) = (results.liquid_limit, results.plastic_limit) {
        if wl < wp {
            report.error(
                "liquidLimit",
                None,
                format!("liquid limit {wl} below plastic limit {wp}"),
            );
        }
    }
    if let Some(ip) = results.plasticity_index {
        if ip < 0.0 {
            report.error("plasticityIndex", None, format!("plasticity index {ip} is negative"));
        } else if ip > limits.max_plasticity_index {
            report.warning(
                "plasticityIndex",
                None,
                format!("plasticity index {ip} above {}", limits.max_plasticity_index),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{
        BearingPoint, BlowCountPoint, CompactionPoint, SedimentationReading, SieveRow,
    };
    use crate::reducer::TestParameters;
    use crate::types::{TestType, UserId};

    fn limits() -> PlausibilityLimits {
        PlausibilityLimits::default()
    }

    fn test(test_type: TestType, points: Vec<MeasurementPoint>) -> Test {
        Test::new(test_type, UserId(1)).with_points(points)
    }

    #[test]
    fn clean_compaction_is_valid() {
        let t = test(
            TestType::Compaction,
            vec![CompactionPoint::new(12.0).with_dry_density(1.9).into()],
        );
        let report = check(&t, &limits());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn derived_density_is_checked() {
        // 4.0 / 1.0 exceeds the 3.0 bound once derived
        let t = test(
            TestType::Compaction,
            vec![CompactionPoint::new(0.0).with_wet_density(4.0).into()],
        );
        let report = check(&t, &limits());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "dryDensity");
        assert_eq!(report.errors[0].point, Some(0));
    }

    #[test]
    fn bearing_ranges_and_results() {
        let mut t = test(
            TestType::BearingRatio,
            vec![BearingPoint::new(13.0, 60.0).into()],
        );
        t.set_results(TestResults::BearingRatio(BearingRatioResults {
            cbr_2_5: Some(40.0),
            cbr_5_0: Some(35.0),
            ..BearingRatioResults::default()
        }))
        .unwrap();
        let report = check(&t, &limits());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 2);
        assert!(!report.is_valid());
    }

    #[test]
    fn sieve_totals() {
        let t = test(
            TestType::ParticleSize,
            vec![SieveRow::new(20.0, 10.0).into(), SieveRow::new(7.0, 10.0).into()],
        )
        .with_parameters(TestParameters::default().with_total_dry_mass(80.0));
        let report = check(&t, &limits());
        let fields: Vec<&str> = report.warnings.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"totalDryMass"));
        assert!(fields.contains(&"sieveSizeMm"));
        assert!(fields.contains(&"percentRetained"));
        assert!(report.is_valid());
    }

    #[test]
    fn non_positive_total_is_error() {
        let t = test(TestType::ParticleSize, vec![SieveRow::new(20.0, 10.0).into()])
            .with_parameters(TestParameters::default().with_total_dry_mass(0.0));
        let report = check(&t, &limits());
        assert!(report.errors.iter().any(|f| f.field == "totalDryMass"));
    }

    #[test]
    fn plasticity_consistency() {
        let mut t = test(
            TestType::Plasticity,
            vec![BlowCountPoint::new(40, 250.0).into()],
        );
        t.set_results(TestResults::Plasticity(PlasticityResults {
            liquid_limit: Some(20.0),
            plastic_limit: Some(25.0),
            plasticity_index: Some(-5.0),
            ..PlasticityResults::default()
        }))
        .unwrap();
        let report = check(&t, &limits());
        let errors: Vec<&str> = report.errors.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(errors, vec!["waterContent", "liquidLimit", "plasticityIndex"]);
        assert_eq!(report.warnings[0].field, "blowCount");
    }

    #[test]
    fn particle_diameters() {
        let mut t = test(TestType::ParticleSize, vec![]);
        t.set_results(TestResults::ParticleSize(ParticleSizeResults {
            d10: Some(0.2),
            d60: Some(0.1),
            ..ParticleSizeResults::default()
        }))
        .unwrap();
        let report = check(&t, &limits());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "d60");
    }

    #[test]
    fn hydrometer_readings() {
        let t = test(
            TestType::ParticleSize,
            vec![
                SedimentationReading::new(30.0, 0.02, 25.0).into(),
                SedimentationReading::new(60.0, 0.0, 112.0).into(),
            ],
        );
        let report = check(&t, &limits());
        let errors: Vec<(&str, Option<usize>)> = report
            .errors
            .iter()
            .map(|f| (f.field.as_str(), f.point))
            .collect();
        assert_eq!(errors, vec![("percentPassing", Some(1)), ("diameterMm", Some(1))]);
    }
}
