//! Testing utilities for GeoLab workspace
//!
//! Fixture tests for each procedure, actors for each role and a fixed clock.

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use geolab_core::{
    Actor, BearingPoint, BlowCountPoint, CompactionPoint, CompactionResults, FixedClock, Role,
    SedimentationReading, SieveRow, Test, TestId, TestParameters, TestResults, TestType, UserId,
};

pub const OPERATOR: UserId = UserId(100);

pub fn operator() -> Actor {
    Actor::new(OPERATOR, Role::Technician)
}

pub fn other_technician() -> Actor {
    Actor::new(UserId(101), Role::Technician)
}

pub fn engineer() -> Actor {
    Actor::new(UserId(200), Role::Engineer)
}

pub fn lab_chief() -> Actor {
    Actor::new(UserId(300), Role::LabChief)
}

pub fn admin() -> Actor {
    Actor::new(UserId(400), Role::Admin)
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap())
}

/// Compaction test with one entered dry density per `(water content, density)`
pub fn compaction_test(id: i64, samples: &[(f64, f64)]) -> Test {
    Test::new(TestType::Compaction, OPERATOR)
        .with_id(TestId(id))
        .with_points(
            samples
                .iter()
                .map(|&(w, d)| CompactionPoint::new(w).with_dry_density(d).into())
                .collect(),
        )
}

/// Compaction test with entered wet densities, ready for reduction
pub fn compaction_wet_test(id: i64, samples: &[(f64, f64)]) -> Test {
    Test::new(TestType::Compaction, OPERATOR)
        .with_id(TestId(id))
        .with_points(
            samples
                .iter()
                .map(|&(w, d)| CompactionPoint::new(w).with_wet_density(d).into())
                .collect(),
        )
}

pub fn bearing_test(id: i64, readings: &[(f64, f64)]) -> Test {
    Test::new(TestType::BearingRatio, OPERATOR)
        .with_id(TestId(id))
        .with_points(
            readings
                .iter()
                .map(|&(p, f)| BearingPoint::new(p, f).into())
                .collect(),
        )
}

pub fn particle_size_test(id: i64, total_dry_mass: f64, rows: &[(f64, f64)]) -> Test {
    Test::new(TestType::ParticleSize, OPERATOR)
        .with_id(TestId(id))
        .with_parameters(TestParameters::default().with_total_dry_mass(total_dry_mass))
        .with_points(
            rows.iter()
                .map(|&(size, mass)| SieveRow::new(size, mass).into())
                .collect(),
        )
}

/// Append hydrometer readings `(time, diameter, passing)` to a particle-size test
pub fn with_hydrometer(mut test: Test, readings: &[(f64, f64, f64)]) -> Test {
    test.points.extend(
        readings
            .iter()
            .map(|&(t, d, p)| SedimentationReading::new(t, d, p).into()),
    );
    test
}

pub fn plasticity_test(id: i64, cups: &[(u32, f64)]) -> Test {
    Test::new(TestType::Plasticity, OPERATOR)
        .with_id(TestId(id))
        .with_points(
            cups.iter()
                .map(|&(n, w)| BlowCountPoint::new(n, w).into())
                .collect(),
        )
}

/// Completed compaction test carrying results
pub fn completed_with_results(id: i64) -> Test {
    let mut test = compaction_test(id, &[(10.0, 1.80), (12.0, 1.90), (14.0, 1.85)]);
    test.status = geolab_core::Status::Completed;
    test.results = Some(TestResults::Compaction(CompactionResults {
        optimum_water_content: Some(12.0),
        max_dry_density: Some(1.90),
        ..CompactionResults::default()
    }));
    test
}
