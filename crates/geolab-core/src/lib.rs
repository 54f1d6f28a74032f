//! GeoLab Core - soil laboratory test data
//!
//! The computational heart of the laboratory tooling:
//! - Reduces raw readings into derived fields as they are typed
//! - Builds chart series per test and aligns several tests on one axis
//! - Checks plausibility and compute readiness
//! - Enforces the status workflow and records every applied transition
//!
//! Everything here is synchronous and pure apart from the optional
//! [`TransitionLog`]. Storage, rendering and the compute step that produces
//! [`TestResults`] live outside this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use geolab_core::prelude::*;
//!
//! let test = Test::new(TestType::Compaction, UserId(4))
//!     .with_id(TestId(12))
//!     .with_points(vec![
//!         CompactionPoint::new(10.0).with_wet_density(2.05).into(),
//!         CompactionPoint::new(12.0).with_wet_density(2.15).into(),
//!     ]);
//!
//! // series are built from reduced points, so entered wet densities chart
//! let table = align(&[test]).unwrap_or_default();
//! println!("{} rows", table.rows.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod alignment;
pub mod config;
pub mod error;
pub mod measurement;
pub mod plausibility;
pub mod readiness;
pub mod reducer;
pub mod results;
pub mod selection;
pub mod series;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use alignment::{align, AlignedRow, Alignment, SeriesMeta};
pub use config::{BearingConfig, Bounds, ComparisonConfig, LabConfig, PlausibilityLimits};
pub use error::{
    AlignmentError, ConfigError, LabError, LogError, ResultsError, SelectionError,
    TransitionError,
};
pub use measurement::{
    BearingPoint, BlowCountPoint, CompactionPoint, MeasurementPoint, Reading,
    SedimentationReading, SieveRow, SieveSize, STANDARD_SIEVES_MM,
};
pub use plausibility::{check, Finding, PlausibilityReport};
pub use readiness::{compute_readiness, Readiness};
pub use reducer::{
    extract_references, reduce, reduce_points, reduce_rows, Reduce, ReferenceForce,
    TestParameters,
};
pub use results::{
    BearingRatioResults, CompactionResults, ParticleSizeResults, PlasticityResults, TestResults,
};
pub use selection::ComparisonSelection;
pub use series::{build_series, Axes, Series, SeriesPoint};
pub use types::{Actor, Role, Status, Test, TestId, TestType, UserId};
pub use workflow::{
    authorize, available_targets, AuditSink, Clock, EventId, FixedClock, SystemClock,
    LogEntry, TransitionEvent, TransitionLog, TransitionOutcome, Workflow,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with GeoLab Core
    pub use crate::{
        align, build_series, compute_readiness, Actor, Alignment, BearingPoint, BlowCountPoint,
        CompactionPoint, ComparisonSelection, LabConfig, MeasurementPoint, Role,
        SedimentationReading, SieveRow, Status, Test, TestId, TestParameters, TestResults, TestType,
        TransitionLog, UserId, Workflow,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn reduce_then_align_then_validate() {
        let engineer = Actor::new(UserId(2), Role::Engineer);
        let mut test = Test::new(TestType::Compaction, UserId(1))
            .with_id(TestId(5))
            .with_points(vec![
                CompactionPoint::new(10.0).with_wet_density(2.2).into(),
                CompactionPoint::new(12.0).with_wet_density(2.24).into(),
                CompactionPoint::new(14.0).with_wet_density(2.28).into(),
            ]);
        test.points = test.reduced_points();
        assert!(compute_readiness(&test, &BearingConfig::default()).is_ready());

        let table = align(std::slice::from_ref(&test)).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!((table.rows[0].get("test_5").unwrap() - 2.0).abs() < 1e-9);

        let log = TransitionLog::new();
        let workflow = Workflow::new(&log);
        workflow.advance(&mut test, &engineer).unwrap();
        workflow.advance(&mut test, &engineer).unwrap();
        test.set_results(TestResults::Compaction(CompactionResults {
            optimum_water_content: Some(12.0),
            max_dry_density: Some(2.0),
            ..CompactionResults::default()
        }))
        .unwrap();
        assert!(check(&test, &LabConfig::default().plausibility).is_valid());
        workflow.advance(&mut test, &engineer).unwrap();

        assert_eq!(test.status, Status::Validated);
        assert_eq!(log.len(), 3);
        assert!(log.verify_integrity().is_ok());
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
