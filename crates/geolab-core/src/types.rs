//! Core types for GeoLab
//!
//! Defines the records the core operates on:
//! - Identifiers for tests and users
//! - Test procedures and lifecycle states
//! - Roles and the capability predicates derived from them
//! - The [`Test`] record itself

use crate::error::ResultsError;
use crate::measurement::MeasurementPoint;
use crate::reducer::{self, TestParameters};
use crate::results::TestResults;
use crate::series::{build_series, Series};
use serde::{Deserialize, Serialize};

/// Persisted test identifier (assigned by the storage layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub i64);

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

/// Standardized test procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    /// Proctor-type compaction optimum
    Compaction,
    /// CBR-type penetration
    BearingRatio,
    /// Sieve particle-size distribution
    ParticleSize,
    /// Atterberg-type plasticity limits
    Plasticity,
}

impl TestType {
    /// All procedures
    pub const ALL: [TestType; 4] = [
        TestType::Compaction,
        TestType::BearingRatio,
        TestType::ParticleSize,
        TestType::Plasticity,
    ];

    /// Stable textual name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Compaction => "compaction",
            TestType::BearingRatio => "bearing-ratio",
            TestType::ParticleSize => "particle-size",
            TestType::Plasticity => "plasticity",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test lifecycle state, declared in lifecycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Created, nothing measured yet
    Draft,
    /// Measurements being entered
    InProgress,
    /// Measurements complete
    Completed,
    /// Approved by a privileged role
    Validated,
}

impl Status {
    /// All states in lifecycle order
    pub const ALL: [Status; 4] = [
        Status::Draft,
        Status::InProgress,
        Status::Completed,
        Status::Validated,
    ];

    /// Position in the lifecycle
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Status::Draft => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
            Status::Validated => 3,
        }
    }

    /// Following state, `None` for the terminal state
    #[inline]
    #[must_use]
    pub fn next(self) -> Option<Status> {
        Status::ALL.get(self.index() + 1).copied()
    }

    /// Check if this is the terminal state
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Status::Validated
    }

    /// Stable textual name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Validated => "validated",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Administrator
    Admin,
    /// Head of laboratory
    LabChief,
    /// Engineer
    Engineer,
    /// Laboratory technician
    Technician,
}

impl Role {
    /// All roles
    pub const ALL: [Role; 4] = [Role::Admin, Role::LabChief, Role::Engineer, Role::Technician];

    /// Check if this role may validate tests and manage any test's status
    #[inline]
    #[must_use]
    pub fn can_validate(self) -> bool {
        matches!(self, Role::Admin | Role::LabChief | Role::Engineer)
    }

    /// Stable textual name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::LabChief => "lab-chief",
            Role::Engineer => "engineer",
            Role::Technician => "technician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier
    pub id: UserId,
    /// User role
    pub role: Role,
}

impl Actor {
    /// Create new actor
    #[inline]
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// A laboratory test record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Identifier, `None` until persisted
    #[serde(default)]
    pub id: Option<TestId>,
    /// Human identifier shown in legends
    #[serde(default)]
    pub reference: Option<String>,
    /// Procedure
    pub test_type: TestType,
    /// Owning operator
    pub operator_id: UserId,
    /// Lifecycle state
    #[serde(default = "default_status")]
    pub status: Status,
    /// Test-wide inputs used by the reducers
    #[serde(default)]
    pub parameters: TestParameters,
    /// Ordered measurement points
    #[serde(default)]
    pub points: Vec<MeasurementPoint>,
    /// Results of the external compute step
    #[serde(default)]
    pub results: Option<TestResults>,
}

fn default_status() -> Status {
    Status::Draft
}

impl Test {
    /// Create a draft test with no points
    #[inline]
    #[must_use]
    pub fn new(test_type: TestType, operator_id: UserId) -> Self {
        Self {
            id: None,
            reference: None,
            test_type,
            operator_id,
            status: Status::Draft,
            parameters: TestParameters::default(),
            points: Vec::new(),
            results: None,
        }
    }

    /// With persisted identifier
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: TestId) -> Self {
        self.id = Some(id);
        self
    }

    /// With human identifier
    #[inline]
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// With reducer parameters
    #[inline]
    #[must_use]
    pub fn with_parameters(mut self, parameters: TestParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// With measurement points
    #[inline]
    #[must_use]
    pub fn with_points(mut self, points: Vec<MeasurementPoint>) -> Self {
        self.points = points;
        self
    }

    /// Attach results from the external compute step
    pub fn set_results(&mut self, results: TestResults) -> Result<(), ResultsError> {
        if results.test_type() != self.test_type {
            return Err(ResultsError::TypeMismatch {
                expected: self.test_type,
                found: results.test_type(),
            });
        }
        self.results = Some(results);
        Ok(())
    }

    /// Check if results have been computed
    #[inline]
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Legend label
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.reference, self.id) {
            (Some(reference), _) => reference.clone(),
            (None, Some(id)) => format!("Test {id}"),
            (None, None) => format!("Unsaved {} test", self.test_type),
        }
    }

    /// Points with every derived field recomputed
    #[must_use]
    pub fn reduced_points(&self) -> Vec<MeasurementPoint> {
        reducer::reduce_points(&self.points, &self.parameters)
    }

    /// Chart series of the points after reduction
    ///
    /// Stored derived fields are recomputed first, so raw sieve rows and
    /// entered wet densities chart the same as their reduced form.
    #[must_use]
    pub fn series(&self) -> Series {
        build_series(self.test_type, &self.reduced_points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{BearingRatioResults, CompactionResults};

    #[test]
    fn status_order_and_next() {
        assert!(Status::Draft < Status::InProgress);
        assert!(Status::Completed < Status::Validated);
        assert_eq!(Status::Draft.next(), Some(Status::InProgress));
        assert_eq!(Status::Validated.next(), None);
        assert!(Status::Validated.is_terminal());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
        }
        assert!("valide".parse::<Status>().is_err());
    }

    #[test]
    fn role_capability() {
        assert!(Role::Admin.can_validate());
        assert!(Role::LabChief.can_validate());
        assert!(Role::Engineer.can_validate());
        assert!(!Role::Technician.can_validate());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn new_test_is_empty_draft() {
        let test = Test::new(TestType::Compaction, UserId(1));
        assert_eq!(test.status, Status::Draft);
        assert!(test.points.is_empty());
        assert!(!test.has_results());
        assert!(test.id.is_none());
    }

    #[test]
    fn set_results_checks_type() {
        let mut test = Test::new(TestType::Compaction, UserId(1));
        let err = test
            .set_results(TestResults::BearingRatio(BearingRatioResults::default()))
            .unwrap_err();
        assert!(matches!(err, ResultsError::TypeMismatch { .. }));
        assert!(!test.has_results());

        test.set_results(TestResults::Compaction(CompactionResults::default()))
            .unwrap();
        assert!(test.has_results());
    }

    #[test]
    fn label_prefers_reference() {
        let test = Test::new(TestType::Plasticity, UserId(1)).with_id(TestId(4));
        assert_eq!(test.label(), "Test 4");
        let test = test.with_reference("ATT-2024-004");
        assert_eq!(test.label(), "ATT-2024-004");
        let unsaved = Test::new(TestType::Plasticity, UserId(1));
        assert_eq!(unsaved.label(), "Unsaved plasticity test");
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let test: Test = serde_json::from_str(
            r#"{"testType":"bearing-ratio","operatorId":3}"#,
        )
        .unwrap();
        assert_eq!(test.test_type, TestType::BearingRatio);
        assert_eq!(test.status, Status::Draft);
        assert!(test.points.is_empty());
    }
}
