//! Error types for GeoLab Core
//!
//! Every failure the core can report is recoverable:
//! - Workflow transitions refused for authorization or missing results
//! - Alignment requested across different test types
//! - Comparison selection overflow
//! - Configuration parsing and validation
//!
//! Missing or unusable numeric input is never an error; derived fields are
//! left unset (`None`) instead.

use crate::types::{Role, Status, TestId, TestType, UserId};

/// Main GeoLab error type
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    /// Workflow transition refused
    #[error("transition refused: {0}")]
    Transition(#[from] TransitionError),

    /// Alignment refused
    #[error("alignment failed: {0}")]
    Alignment(#[from] AlignmentError),

    /// Comparison selection refused
    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Results do not belong to the test
    #[error("results error: {0}")]
    Results(#[from] ResultsError),

    /// Audit log error
    #[error("audit log error: {0}")]
    Log(#[from] LogError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LabError {
    /// Check if the caller can recover by rendering guidance and retrying
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::Log(LogError::IntegrityViolation { .. })
        )
    }
}

/// Workflow transition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Actor is neither the owning operator nor a privileged role
    #[error("{actor} ({role}) may not set {target}")]
    Forbidden {
        /// Acting user
        actor: UserId,
        /// Role of the acting user
        role: Role,
        /// Requested status
        target: Status,
    },

    /// Validation requested before results were computed
    #[error("cannot set {target}: test {test} has no computed results")]
    PreconditionFailed {
        /// Test identifier, `None` when unsaved
        test: DisplayId,
        /// Requested status
        target: Status,
    },

    /// Backward move or skipped step
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },
}

impl TransitionError {
    /// Check if this is an authorization denial
    #[inline]
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Check if this is a missing-results denial
    #[inline]
    #[must_use]
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }
}

/// Alignment errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignmentError {
    /// Tests of different types cannot share an axis
    #[error("type mismatch at position {position}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type of the first test
        expected: TestType,
        /// Type of the offending test
        found: TestType,
        /// Position of the offending test in the input
        position: usize,
    },
}

/// Comparison selection errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Selection already holds the maximum number of tests
    #[error("selection full (max: {0})")]
    Full(usize),

    /// Selected test is absent from the supplied list
    #[error("selected test {0} not found")]
    UnknownTest(TestId),
}

/// Results attachment errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultsError {
    /// Results computed for another procedure
    #[error("results for {found} cannot be attached to a {expected} test")]
    TypeMismatch {
        /// Type of the test
        expected: TestType,
        /// Type of the results
        found: TestType,
    },
}

/// Audit log errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// Hash chain broken at the given position
    #[error("integrity violation at event {position}")]
    IntegrityViolation {
        /// Index of the first inconsistent event
        position: usize,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid TOML for this schema
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration values are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Test identifier rendering for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayId(pub Option<TestId>);

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("<unsaved>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_display() {
        let err = TransitionError::Forbidden {
            actor: UserId(7),
            role: Role::Technician,
            target: Status::Validated,
        };
        assert!(err.is_forbidden());
        assert!(!err.is_precondition_failed());
        assert_eq!(err.to_string(), "user#7 (technician) may not set validated");
    }

    #[test]
    fn precondition_display_unsaved() {
        let err = TransitionError::PreconditionFailed {
            test: DisplayId(None),
            target: Status::Validated,
        };
        assert!(err.is_precondition_failed());
        assert!(err.to_string().contains("<unsaved>"));
    }

    #[test]
    fn lab_error_is_recoverable() {
        let err = LabError::from(AlignmentError::TypeMismatch {
            expected: TestType::Compaction,
            found: TestType::BearingRatio,
            position: 1,
        });
        assert!(err.is_recoverable());

        let err = LabError::from(LogError::IntegrityViolation { position: 0 });
        assert!(!err.is_recoverable());

        let err = LabError::from(ConfigError::Invalid("x".to_string()));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn selection_full_display() {
        assert_eq!(SelectionError::Full(3).to_string(), "selection full (max: 3)");
    }
}
