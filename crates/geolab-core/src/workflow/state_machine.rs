use crate::error::TransitionError;
use crate::types::Status;

/// Validates a status change.
///
/// Only single forward steps are legal; the same-state no-op is handled by
/// the caller before this check.
pub fn validate_transition(from: Status, to: Status) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::IllegalTransition { from, to })
    }
}

/// Statuses reachable from `from` in one step.
#[must_use]
pub fn allowed_transitions(from: Status) -> Vec<Status> {
    use Status::*;
    match from {
        Draft => vec![InProgress],
        InProgress => vec![Completed],
        Completed => vec![Validated],
        Validated => vec![],
    }
}

fn allowed(from: Status, to: Status) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_forward_steps_only() {
        assert!(validate_transition(Status::Draft, Status::InProgress).is_ok());
        assert!(validate_transition(Status::Completed, Status::Validated).is_ok());
        assert_eq!(
            validate_transition(Status::Draft, Status::Completed),
            Err(TransitionError::IllegalTransition {
                from: Status::Draft,
                to: Status::Completed,
            })
        );
        assert!(validate_transition(Status::Completed, Status::InProgress).is_err());
    }

    #[test]
    fn validated_is_terminal() {
        assert!(allowed_transitions(Status::Validated).is_empty());
        for from in Status::ALL {
            assert_eq!(allowed_transitions(from), from.next().into_iter().collect::<Vec<_>>());
        }
    }
}
