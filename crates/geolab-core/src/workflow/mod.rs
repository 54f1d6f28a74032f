//! Test status workflow
//!
//! Statuses advance one step at a time, `draft → in-progress → completed →
//! validated`, and never move back. Who may set a status:
//! - `draft`, `in-progress`, `completed`: the owning operator or any role
//!   that can validate
//! - `validated`: only a role that can validate, and only once results exist
//!
//! Setting the current status again is a no-op and is not reported. Every
//! applied transition is reported to an [`AuditSink`].

mod audit;
mod state_machine;

pub use audit::{AuditSink, EventId, LogEntry, TransitionEvent, TransitionLog};
pub use state_machine::{allowed_transitions, validate_transition};

use crate::error::{DisplayId, TransitionError};
use crate::types::{Actor, Status, Test};
use chrono::{DateTime, Utc};

/// Source of event timestamps
pub trait Clock {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Result of a status request
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Status changed and reported
    Applied(TransitionEvent),
    /// Requested status was already current
    Unchanged,
}

impl TransitionOutcome {
    /// Check if the status changed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Check whether `actor` may set `target` on `test`
///
/// Covers the role and ownership rule only; step legality and the results
/// precondition are checked by [`Workflow::transition`].
pub fn authorize(actor: &Actor, test: &Test, target: Status) -> Result<(), TransitionError> {
    let privileged = actor.role.can_validate();
    let owner = actor.id == test.operator_id;
    let allowed = match target {
        Status::Validated => privileged,
        Status::Draft | Status::InProgress | Status::Completed => privileged || owner,
    };
    if allowed {
        Ok(())
    } else {
        Err(TransitionError::Forbidden {
            actor: actor.id,
            role: actor.role,
            target,
        })
    }
}

fn check_precondition(test: &Test, target: Status) -> Result<(), TransitionError> {
    if target == Status::Validated && !test.has_results() {
        return Err(TransitionError::PreconditionFailed {
            test: DisplayId(test.id),
            target,
        });
    }
    Ok(())
}

/// Statuses `actor` can move `test` to right now
#[must_use]
pub fn available_targets(actor: &Actor, test: &Test) -> Vec<Status> {
    allowed_transitions(test.status)
        .into_iter()
        .filter(|&target| {
            authorize(actor, test, target).is_ok() && check_precondition(test, target).is_ok()
        })
        .collect()
}

/// Applies status changes and reports them
#[derive(Debug)]
pub struct Workflow<S, C = SystemClock> {
    sink: S,
    clock: C,
}

impl<S: AuditSink> Workflow<S> {
    /// Create a workflow reporting to `sink`, stamped by the wall clock
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            clock: SystemClock,
        }
    }
}

impl<S: AuditSink, C: Clock> Workflow<S, C> {
    /// With a different clock
    #[inline]
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Workflow<S, C2> {
        Workflow {
            sink: self.sink,
            clock,
        }
    }

    /// Audit sink
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Set `test` to `target` on behalf of `actor`
    ///
    /// Checks run in order: authorization, same-state no-op, step legality,
    /// results precondition. On any error `test` is left untouched and
    /// nothing is reported.
    pub fn transition(
        &self,
        test: &mut Test,
        actor: &Actor,
        target: Status,
    ) -> Result<TransitionOutcome, TransitionError> {
        let from = test.status;
        let checked = authorize(actor, test, target).and_then(|()| {
            if from == target {
                return Ok(false);
            }
            validate_transition(from, target)?;
            check_precondition(test, target)?;
            Ok(true)
        });

        match checked {
            Ok(false) => {
                tracing::debug!(test = %DisplayId(test.id), status = %from, "status unchanged");
                Ok(TransitionOutcome::Unchanged)
            }
            Ok(true) => {
                test.status = target;
                let event = TransitionEvent {
                    event_id: EventId::new(),
                    test_id: test.id,
                    actor: actor.id,
                    role: actor.role,
                    from,
                    to: target,
                    timestamp: self.clock.now(),
                };
                self.sink.record(&event);
                tracing::info!(
                    test = %DisplayId(test.id),
                    actor = %actor.id,
                    role = %actor.role,
                    %from,
                    to = %target,
                    "status changed"
                );
                Ok(TransitionOutcome::Applied(event))
            }
            Err(err) => {
                tracing::warn!(
                    test = %DisplayId(test.id),
                    actor = %actor.id,
                    role = %actor.role,
                    %from,
                    to = %target,
                    error = %err,
                    "status change refused"
                );
                Err(err)
            }
        }
    }

    /// Move `test` one step forward
    pub fn advance(
        &self,
        test: &mut Test,
        actor: &Actor,
    ) -> Result<TransitionOutcome, TransitionError> {
        match test.status.next() {
            Some(target) => self.transition(test, actor, target),
            None => Err(TransitionError::IllegalTransition {
                from: test.status,
                to: test.status,
            }),
        }
    }
}
