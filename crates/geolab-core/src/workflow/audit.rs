//! Transition audit trail
//!
//! [`TransitionLog`] keeps applied transitions in append order, each entry
//! chained to its predecessor by a SHA-256 hash.

use crate::error::LogError;
use crate::types::{Role, Status, TestId, UserId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Audit event identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Fresh random identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One applied status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub event_id: EventId,
    /// `None` for a test not yet persisted
    pub test_id: Option<TestId>,
    pub actor: UserId,
    /// Role held when acting
    pub role: Role,
    pub from: Status,
    pub to: Status,
    pub timestamp: DateTime<Utc>,
}

/// Receiver of applied transitions
pub trait AuditSink {
    /// Record one applied transition
    fn record(&self, event: &TransitionEvent);
}

impl<F> AuditSink for F
where
    F: Fn(&TransitionEvent),
{
    fn record(&self, event: &TransitionEvent) {
        self(event);
    }
}

/// Chained log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub event: TransitionEvent,
    #[serde(with = "hex_digest")]
    pub prev_hash: [u8; 32],
    #[serde(with = "hex_digest")]
    pub hash: [u8; 32],
}

/// In-memory, hash-chained transition log
#[derive(Debug, Default)]
pub struct TransitionLog {
    inner: Mutex<Vec<LogEntry>>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries; call [`Self::verify_integrity`]
    /// before trusting it.
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self {
            inner: Mutex::new(entries),
        }
    }

    pub fn append(&self, event: TransitionEvent) -> EventId {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map(|e| e.hash).unwrap_or([0u8; 32]);
        let hash = compute_hash(&event, &prev_hash);
        let event_id = event.event_id;
        guard.push(LogEntry {
            event,
            prev_hash,
            hash,
        });
        event_id
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().clone()
    }

    pub fn events(&self) -> Vec<TransitionEvent> {
        self.inner.lock().iter().map(|e| e.event.clone()).collect()
    }

    /// Events of one test, oldest first
    pub fn history(&self, test: TestId) -> Vec<TransitionEvent> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.event.test_id == Some(test))
            .map(|e| e.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Hex digest of the newest entry
    pub fn head(&self) -> Option<String> {
        self.inner.lock().last().map(|e| hex::encode(e.hash))
    }

    pub fn verify_integrity(&self) -> Result<(), LogError> {
        let guard = self.inner.lock();
        let mut prev = [0u8; 32];
        for (position, e) in guard.iter().enumerate() {
            if e.prev_hash != prev || e.hash != compute_hash(&e.event, &e.prev_hash) {
                tracing::warn!(position, "transition log chain broken");
                return Err(LogError::IntegrityViolation { position });
            }
            prev = e.hash;
        }
        Ok(())
    }
}

impl AuditSink for TransitionLog {
    fn record(&self, event: &TransitionEvent) {
        self.append(event.clone());
    }
}

impl AuditSink for &TransitionLog {
    fn record(&self, event: &TransitionEvent) {
        self.append(event.clone());
    }
}

impl<T: AuditSink + ?Sized> AuditSink for std::sync::Arc<T> {
    fn record(&self, event: &TransitionEvent) {
        (**self).record(event);
    }
}

fn compute_hash(event: &TransitionEvent, prev_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(event.event_id.0.as_bytes());
    match event.test_id {
        Some(id) => {
            hasher.update([1]);
            hasher.update(id.0.to_le_bytes());
        }
        None => hasher.update([0]),
    }
    hasher.update(event.actor.0.to_le_bytes());
    hasher.update(event.role.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.from.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.to.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(event.timestamp.to_rfc3339().as_bytes());
    hasher.update([0]);
    hasher.update(prev_hash);
    hasher.finalize().into()
}

mod hex_digest {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&text, &mut out).map_err(D::Error::custom)?;
        Ok(out)
    }
}
