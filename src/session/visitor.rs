//! Per-visitor dialogue state and its store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default visitor timeout (30 minutes).
pub const DEFAULT_VISITOR_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Where a visitor is in the scripted dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogueState {
    /// Script step; 0 means no question has been asked yet.
    pub step: usize,
    /// Last knowledge-base answer, repeated on "tell me more".
    pub last_answer: Option<String>,
}

impl DialogueState {
    /// Forget progress and any remembered answer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single visitor.
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone)]
pub struct Visitor {
    inner: Arc<VisitorInner>,
}

#[derive(Debug)]
struct VisitorInner {
    id: String,
    state: RwLock<DialogueState>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Visitor {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(VisitorInner {
                id,
                state: RwLock::new(DialogueState::default()),
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Get the visitor ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Snapshot of the dialogue state.
    #[must_use]
    pub fn state(&self) -> DialogueState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `f` with exclusive access to the dialogue state.
    ///
    /// Concurrent messages from the same visitor are serialized here.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut DialogueState) -> R) -> R {
        let result = {
            let mut guard = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        self.touch();
        result
    }

    fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Check if the visitor has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // Negative duration means clock skew; treat as active.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for visitors.
#[derive(Debug, Clone, Default)]
pub struct VisitorStore {
    inner: Arc<RwLock<HashMap<String, Visitor>>>,
}

impl VisitorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a visitor by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Visitor> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    /// Get a visitor by ID, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Visitor {
        if let Some(visitor) = self.get(id) {
            return visitor;
        }

        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| Visitor::new(id.to_string()))
            .clone()
    }

    /// Remove a visitor by ID.
    pub fn remove(&self, id: &str) -> Option<Visitor> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(id)
    }

    /// Get the number of known visitors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no visitors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove visitors that have been inactive longer than the timeout.
    ///
    /// Returns the number of visitors removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, visitor| !visitor.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_lifecycle() {
        let store = VisitorStore::new();
        assert!(store.is_empty());

        let visitor = store.get_or_create("10.0.0.1");
        assert_eq!(visitor.id(), "10.0.0.1");
        assert_eq!(visitor.state(), DialogueState::default());

        visitor.with_state(|s| s.step = 3);
        assert_eq!(store.get_or_create("10.0.0.1").state().step, 3);
        assert_eq!(store.len(), 1);

        store.remove("10.0.0.1");
        assert!(store.get("10.0.0.1").is_none());
    }

    #[test]
    fn test_reset_clears_answer() {
        let mut state = DialogueState {
            step: 5,
            last_answer: Some("Hostel hai".to_string()),
        };
        state.reset();
        assert_eq!(state, DialogueState::default());
    }

    #[test]
    fn test_cleanup_expired() {
        let store = VisitorStore::new();
        let _ = store.get_or_create("a");
        let _ = store.get_or_create("b");

        assert_eq!(store.cleanup_expired_with_timeout(DEFAULT_VISITOR_TIMEOUT), 0);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_millis(5)), 2);
        assert!(store.is_empty());
    }
}
