//! Widgets hosted for browser visitors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::widget::ChatClient;

#[derive(Debug)]
struct HostedWidget {
    client: ChatClient,
    last_activity: DateTime<Utc>,
}

/// One [`ChatClient`] per visitor, kept on the server between page requests.
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    inner: Arc<Mutex<HashMap<String, HostedWidget>>>,
}

impl WidgetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the visitor's widget, creating a fresh one if needed.
    ///
    /// Requests for the same store are serialized.
    pub fn with_widget<R>(&self, visitor_id: &str, f: impl FnOnce(&mut ChatClient) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let widget = guard
            .entry(visitor_id.to_string())
            .or_insert_with(|| HostedWidget {
                client: ChatClient::new(),
                last_activity: Utc::now(),
            });
        widget.last_activity = Utc::now();
        f(&mut widget.client)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop widgets idle for longer than `timeout`. Returns how many were dropped.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let now = Utc::now();
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, widget| {
            !(now - widget.last_activity)
                .to_std()
                .is_ok_and(|idle| idle > timeout)
        });
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_persists_per_visitor() {
        let store = WidgetStore::new();
        store.with_widget("a", ChatClient::toggle_theme);

        assert!(store.with_widget("a", |c| c.theme().is_dark()));
        assert!(!store.with_widget("b", |c| c.theme().is_dark()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = WidgetStore::new();
        store.with_widget("a", |_| ());

        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_secs(60)), 0);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_millis(5)), 1);
        assert!(store.is_empty());
    }
}
