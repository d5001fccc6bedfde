//! History seam and an in-memory implementation.

use std::sync::Mutex;

use anyhow::Error;
use serde_json::Value;

/// Navigation history owned by the host.
///
/// The router pushes one entry per committing navigation and reads back the
/// payload of whichever entry is currently active. Back/forward movement is
/// the host's business; it reaches the router as a
/// [`NavRequest::HistoryPop`](crate::controller::NavRequest::HistoryPop).
pub trait HistorySink: Send + Sync {
    /// Record a new entry for `path` carrying `data`.
    fn push(&self, path: &str, data: Value) -> Result<(), Error>;

    /// Payload attached to the currently active entry, if any.
    fn current_data(&self) -> Option<Value>;
}

impl<T: HistorySink + ?Sized> HistorySink for std::sync::Arc<T> {
    fn push(&self, path: &str, data: Value) -> Result<(), Error> {
        (**self).push(path, data)
    }

    fn current_data(&self) -> Option<Value> {
        (**self).current_data()
    }
}

/// Growable in-process history stack.
///
/// The stock sink for embedding without a browser-style history, and the
/// back/forward simulator in tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<(String, Value)>>,
}

impl MemoryHistory {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the most recent entry, if any.
    pub fn current_path(&self) -> Option<String> {
        self.lock().last().map(|(path, _)| path.clone())
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop the most recent entry and return the newly active path,
    /// mimicking a back button for tests and embedders.
    pub fn pop(&self) -> Option<String> {
        let mut entries = self.lock();
        entries.pop();
        entries.last().map(|(path, _)| path.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, Value)>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl HistorySink for MemoryHistory {
    fn push(&self, path: &str, data: Value) -> Result<(), Error> {
        self.lock().push((path.to_owned(), data));
        Ok(())
    }

    fn current_data(&self) -> Option<Value> {
        self.lock().last().map(|(_, data)| data.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{HistorySink, MemoryHistory};

    #[test]
    fn tracks_the_active_entry() {
        let history = MemoryHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.current_data(), None);

        history.push("/a", json!({ "n": 1 })).unwrap();
        history.push("/b", json!(null)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_path().as_deref(), Some("/b"));
        assert_eq!(history.current_data(), Some(json!(null)));

        assert_eq!(history.pop().as_deref(), Some("/a"));
        assert_eq!(history.current_data(), Some(json!({ "n": 1 })));
    }
}
