//! In-memory [`SessionStore`] for tests and ephemeral sessions

use std::collections::HashMap;
use std::sync::Mutex;

use super::SessionStore;
use crate::error::{EcomdeskError, Result};

/// [`SessionStore`] that keeps values in a map
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `session_id` (and optionally an
    /// active case), as after a restart.
    pub fn with_session(session_id: &str, active_case: Option<&str>) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(super::SESSION_KEY.to_string(), session_id.to_string());
            if let Some(case_id) = active_case {
                values.insert(super::active_case_key(session_id), case_id.to_string());
            }
        }
        store
    }

    /// `true` when `key` currently holds a value
    pub fn contains(&self, key: &str) -> bool {
        self.values
            .lock()
            .map(|values| values.contains_key(key))
            .unwrap_or(false)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().map(|values| values.len()).unwrap_or(0)
    }

    /// `true` when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> anyhow::Error {
    EcomdeskError::Storage("memory store lock poisoned".to_string()).into()
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.remove(key);
        Ok(())
    }
}
