//! Deferred values, loaded in one batch once every field asking for them has
//! been visited.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;
use serde_json_bytes::Value;

use crate::error::ProviderError;

/// Loads many keys in a single data provider call.
pub trait BatchLoad: Send + Sync {
    /// Values for the keys found. Keys left out resolve to `null`.
    fn load(&self, keys: &[String]) -> Result<HashMap<String, Value>, ProviderError>;
}

#[derive(Default)]
struct BatchState {
    pending: IndexSet<String>,
    loaded: HashMap<String, Result<Value, ProviderError>>,
}

/// A request scoped batch around a [`BatchLoad`].
pub struct BatchLoader {
    name: String,
    load: Arc<dyn BatchLoad>,
    state: Mutex<BatchState>,
}

impl fmt::Debug for BatchLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BatchLoader")
            .field("name", &self.name)
            .field("pending", &state.pending.len())
            .field("loaded", &state.loaded.len())
            .finish()
    }
}

impl BatchLoader {
    pub fn new(name: impl Into<String>, load: Arc<dyn BatchLoad>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            load,
            state: Mutex::new(BatchState::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `key` for the next batch.
    pub fn defer(self: &Arc<Self>, key: impl Into<String>) -> Deferred {
        let key = key.into();
        {
            let mut state = self.state.lock();
            if !state.loaded.contains_key(&key) {
                state.pending.insert(key.clone());
            }
        }
        Deferred {
            loader: self.clone(),
            key,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.state.lock().pending.is_empty()
    }

    /// Loads every pending key with one call to the underlying [`BatchLoad`].
    ///
    /// When the call fails every key of the batch resolves to the error.
    pub fn dispatch(&self) -> Result<(), ProviderError> {
        let keys: Vec<String> = {
            let mut state = self.state.lock();
            state.pending.drain(..).collect()
        };
        if keys.is_empty() {
            return Ok(());
        }
        tracing::trace!(loader = self.name.as_str(), keys = keys.len(), "dispatching batch");
        let result = self.load.load(&keys);
        let mut state = self.state.lock();
        match result {
            Ok(mut values) => {
                for key in keys {
                    let value = values.remove(&key).unwrap_or(Value::Null);
                    state.loaded.insert(key, Ok(value));
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(loader = self.name.as_str(), %error, "batch load failed");
                for key in keys {
                    state.loaded.insert(key, Err(error.clone()));
                }
                Err(error)
            }
        }
    }

    fn get(&self, key: &str) -> Option<Result<Value, ProviderError>> {
        self.state.lock().loaded.get(key).cloned()
    }
}

/// A value that will be known once its [`BatchLoader`] is dispatched.
#[derive(Debug, Clone)]
pub struct Deferred {
    loader: Arc<BatchLoader>,
    key: String,
}

impl Deferred {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn loader(&self) -> &Arc<BatchLoader> {
        &self.loader
    }

    /// The loaded value. Dispatches the loader if the key is still pending.
    pub fn resolve(&self) -> Result<Value, ProviderError> {
        if let Some(result) = self.loader.get(&self.key) {
            return result;
        }
        self.loader.dispatch()?;
        self.loader.get(&self.key).unwrap_or(Ok(Value::Null))
    }
}
