// Configuration loading for Rampart components

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Layered configuration store
///
/// Sources are merged in load order; a later source overwrites keys set by
/// an earlier one. The merged object is deserialized into a typed struct
/// with [`ConfigManager::load_validated`].
#[derive(Clone, Default)]
pub struct ConfigManager {
    values: Arc<RwLock<Map<String, Value>>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn merge_object(&self, value: Value) {
        if let Value::Object(map) = value {
            self.values.write().extend(map);
        }
    }

    /// Merge a JSON, TOML or env file, detecting the format from its name
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::auto(path)?.load_file(path)?;
        self.merge_object(data);
        Ok(())
    }

    /// Merge an in-memory document
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.merge_object(data);
        Ok(())
    }

    /// Deserialize everything loaded so far into `T` and validate it
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let snapshot = Value::Object(self.values.read().clone());

        let typed: T = serde_json::from_value(snapshot)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        typed.validate()?;

        Ok(typed)
    }
}
