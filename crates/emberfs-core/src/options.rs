//! Volume configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for an in-memory volume.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct VolumeOptions {
    /// Volume name, used in diagnostics.
    pub name: String,

    /// Upper bound on waiting for the volume iterator lock before a
    /// cursor attach/detach operation fails.
    #[builder(default = "default_lock_timeout()")]
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: Duration,

    /// Maximum length of an entry name in bytes.
    #[builder(default = "default_max_name_length()")]
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

fn default_lock_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_max_name_length() -> usize {
    255
}

impl VolumeOptions {
    /// Options with the given name and defaults for everything else.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lock_timeout: default_lock_timeout(),
            max_name_length: default_max_name_length(),
        }
    }
}

impl VolumeOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err("volume name must not be empty".to_string());
            }
        }
        if let Some(max) = self.max_name_length {
            if max == 0 {
                return Err("max_name_length must be at least 1".to_string());
            }
        }
        if let Some(timeout) = self.lock_timeout {
            if timeout.is_zero() {
                return Err("lock_timeout must be non-zero".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_defaults() {
        let options = VolumeOptions::named("scratch");
        assert_eq!(options.name, "scratch");
        assert_eq!(options.max_name_length, 255);
        assert!(!options.lock_timeout.is_zero());
    }

    #[test]
    fn test_builder() {
        let options = VolumeOptionsBuilder::default()
            .name("scratch")
            .lock_timeout(Duration::from_millis(50))
            .max_name_length(64usize)
            .build()
            .unwrap();
        assert_eq!(options.lock_timeout, Duration::from_millis(50));
        assert_eq!(options.max_name_length, 64);
    }

    #[test]
    fn test_builder_rejects_empty_name() {
        let result = VolumeOptionsBuilder::default().name("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = VolumeOptionsBuilder::default()
            .name("scratch")
            .lock_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
