//! Persistence collaborator: where configuration blocks come from.
//!
//! The control core never writes configuration back. Storage backends
//! (EEPROM, flash, host files) implement [`ConfigSource`].

use crate::global::GlobalConfig;
use crate::model::{KeyConfig, ModelConfig};

/// Error type for configuration loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage could not be read.
    Io,
    /// Block read but failed its integrity check.
    Corrupted,
    /// No block stored for the requested model.
    NotFound,
}

/// Source of configuration blocks.
pub trait ConfigSource {
    /// Load the global configuration block.
    fn load_global(&mut self) -> Result<GlobalConfig, ConfigError>;

    /// Load the model block at `index`.
    fn load_model(&mut self, index: u8) -> Result<ModelConfig, ConfigError>;

    /// Load the key mapping that belongs to model `index`.
    fn load_keys(&mut self, index: u8) -> Result<KeyConfig, ConfigError>;
}

/// Configuration source that always yields factory defaults.
///
/// Use this when no storage backend is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfig;

impl ConfigSource for DefaultConfig {
    fn load_global(&mut self) -> Result<GlobalConfig, ConfigError> {
        Ok(GlobalConfig::default())
    }

    fn load_model(&mut self, _index: u8) -> Result<ModelConfig, ConfigError> {
        Ok(ModelConfig::default())
    }

    fn load_keys(&mut self, _index: u8) -> Result<KeyConfig, ConfigError> {
        Ok(KeyConfig::default())
    }
}
