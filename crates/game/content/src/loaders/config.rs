//! Ability configuration loader.

use std::path::Path;

use ability_core::AbilityConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for ability configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<AbilityConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AbilityConfig> {
        let config: AbilityConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.default_max_mana < AbilityConfig::MIN_MAX_MANA {
            anyhow::bail!(
                "default_max_mana must be at least {}, got {}",
                AbilityConfig::MIN_MAX_MANA,
                config.default_max_mana
            );
        }
        if config.trigger_half_extent <= 0.0 {
            anyhow::bail!(
                "trigger_half_extent must be positive, got {}",
                config.trigger_half_extent
            );
        }

        Ok(config)
    }
}
