//! Content factory for loading every data file from one directory.

use std::path::{Path, PathBuf};

use ability_core::{AbilityConfig, HeroCatalog};

use crate::loaders::{ConfigLoader, HeroLoader, LoadResult};

/// Content factory that loads all ability content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── ability.toml
/// └── heroes.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load ability configuration from `ability.toml`, or defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<AbilityConfig> {
        let path = self.data_dir.join("ability.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no ability config; using defaults");
            return Ok(AbilityConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load hero configurations from `heroes.ron`.
    pub fn load_heroes(&self) -> LoadResult<HeroCatalog> {
        let path = self.data_dir.join("heroes.ron");
        HeroLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
