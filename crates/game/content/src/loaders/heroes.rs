//! Hero catalog loader.

use std::path::Path;

use ability_core::HeroCatalog;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Hero catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroFile {
    pub heroes: HeroCatalog,
}

/// Loader for hero configurations from RON files.
pub struct HeroLoader;

impl HeroLoader {
    pub fn load(path: &Path) -> LoadResult<HeroCatalog> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), heroes = catalog.len(), "loaded hero catalog");
        Ok(catalog)
    }

    pub fn parse(content: &str) -> LoadResult<HeroCatalog> {
        let file: HeroFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse hero catalog RON: {}", e))?;

        Ok(file.heroes)
    }
}
