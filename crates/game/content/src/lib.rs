//! Data-driven hero and ability content.
//!
//! This crate provides loaders for the data files a host reads at startup:
//! - Hero configurations with their effect templates (RON)
//! - Ability tuning such as default max mana and trigger size (TOML)
//!
//! All loaders deserialize ability-core types directly with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, HeroLoader, LoadResult};
