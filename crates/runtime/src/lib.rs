//! World orchestration for the mana, shield and trigger rules.
//!
//! This crate hosts ability-core characters and trigger volumes in a single
//! [`World`] that hosts drive frame by frame.
//!
//! Modules are organized by responsibility:
//! - [`world`] hosts the orchestrator and builder
//! - [`actors`] keeps the actor table and implements the registry lookup
//! - [`error`] exposes the error type downstream hosts bubble up
pub mod actors;
pub mod error;
pub mod world;

pub use actors::{ActorEntry, ActorKind, Actors};
pub use error::{Result, WorldError};
pub use world::{RuntimeConfig, World, WorldBuilder};
