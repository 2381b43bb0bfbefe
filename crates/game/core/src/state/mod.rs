//! Identity and spatial primitives.
//!
//! Actors are referenced by opaque [`EntityId`]s and resolved through a
//! registry lookup that may fail, never by holding a reference into another
//! actor. Positions and bounds are only used by trigger volumes.
mod common;

pub use common::{Aabb, EntityId, Vec3};
