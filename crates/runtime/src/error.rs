//! Error types surfaced by the world API.
//!
//! Wraps the ability-core errors so hosts can bubble them up with one type
//! while keeping their category.
use ability_core::{
    AbilityError, ComponentError, EntityId, ErrorCategory, GameError, TriggerError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorldError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("actor {0} does not exist")]
    UnknownActor(EntityId),

    #[error("actor {0} is not a character")]
    NotACharacter(EntityId),

    #[error("hero `{0}` is not in the catalog")]
    UnknownHero(String),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Ability(#[from] AbilityError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),
}

impl GameError for WorldError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownActor(_) | Self::NotACharacter(_) => ErrorCategory::InvalidReference,
            Self::UnknownHero(_) => ErrorCategory::ConfigurationAbsent,
            Self::Component(err) => err.category(),
            Self::Ability(err) => err.category(),
            Self::Trigger(err) => err.category(),
        }
    }

    fn actor(&self) -> Option<EntityId> {
        match self {
            Self::UnknownActor(id) | Self::NotACharacter(id) => Some(*id),
            Self::UnknownHero(_) => None,
            Self::Component(err) => err.actor(),
            Self::Ability(err) => err.actor(),
            Self::Trigger(err) => err.actor(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownActor(_) => "WORLD_UNKNOWN_ACTOR",
            Self::NotACharacter(_) => "WORLD_NOT_A_CHARACTER",
            Self::UnknownHero(_) => "WORLD_UNKNOWN_HERO",
            Self::Component(err) => err.error_code(),
            Self::Ability(err) => err.error_code(),
            Self::Trigger(err) => err.error_code(),
        }
    }
}
