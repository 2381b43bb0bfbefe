//! Gameplay abilities and their activation lifecycle.
//!
//! An ability is granted to an [`AbilitySystem`](crate::AbilitySystem) and
//! moves through [`AbilityState`]. The system performs the base bookkeeping
//! (state, ability tags); implementations only supply the ability-specific
//! parts through [`GameplayAbility`].

mod shield;

pub use shield::ManaShieldAbility;

use std::fmt;

use crate::error::{ErrorCategory, GameError};
use crate::hero::HeroConfig;
use crate::messaging::MessageBus;
use crate::state::EntityId;
use crate::system::EffectHost;
use crate::tags::GameplayTag;

/// Lifecycle state of a granted ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum AbilityState {
    Inactive,
    Activating,
    Active,
    Ending,
}

/// Identifies one granted ability on one ability system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbilitySpecHandle(pub(crate) u32);

/// What an active ability does with an input press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResponse {
    Ignore,
    EndAbility,
}

/// Everything an ability may touch while one of its hooks runs.
pub struct AbilityContext<'a> {
    /// The actor the ability acts for.
    pub avatar: Option<EntityId>,
    pub host: Option<&'a mut EffectHost>,
    pub hero: Option<&'a HeroConfig>,
    pub bus: &'a mut MessageBus,
}

/// Errors returned by ability hooks and the ability system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbilityError {
    #[error("ability {0:?} is not granted")]
    UnknownSpec(AbilitySpecHandle),

    #[error("ability system of {owner} is not reachable")]
    MissingAbilitySystem { owner: EntityId },

    #[error("avatar actor is not valid")]
    InvalidAvatar,
}

impl GameError for AbilityError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidReference
    }

    fn actor(&self) -> Option<EntityId> {
        match self {
            Self::MissingAbilitySystem { owner } => Some(*owner),
            Self::UnknownSpec(_) | Self::InvalidAvatar => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSpec(_) => "ABILITY_UNKNOWN_SPEC",
            Self::MissingAbilitySystem { .. } => "ABILITY_MISSING_SYSTEM",
            Self::InvalidAvatar => "ABILITY_INVALID_AVATAR",
        }
    }
}

/// Ability-specific behavior plugged into the ability system.
pub trait GameplayAbility {
    fn name(&self) -> &'static str;

    /// Tags carried by the ability; the owner holds them while it is active.
    fn ability_tags(&self) -> &[GameplayTag];

    /// The ability refuses to activate while the owner holds any of these.
    fn activation_blocked_tags(&self) -> &[GameplayTag] {
        &[]
    }

    fn can_activate(&self, ctx: &AbilityContext<'_>) -> bool {
        ctx.host.as_deref().is_some_and(|host| {
            !self
                .activation_blocked_tags()
                .iter()
                .any(|tag| host.has_tag(*tag))
        })
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>);

    fn input_pressed(&mut self, _ctx: &mut AbilityContext<'_>) -> InputResponse {
        InputResponse::Ignore
    }

    /// Ability-specific teardown. An error skips the base end bookkeeping,
    /// leaving the ability active.
    fn end(&mut self, ctx: &mut AbilityContext<'_>, was_cancelled: bool)
    -> Result<(), AbilityError>;
}

/// A granted ability and its lifecycle state.
pub struct AbilitySpec {
    pub(crate) handle: AbilitySpecHandle,
    pub(crate) ability: Box<dyn GameplayAbility>,
    pub(crate) state: AbilityState,
}

impl AbilitySpec {
    pub(crate) fn new(handle: AbilitySpecHandle, ability: Box<dyn GameplayAbility>) -> Self {
        Self {
            handle,
            ability,
            state: AbilityState::Inactive,
        }
    }

    pub fn handle(&self) -> AbilitySpecHandle {
        self.handle
    }

    pub fn state(&self) -> AbilityState {
        self.state
    }

    pub fn name(&self) -> &'static str {
        self.ability.name()
    }
}

impl fmt::Debug for AbilitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilitySpec")
            .field("handle", &self.handle)
            .field("ability", &self.ability.name())
            .field("state", &self.state)
            .finish()
    }
}
