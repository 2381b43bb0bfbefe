//! Mana resource, shield ability and trigger volume rules.
//!
//! `ability-core` owns the gameplay logic shared by every host: the mana
//! attribute set and its clamping, duration and periodic effects, the
//! ability lifecycle, the mana component that bridges attribute events to
//! listeners, and the trigger volume policy. It performs no I/O; hosts drive
//! it by ticking characters and pumping their queued notifications.
#[macro_use]
mod macros;

pub mod ability;
pub mod attributes;
pub mod character;
pub mod component;
pub mod config;
pub mod effect;
pub mod error;
pub mod hero;
pub mod messaging;
pub mod state;
pub mod system;
pub mod tags;
pub mod trigger;

pub use ability::{
    AbilityContext, AbilityError, AbilitySpec, AbilitySpecHandle, AbilityState, GameplayAbility,
    InputResponse, ManaShieldAbility,
};
pub use attributes::{
    Aggregate, AttributeData, ManaAttribute, ManaEvent, ManaEventKind, ManaNotification, ManaSet,
    ModifierExecution, ObserverId, ObserverList,
};
pub use character::{ActorRegistry, Character, CharacterMap};
pub use component::{ComponentError, ManaChange, ManaComponent};
pub use config::AbilityConfig;
pub use effect::{
    ActiveEffect, ActiveEffects, EffectContext, EffectDuration, EffectHandle, EffectTemplate,
    ModOp, Modifier,
};
pub use error::{ErrorCategory, GameError};
pub use hero::{HeroCatalog, HeroConfig};
pub use messaging::{ListenerHandle, MessageBus, Multicast, Signal, Subscription, VerbMessage};
pub use state::{Aabb, EntityId, Vec3};
pub use system::{AbilitySystem, EffectHost};
pub use tags::{GameplayTag, TagCounts};
pub use trigger::{TriggerError, TriggerVolume};
