//! Modifier templates, applied effect instances and the handles that track them.
//!
//! A template describes *how* to change attributes; applying it to an ability
//! system either executes its modifiers once (instant) or creates an active
//! effect that lives until removed or expired, optionally executing every
//! period. Non-instant applications return an [`EffectHandle`].

mod active;

pub use active::{ActiveEffect, ActiveEffects, EffectTick, StackRemoval};

use crate::attributes::ManaAttribute;
use crate::state::EntityId;
use crate::tags::GameplayTag;

/// Arithmetic applied by a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModOp {
    Add,
    Multiply,
    Divide,
    Override,
}

impl ModOp {
    /// Applies the operation to `value`. Division by zero leaves the value unchanged.
    pub fn apply(self, value: f32, magnitude: f32) -> f32 {
        match self {
            ModOp::Add => value + magnitude,
            ModOp::Multiply => value * magnitude,
            ModOp::Divide if magnitude == 0.0 => value,
            ModOp::Divide => value / magnitude,
            ModOp::Override => magnitude,
        }
    }
}

/// One attribute change carried by a template.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub attribute: ManaAttribute,
    pub op: ModOp,
    pub magnitude: f32,
}

impl Modifier {
    pub const fn new(attribute: ManaAttribute, op: ModOp, magnitude: f32) -> Self {
        Self {
            attribute,
            op,
            magnitude,
        }
    }
}

/// Lifetime of an applied template.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Executes immediately and leaves nothing behind.
    Instant,
    /// Stays active until explicitly removed.
    Infinite,
    /// Stays active for the given number of seconds.
    HasDuration(f32),
}

/// Reusable description of an attribute change (decrease, recover, cooldown).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTemplate {
    pub name: String,
    pub duration: EffectDuration,
    /// Seconds between executions. Periodic effects also execute on application.
    #[cfg_attr(feature = "serde", serde(default))]
    pub period: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<Modifier>,
    /// Tags the target carries while the effect is active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub granted_tags: Vec<GameplayTag>,
    /// `None` creates a new instance per application; `Some(n)` stacks
    /// re-applications onto the existing instance, up to `n` stacks.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_limit: Option<u32>,
}

impl EffectTemplate {
    fn with_lifetime(name: impl Into<String>, duration: EffectDuration) -> Self {
        Self {
            name: name.into(),
            duration,
            period: None,
            modifiers: Vec::new(),
            granted_tags: Vec::new(),
            stack_limit: None,
        }
    }

    pub fn instant(name: impl Into<String>) -> Self {
        Self::with_lifetime(name, EffectDuration::Instant)
    }

    pub fn infinite(name: impl Into<String>) -> Self {
        Self::with_lifetime(name, EffectDuration::Infinite)
    }

    pub fn timed(name: impl Into<String>, seconds: f32) -> Self {
        Self::with_lifetime(name, EffectDuration::HasDuration(seconds))
    }

    pub fn with_period(mut self, seconds: f32) -> Self {
        self.period = Some(seconds);
        self
    }

    pub fn with_modifier(mut self, attribute: ManaAttribute, op: ModOp, magnitude: f32) -> Self {
        self.modifiers.push(Modifier::new(attribute, op, magnitude));
        self
    }

    pub fn granting(mut self, tag: GameplayTag) -> Self {
        self.granted_tags.push(tag);
        self
    }

    pub fn with_stack_limit(mut self, limit: u32) -> Self {
        self.stack_limit = Some(limit.max(1));
        self
    }

    pub fn is_instant(&self) -> bool {
        matches!(self.duration, EffectDuration::Instant)
    }

    /// Periodic effects execute their modifiers instead of holding them.
    pub fn is_periodic(&self) -> bool {
        !self.is_instant() && self.period.is_some_and(|period| period > 0.0)
    }
}

/// Who caused an application. Both are unknown for world-driven changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectContext {
    pub instigator: Option<EntityId>,
    pub causer: Option<EntityId>,
}

impl EffectContext {
    /// Context for an actor affecting itself.
    pub fn from_self(actor: EntityId) -> Self {
        Self {
            instigator: Some(actor),
            causer: Some(actor),
        }
    }

    pub fn with_causer(mut self, causer: EntityId) -> Self {
        self.causer = Some(causer);
        self
    }
}

/// Opaque reference to one active effect on one ability system.
///
/// The handle knows its owner, so whoever stored it can route the removal
/// back to the right ability system. Whoever stores a handle must
/// [`invalidate`](Self::invalidate) it once the effect is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    owner: EntityId,
    id: u32,
}

impl EffectHandle {
    pub const INVALID: Self = Self {
        owner: EntityId::SYSTEM,
        id: 0,
    };

    pub(crate) fn new(owner: EntityId, id: u32) -> Self {
        debug_assert!(id != 0, "effect id 0 is reserved for invalid handles");
        Self { owner, id }
    }

    pub fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Ability system owner the handle belongs to.
    pub fn owner(&self) -> Option<EntityId> {
        self.is_valid().then_some(self.owner)
    }

    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }
}

impl Default for EffectHandle {
    fn default() -> Self {
        Self::INVALID
    }
}
