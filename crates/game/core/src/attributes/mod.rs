//! Attribute sets owned by an ability system.
//!
//! An attribute keeps a base value (changed permanently by executed effects)
//! and a current value (base combined with the modifiers of active duration
//! effects). Sets clamp both values and publish change events to an explicit
//! observer list.

mod mana;
mod observer;

pub use mana::ManaSet;
pub use observer::{ManaEvent, ManaEventKind, ManaNotification, ObserverId, ObserverList};

use crate::effect::ModOp;
use crate::state::EntityId;

/// Attributes of the mana set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManaAttribute {
    /// Current mana, clamped into `[0, MaxMana]`.
    Mana,
    /// Maximum mana, never below 1.
    MaxMana,
    /// Meta channel: folded into `+Mana` on execution, then reset.
    ManaRecover,
    /// Meta channel: folded into `-Mana` on execution, then reset.
    ManaDecrease,
}

/// Modifiers of active duration effects, folded per attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    pub add: f32,
    pub multiply: f32,
    pub divide: f32,
    pub override_value: Option<f32>,
}

impl Aggregate {
    pub const IDENTITY: Self = Self {
        add: 0.0,
        multiply: 1.0,
        divide: 1.0,
        override_value: None,
    };

    /// Folds one modifier into the aggregate. The last override wins.
    pub fn push(&mut self, op: ModOp, magnitude: f32) {
        match op {
            ModOp::Add => self.add += magnitude,
            ModOp::Multiply => self.multiply *= magnitude,
            ModOp::Divide => self.divide *= magnitude,
            ModOp::Override => self.override_value = Some(magnitude),
        }
    }

    /// `((base + add) * multiply) / divide`, unless overridden.
    pub fn evaluate(&self, base: f32) -> f32 {
        if let Some(value) = self.override_value {
            return value;
        }
        let scaled = (base + self.add) * self.multiply;
        if self.divide == 0.0 {
            scaled
        } else {
            scaled / self.divide
        }
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Base and current value of one attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeData {
    base: f32,
    current: f32,
    aggregate: Aggregate,
}

impl AttributeData {
    pub const fn new(value: f32) -> Self {
        Self {
            base: value,
            current: value,
            aggregate: Aggregate::IDENTITY,
        }
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }
}

/// Inputs of one modifier execution (instant or periodic effect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifierExecution {
    pub attribute: ManaAttribute,
    pub op: ModOp,
    pub magnitude: f32,
    pub instigator: Option<EntityId>,
    pub causer: Option<EntityId>,
}
