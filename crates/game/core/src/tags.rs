//! Gameplay tags and per-owner tag bookkeeping.

use std::collections::BTreeMap;

/// Finite set of gameplay tags understood by the ability layer.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameplayTag {
    /// Carried by the shield ability; abilities with it are cancelled on depletion.
    #[strum(serialize = "Ability.ManaShield")]
    AbilityManaShield,
    /// Granted by the cooldown effect; blocks shield activation while present.
    #[strum(serialize = "Cooldown.ManaShield")]
    CooldownManaShield,
}

/// Loose (manually managed) tag counts of one ability system.
///
/// Tags granted by active effects are tracked by the effects themselves and
/// combined with these counts by the owning ability system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagCounts {
    counts: BTreeMap<GameplayTag, u32>,
}

impl TagCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, tag: GameplayTag) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Overrides the count; zero removes the tag.
    pub fn set(&mut self, tag: GameplayTag, count: u32) {
        if count == 0 {
            self.counts.remove(&tag);
        } else {
            self.counts.insert(tag, count);
        }
    }

    pub fn add(&mut self, tag: GameplayTag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    /// Decrements the count, saturating at zero.
    pub fn remove(&mut self, tag: GameplayTag) {
        let count = self.count(tag).saturating_sub(1);
        self.set(tag, count);
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
