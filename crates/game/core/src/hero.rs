//! Per-actor hero configuration: which modifier templates drive the mana
//! resource. Every template may be unset; consumers treat a missing template
//! as a configuration warning and apply nothing.

use std::collections::BTreeMap;

use crate::effect::EffectTemplate;

/// Modifier templates and starting values of one hero.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeroConfig {
    /// Starting max mana; falls back to `AbilityConfig::default_max_mana`.
    pub max_mana: Option<f32>,
    /// Applied while the shield is up or the hero stands in a trigger volume.
    pub mana_decrease: Option<EffectTemplate>,
    /// Applied when the shield ends or the hero leaves a trigger volume.
    pub mana_cooldown: Option<EffectTemplate>,
    /// Applied for the lifetime of the mana component binding.
    pub mana_recover: Option<EffectTemplate>,
}

impl HeroConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_mana(mut self, max_mana: f32) -> Self {
        self.max_mana = Some(max_mana);
        self
    }

    pub fn with_mana_decrease(mut self, template: EffectTemplate) -> Self {
        self.mana_decrease = Some(template);
        self
    }

    pub fn with_mana_cooldown(mut self, template: EffectTemplate) -> Self {
        self.mana_cooldown = Some(template);
        self
    }

    pub fn with_mana_recover(mut self, template: EffectTemplate) -> Self {
        self.mana_recover = Some(template);
        self
    }

    pub fn mana_decrease(&self) -> Option<&EffectTemplate> {
        self.mana_decrease.as_ref()
    }

    pub fn mana_cooldown(&self) -> Option<&EffectTemplate> {
        self.mana_cooldown.as_ref()
    }

    pub fn mana_recover(&self) -> Option<&EffectTemplate> {
        self.mana_recover.as_ref()
    }
}

/// Hero configurations keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HeroCatalog {
    heroes: BTreeMap<String, HeroConfig>,
}

impl HeroCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, hero: HeroConfig) {
        self.heroes.insert(name.into(), hero);
    }

    pub fn get(&self, name: &str) -> Option<&HeroConfig> {
        self.heroes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.heroes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
