//! Playable character: ability system, mana component and hero configuration
//! wired together, plus the registry seam the world exposes to volumes.

use std::collections::BTreeMap;

use tracing::trace;

use crate::ability::{AbilityError, AbilitySpecHandle, ManaShieldAbility};
use crate::attributes::ManaSet;
use crate::component::{ComponentError, ManaComponent};
use crate::config::AbilityConfig;
use crate::hero::HeroConfig;
use crate::messaging::MessageBus;
use crate::state::EntityId;
use crate::system::AbilitySystem;

#[derive(Debug)]
pub struct Character {
    id: EntityId,
    hero: Option<HeroConfig>,
    abilities: AbilitySystem,
    mana: ManaComponent,
    shield: AbilitySpecHandle,
}

impl Character {
    /// Builds an unbound character with the shield ability granted.
    pub fn new(id: EntityId, hero: Option<HeroConfig>, config: &AbilityConfig) -> Self {
        let max_mana = hero
            .as_ref()
            .and_then(|hero| hero.max_mana)
            .unwrap_or(config.default_max_mana);

        let mut abilities = AbilitySystem::new(id, ManaSet::with_max_mana(max_mana));
        let shield = abilities.grant_ability(Box::new(ManaShieldAbility::new()));

        let mut mana = ManaComponent::new(id);
        if let Some(recover) = hero.as_ref().and_then(HeroConfig::mana_recover) {
            mana = mana.with_recover_effect(recover.clone());
        }

        Self {
            id,
            hero,
            abilities,
            mana,
            shield,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn hero(&self) -> Option<&HeroConfig> {
        self.hero.as_ref()
    }

    pub fn ability_system(&self) -> &AbilitySystem {
        &self.abilities
    }

    pub fn ability_system_mut(&mut self) -> &mut AbilitySystem {
        &mut self.abilities
    }

    pub fn mana_component(&self) -> &ManaComponent {
        &self.mana
    }

    pub fn mana_component_mut(&mut self) -> &mut ManaComponent {
        &mut self.mana
    }

    pub fn shield_spec(&self) -> AbilitySpecHandle {
        self.shield
    }

    pub fn mana(&self) -> f32 {
        self.mana.mana(&self.abilities)
    }

    pub fn max_mana(&self) -> f32 {
        self.mana.max_mana(&self.abilities)
    }

    pub fn mana_normalized(&self) -> f32 {
        self.mana.mana_normalized(&self.abilities)
    }

    pub fn initialize(&mut self) -> Result<(), ComponentError> {
        self.mana.initialize(&mut self.abilities)
    }

    pub fn uninitialize(&mut self) {
        self.mana.uninitialize(&mut self.abilities);
    }

    pub fn activate_shield(&mut self, bus: &mut MessageBus) -> Result<bool, AbilityError> {
        self.abilities
            .try_activate(self.shield, self.hero.as_ref(), bus)
    }

    pub fn press_shield_input(&mut self, bus: &mut MessageBus) -> Result<(), AbilityError> {
        self.abilities
            .input_pressed(self.shield, self.hero.as_ref(), bus)
    }

    pub fn tick(&mut self, dt: f32) {
        self.abilities.host_mut().tick(dt);
    }

    /// Delivers queued attribute notifications until none are left.
    ///
    /// Handlers may change mana again (a cancelled shield applies its
    /// cooldown), so delivery repeats until the queue stays empty.
    pub fn pump(&mut self, bus: &mut MessageBus) -> usize {
        let mut delivered = 0;
        loop {
            let batch = self.abilities.host_mut().take_notifications();
            if batch.is_empty() {
                break;
            }
            for notification in &batch {
                self.mana.handle_notification(
                    notification,
                    &mut self.abilities,
                    self.hero.as_ref(),
                    bus,
                );
            }
            delivered += batch.len();
        }
        if delivered > 0 {
            trace!(id = %self.id, delivered, "delivered mana notifications");
        }
        delivered
    }
}

/// Lookup of live characters by actor id.
pub trait ActorRegistry {
    fn character(&self, id: EntityId) -> Option<&Character>;
    fn character_mut(&mut self, id: EntityId) -> Option<&mut Character>;
}

/// Characters held in a plain map, keyed by actor id.
pub type CharacterMap = BTreeMap<EntityId, Character>;

impl ActorRegistry for CharacterMap {
    fn character(&self, id: EntityId) -> Option<&Character> {
        self.get(&id)
    }

    fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityState;
    use crate::attributes::ManaAttribute;
    use crate::effect::{EffectTemplate, ModOp};

    #[test]
    fn max_mana_falls_back_to_config() {
        let config = AbilityConfig::new();
        let mut plain = Character::new(EntityId(1), None, &config);
        let mut tuned = Character::new(
            EntityId(2),
            Some(HeroConfig::new().with_max_mana(40.0)),
            &config,
        );

        plain.initialize().unwrap();
        tuned.initialize().unwrap();

        assert_eq!(plain.max_mana(), AbilityConfig::DEFAULT_MAX_MANA);
        assert_eq!(tuned.mana(), 40.0);
    }

    #[test]
    fn pump_cancels_shield_on_depletion() {
        let hero = HeroConfig::new()
            .with_max_mana(20.0)
            .with_mana_decrease(
                EffectTemplate::infinite("drain")
                    .with_period(1.0)
                    .with_modifier(ManaAttribute::ManaDecrease, ModOp::Add, 15.0),
            );
        let mut bus = MessageBus::new();
        let mut character = Character::new(EntityId(1), Some(hero), &AbilityConfig::new());
        character.initialize().unwrap();

        assert_eq!(character.activate_shield(&mut bus), Ok(true));
        character.tick(1.0);
        assert!(character.pump(&mut bus) >= 2);

        let state = character
            .ability_system()
            .ability_state(character.shield_spec());
        assert_eq!(state, Some(AbilityState::Inactive));
        assert_eq!(character.mana(), 0.0);
    }
}
