//! Mana trigger volume: drains characters standing inside it.

use tracing::{debug, trace};

use crate::character::ActorRegistry;
use crate::effect::{EffectContext, EffectHandle};
use crate::error::{ErrorCategory, GameError};
use crate::state::{Aabb, EntityId, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("trigger {volume}: effect owner {owner} no longer resolves to a character")]
    HandleOwnerMissing { volume: EntityId, owner: EntityId },
}

impl GameError for TriggerError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::ContractViolation
    }

    fn actor(&self) -> Option<EntityId> {
        match self {
            Self::HandleOwnerMissing { owner, .. } => Some(*owner),
        }
    }

    fn error_code(&self) -> &'static str {
        "TRIGGER_HANDLE_OWNER_MISSING"
    }
}

/// Box volume that applies the entering character's mana-decrease template
/// and, on exit, its cooldown template.
///
/// Only one drain is tracked at a time. A second character entering before
/// the first leaves replaces the tracked handle; the first drain stays on
/// its owner until removed some other way.
#[derive(Clone, Debug)]
pub struct TriggerVolume {
    id: EntityId,
    bounds: Aabb,
    effect_handle: EffectHandle,
}

impl TriggerVolume {
    pub fn new(id: EntityId, center: Vec3, half_extent: f32) -> Self {
        Self {
            id,
            bounds: Aabb::cube(center, half_extent),
            effect_handle: EffectHandle::INVALID,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.bounds.contains(point)
    }

    pub fn effect_handle(&self) -> EffectHandle {
        self.effect_handle
    }

    pub fn begin_overlap<R>(&mut self, registry: &mut R, other: EntityId)
    where
        R: ActorRegistry + ?Sized,
    {
        let Some(character) = registry.character_mut(other) else {
            trace!(volume = %self.id, actor = %other, "ignoring non-character overlap");
            return;
        };

        let Some(hero) = character.hero() else {
            trace!(volume = %self.id, actor = %other, "ignoring character without a hero config");
            return;
        };
        let template = hero.mana_decrease().cloned();
        if template.is_none() {
            dev_warn!(volume = %self.id, actor = %other, "mana decrease template is not configured");
        }
        if self.effect_handle.is_valid() {
            dev_warn!(
                volume = %self.id,
                previous = ?self.effect_handle,
                "volume re-entered before exit; previous drain stays applied"
            );
        }

        let context = EffectContext::from_self(other).with_causer(self.id);
        self.effect_handle = character
            .ability_system_mut()
            .host_mut()
            .apply_effect_to_self(template.as_ref(), context);
        debug!(volume = %self.id, actor = %other, handle = ?self.effect_handle, "drain started");
    }

    /// Removes the tracked drain from its owner and applies the exiting
    /// character's cooldown template to that owner.
    pub fn end_overlap<R>(&mut self, registry: &mut R, other: EntityId) -> Result<(), TriggerError>
    where
        R: ActorRegistry + ?Sized,
    {
        let Some(exiting) = registry.character(other) else {
            trace!(volume = %self.id, actor = %other, "ignoring non-character overlap end");
            return Ok(());
        };
        let Some(owner) = self.effect_handle.owner() else {
            trace!(volume = %self.id, actor = %other, "no drain to remove");
            return Ok(());
        };

        let cooldown = exiting.hero().and_then(|hero| hero.mana_cooldown()).cloned();
        if cooldown.is_none() {
            dev_warn!(volume = %self.id, actor = %other, "mana cooldown template is not configured");
        }

        let Some(target) = registry.character_mut(owner) else {
            self.effect_handle.invalidate();
            return Err(TriggerError::HandleOwnerMissing {
                volume: self.id,
                owner,
            });
        };

        let host = target.ability_system_mut().host_mut();
        host.remove_effect(self.effect_handle, 1);
        let context = EffectContext::from_self(owner).with_causer(self.id);
        host.apply_effect_to_self(cooldown.as_ref(), context);
        self.effect_handle.invalidate();
        debug!(volume = %self.id, actor = %other, %owner, "drain ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ManaAttribute;
    use crate::character::{Character, CharacterMap};
    use crate::config::AbilityConfig;
    use crate::effect::{EffectTemplate, ModOp};
    use crate::hero::HeroConfig;
    use crate::tags::GameplayTag;

    fn hero() -> HeroConfig {
        HeroConfig::new()
            .with_mana_decrease(
                EffectTemplate::infinite("zone_drain")
                    .with_period(1.0)
                    .with_modifier(ManaAttribute::ManaDecrease, ModOp::Add, 10.0),
            )
            .with_mana_cooldown(
                EffectTemplate::timed("zone_cooldown", 2.0)
                    .granting(GameplayTag::CooldownManaShield),
            )
    }

    fn world(ids: &[u32]) -> CharacterMap {
        ids.iter()
            .map(|&id| {
                let mut character =
                    Character::new(EntityId(id), Some(hero()), &AbilityConfig::new());
                character.initialize().unwrap();
                (EntityId(id), character)
            })
            .collect()
    }

    fn volume() -> TriggerVolume {
        TriggerVolume::new(EntityId(100), Vec3::ZERO, 100.0)
    }

    #[test]
    fn enter_drains_and_exit_applies_cooldown() {
        let mut characters = world(&[1]);
        let mut volume = volume();

        volume.begin_overlap(&mut characters, EntityId(1));
        assert!(volume.effect_handle().is_valid());
        assert_eq!(characters[&EntityId(1)].mana(), 90.0);

        volume.end_overlap(&mut characters, EntityId(1)).unwrap();

        let host = characters[&EntityId(1)].ability_system().host();
        assert!(!volume.effect_handle().is_valid());
        assert!(host.has_tag(GameplayTag::CooldownManaShield));
        assert_eq!(host.effects().len(), 1);
    }

    #[test]
    fn unknown_actor_is_ignored() {
        let mut characters = world(&[1]);
        let mut volume = volume();

        volume.begin_overlap(&mut characters, EntityId(5));
        assert!(!volume.effect_handle().is_valid());
        assert_eq!(volume.end_overlap(&mut characters, EntityId(5)), Ok(()));
    }

    #[test]
    fn exit_without_drain_does_nothing() {
        let mut characters = world(&[1]);
        let mut volume = volume();

        volume.end_overlap(&mut characters, EntityId(1)).unwrap();

        let host = characters[&EntityId(1)].ability_system().host();
        assert!(host.effects().is_empty());
    }

    #[test]
    fn character_without_hero_keeps_the_tracked_drain() {
        let mut characters = world(&[1]);
        let mut plain = Character::new(EntityId(2), None, &AbilityConfig::new());
        plain.initialize().unwrap();
        characters.insert(EntityId(2), plain);
        let mut volume = volume();

        volume.begin_overlap(&mut characters, EntityId(1));
        let tracked = volume.effect_handle();
        volume.begin_overlap(&mut characters, EntityId(2));

        let plain = characters[&EntityId(2)].ability_system().host();
        assert_eq!(volume.effect_handle(), tracked);
        assert!(plain.effects().is_empty());

        volume.end_overlap(&mut characters, EntityId(1)).unwrap();
        let host = characters[&EntityId(1)].ability_system().host();
        assert!(host.has_tag(GameplayTag::CooldownManaShield));
        assert_eq!(host.effects().len(), 1);
    }

    #[test]
    fn hero_without_decrease_template_clears_the_tracked_drain() {
        let mut characters = world(&[1]);
        let bare_hero = HeroConfig::new();
        let mut bare = Character::new(EntityId(2), Some(bare_hero), &AbilityConfig::new());
        bare.initialize().unwrap();
        characters.insert(EntityId(2), bare);
        let mut volume = volume();

        volume.begin_overlap(&mut characters, EntityId(1));
        volume.begin_overlap(&mut characters, EntityId(2));

        assert!(!volume.effect_handle().is_valid());
        assert_eq!(characters[&EntityId(2)].mana(), 100.0);
        // Nothing is tracked, so the first drain keeps running.
        let first = characters[&EntityId(1)].ability_system().host();
        assert_eq!(first.effects().len(), 1);
    }

    #[test]
    fn reentry_replaces_the_tracked_drain() {
        let mut characters = world(&[1, 2]);
        let mut volume = volume();

        volume.begin_overlap(&mut characters, EntityId(1));
        volume.begin_overlap(&mut characters, EntityId(2));
        assert_eq!(volume.effect_handle().owner(), Some(EntityId(2)));

        volume.end_overlap(&mut characters, EntityId(1)).unwrap();

        // The first drain is orphaned; the second one was removed.
        let first = characters[&EntityId(1)].ability_system().host();
        let second = characters[&EntityId(2)].ability_system().host();
        assert_eq!(first.effects().len(), 1);
        assert!(!first.has_tag(GameplayTag::CooldownManaShield));
        assert!(second.has_tag(GameplayTag::CooldownManaShield));
    }

    #[test]
    fn missing_owner_invalidates_and_reports() {
        let mut characters = world(&[1, 2]);
        let mut volume = volume();
        volume.begin_overlap(&mut characters, EntityId(1));
        characters.remove(&EntityId(1));

        let err = volume.end_overlap(&mut characters, EntityId(2)).unwrap_err();

        assert_eq!(
            err,
            TriggerError::HandleOwnerMissing {
                volume: EntityId(100),
                owner: EntityId(1),
            }
        );
        assert!(!err.category().is_absorbed());
        assert!(!volume.effect_handle().is_valid());
    }
}
