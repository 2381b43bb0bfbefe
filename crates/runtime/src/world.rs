//! World orchestrator.
//!
//! The world owns the actors, the trigger volumes and the message bus, and
//! exposes a builder-based API for hosts to drive the simulation one frame
//! at a time.

use std::collections::BTreeSet;

use ability_core::{
    AbilityConfig, ActorRegistry, Character, EffectContext, EffectHandle, EffectTemplate, EntityId,
    GameError, HeroCatalog, HeroConfig, MessageBus, TriggerVolume, Vec3,
};
use tracing::{debug, error, info};

use crate::actors::{ActorEntry, ActorKind, Actors};
use crate::error::{Result, WorldError};

/// World configuration shared by every actor and volume.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub ability: AbilityConfig,
}

#[derive(Debug)]
struct VolumeSlot {
    volume: TriggerVolume,
    overlapping: BTreeSet<EntityId>,
}

/// Single-threaded world hosting characters, props and trigger volumes.
///
/// Every mutating call finishes by delivering the queued attribute
/// notifications of the affected characters, so listeners observe a
/// settled state when the call returns.
#[derive(Debug)]
pub struct World {
    config: RuntimeConfig,
    heroes: HeroCatalog,
    actors: Actors,
    volumes: Vec<VolumeSlot>,
    bus: MessageBus,
    next_id: u32,
}

impl World {
    /// Create a new world builder
    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn heroes(&self) -> &HeroCatalog {
        &self.heroes
    }

    pub fn bus_mut(&mut self) -> &mut MessageBus {
        &mut self.bus
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    // ========================================================================
    // Actors
    // ========================================================================

    /// Spawns a character with an initialized mana component.
    pub fn spawn_character(&mut self, hero: Option<HeroConfig>, position: Vec3) -> Result<EntityId> {
        let id = self.allocate_id();
        let mut character = Character::new(id, hero, &self.config.ability);
        character.initialize()?;
        character.pump(&mut self.bus);

        self.actors.insert(
            id,
            ActorEntry {
                position,
                kind: ActorKind::Character(Box::new(character)),
            },
        );
        info!(%id, ?position, "spawned character");
        Ok(id)
    }

    /// Spawns a character using the catalog entry named `hero`.
    pub fn spawn_hero(&mut self, hero: &str, position: Vec3) -> Result<EntityId> {
        let config = self
            .heroes
            .get(hero)
            .cloned()
            .ok_or_else(|| WorldError::UnknownHero(hero.to_owned()))?;
        self.spawn_character(Some(config), position)
    }

    /// Spawns an actor without an ability system.
    pub fn spawn_prop(&mut self, position: Vec3) -> EntityId {
        let id = self.allocate_id();
        self.actors.insert(
            id,
            ActorEntry {
                position,
                kind: ActorKind::Prop,
            },
        );
        debug!(%id, ?position, "spawned prop");
        id
    }

    /// Removes an actor. Volumes it was inside see it leave first, then its
    /// mana component is unbound.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        if !self.actors.contains(id) {
            return Err(WorldError::UnknownActor(id));
        }

        let mut outcome = Ok(());
        for slot in &mut self.volumes {
            if slot.overlapping.remove(&id)
                && let Err(err) = slot.volume.end_overlap(&mut self.actors, id)
            {
                error!(category = %err.category(), "{err}");
                outcome = outcome.and(Err(err.into()));
            }
        }

        if let Some(character) = self.actors.character_mut(id) {
            character.uninitialize();
        }
        self.actors.remove(id);
        self.pump_all();
        info!(%id, "despawned actor");
        outcome
    }

    pub fn move_actor(&mut self, id: EntityId, position: Vec3) -> Result<()> {
        let entry = self
            .actors
            .get_mut(id)
            .ok_or(WorldError::UnknownActor(id))?;
        entry.position = position;
        Ok(())
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.actors.get(id).map(|entry| entry.position)
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.actors.character(id)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.actors.character_mut(id)
    }

    // ========================================================================
    // Volumes
    // ========================================================================

    /// Places a trigger volume sized by the world configuration.
    pub fn place_volume(&mut self, center: Vec3) -> EntityId {
        let id = self.allocate_id();
        let half_extent = self.config.ability.trigger_half_extent;
        self.volumes.push(VolumeSlot {
            volume: TriggerVolume::new(id, center, half_extent),
            overlapping: BTreeSet::new(),
        });
        debug!(%id, ?center, half_extent, "placed trigger volume");
        id
    }

    pub fn volume(&self, id: EntityId) -> Option<&TriggerVolume> {
        self.volumes
            .iter()
            .map(|slot| &slot.volume)
            .find(|volume| volume.id() == id)
    }

    /// Actors currently inside the volume, in id order.
    pub fn overlapping(&self, id: EntityId) -> Vec<EntityId> {
        self.volumes
            .iter()
            .find(|slot| slot.volume.id() == id)
            .map(|slot| slot.overlapping.iter().copied().collect())
            .unwrap_or_default()
    }

    fn update_overlaps(&mut self) -> Result<()> {
        let mut outcome = Ok(());

        for slot in &mut self.volumes {
            let inside: BTreeSet<EntityId> = self
                .actors
                .positions()
                .filter(|(_, position)| slot.volume.contains(*position))
                .map(|(id, _)| id)
                .collect();
            let exits: Vec<_> = slot.overlapping.difference(&inside).copied().collect();
            let enters: Vec<_> = inside.difference(&slot.overlapping).copied().collect();

            for id in exits {
                if let Err(err) = slot.volume.end_overlap(&mut self.actors, id) {
                    error!(category = %err.category(), "{err}");
                    outcome = outcome.and(Err(err.into()));
                }
            }
            for id in enters {
                slot.volume.begin_overlap(&mut self.actors, id);
            }
            slot.overlapping = inside;
        }

        outcome
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advances the world by `dt` seconds.
    ///
    /// Effects tick first, then overlaps are re-evaluated (exits before
    /// entries), then queued notifications are delivered. A contract
    /// violation from a volume is returned after the frame completes.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        for character in self.actors.characters_mut() {
            character.tick(dt);
        }
        let outcome = self.update_overlaps();
        self.pump_all();
        outcome
    }

    fn pump_all(&mut self) -> usize {
        let bus = &mut self.bus;
        self.actors
            .characters_mut()
            .map(|character| character.pump(bus))
            .sum()
    }

    // ========================================================================
    // Character operations
    // ========================================================================

    pub fn activate_shield(&mut self, id: EntityId) -> Result<bool> {
        let character = require_character(&mut self.actors, id)?;
        let activated = character.activate_shield(&mut self.bus)?;
        character.pump(&mut self.bus);
        Ok(activated)
    }

    pub fn press_shield_input(&mut self, id: EntityId) -> Result<()> {
        let character = require_character(&mut self.actors, id)?;
        character.press_shield_input(&mut self.bus)?;
        character.pump(&mut self.bus);
        Ok(())
    }

    /// Applies `template` to the character as a world-driven change (no
    /// instigator).
    pub fn apply_effect(&mut self, id: EntityId, template: &EffectTemplate) -> Result<EffectHandle> {
        let character = require_character(&mut self.actors, id)?;
        let handle = character
            .ability_system_mut()
            .host_mut()
            .apply_effect_to_self(Some(template), EffectContext::default());
        character.pump(&mut self.bus);
        Ok(handle)
    }

    /// Removes an effect from whichever character owns the handle.
    pub fn remove_effect(&mut self, handle: EffectHandle, stacks: u32) -> Result<bool> {
        let Some(owner) = handle.owner() else {
            return Ok(false);
        };
        let character = require_character(&mut self.actors, owner)?;
        let removed = character
            .ability_system_mut()
            .host_mut()
            .remove_effect(handle, stacks);
        character.pump(&mut self.bus);
        Ok(removed)
    }
}

fn require_character(actors: &mut Actors, id: EntityId) -> Result<&mut Character> {
    if !actors.contains(id) {
        return Err(WorldError::UnknownActor(id));
    }
    actors
        .character_mut(id)
        .ok_or(WorldError::NotACharacter(id))
}

/// Builder for [`World`].
pub struct WorldBuilder {
    config: RuntimeConfig,
    heroes: HeroCatalog,
    volumes: Vec<Vec3>,
}

impl WorldBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            heroes: HeroCatalog::default(),
            volumes: Vec::new(),
        }
    }

    /// Override world configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ability_config(mut self, ability: AbilityConfig) -> Self {
        self.config.ability = ability;
        self
    }

    pub fn heroes(mut self, heroes: HeroCatalog) -> Self {
        self.heroes = heroes;
        self
    }

    /// Places a trigger volume at `center` when the world is built.
    pub fn volume(mut self, center: Vec3) -> Self {
        self.volumes.push(center);
        self
    }

    pub fn build(self) -> World {
        let mut world = World {
            config: self.config,
            heroes: self.heroes,
            actors: Actors::default(),
            volumes: Vec::new(),
            bus: MessageBus::new(),
            next_id: 0,
        };
        for center in self.volumes {
            world.place_volume(center);
        }
        info!(
            heroes = world.heroes.len(),
            volumes = world.volumes.len(),
            "world built"
        );
        world
    }
}
