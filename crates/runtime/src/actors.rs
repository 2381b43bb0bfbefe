//! Actor table of the world: characters and plain props with positions.

use std::collections::BTreeMap;

use ability_core::{ActorRegistry, Character, EntityId, Vec3};

#[derive(Debug)]
pub enum ActorKind {
    Character(Box<Character>),
    /// Anything without an ability system; trigger volumes ignore it.
    Prop,
}

#[derive(Debug)]
pub struct ActorEntry {
    pub position: Vec3,
    pub kind: ActorKind,
}

#[derive(Debug, Default)]
pub struct Actors {
    entries: BTreeMap<EntityId, ActorEntry>,
}

impl Actors {
    pub fn insert(&mut self, id: EntityId, entry: ActorEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<ActorEntry> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&ActorEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ActorEntry> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Actor ids with their positions, in id order.
    pub fn positions(&self) -> impl Iterator<Item = (EntityId, Vec3)> + '_ {
        self.entries.iter().map(|(id, entry)| (*id, entry.position))
    }

    pub fn characters_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.entries
            .values_mut()
            .filter_map(|entry| match &mut entry.kind {
                ActorKind::Character(character) => Some(character.as_mut()),
                ActorKind::Prop => None,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ActorRegistry for Actors {
    fn character(&self, id: EntityId) -> Option<&Character> {
        match &self.entries.get(&id)?.kind {
            ActorKind::Character(character) => Some(character.as_ref()),
            ActorKind::Prop => None,
        }
    }

    fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        match &mut self.entries.get_mut(&id)?.kind {
            ActorKind::Character(character) => Some(character.as_mut()),
            ActorKind::Prop => None,
        }
    }
}
