// Arena: owns the characters and their bodies and steps the simulation
//
// The whole simulation step for all characters is serialized here; attack
// resolution between two characters is a synchronous read-then-write on the
// target, so no locking exists anywhere in the core.

use glam::Vec3;

use crate::engine::movement::KinematicBody;
use crate::engine::world::StaticWorld;
use crate::engine::ActorId;

use super::characters::{Character, CharacterConfig, CharacterEvent, CharacterId};
use super::combat::AttackOutcome;

struct CharacterSlot {
    character: Character,
    body: KinematicBody,
}

/// A headless play space: static geometry plus the characters moving in it
pub struct Arena {
    world: StaticWorld,
    slots: Vec<CharacterSlot>,
    next_id: CharacterId,
}

impl Arena {
    pub fn new(world: StaticWorld) -> Self {
        Self {
            world,
            slots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn world(&self) -> &StaticWorld {
        &self.world
    }

    /// Spawn a possessed character at a position. The caller picks the actor
    /// id so it cannot collide with level geometry actors.
    pub fn spawn_character(
        &mut self,
        actor: ActorId,
        config: CharacterConfig,
        spawn: Vec3,
        capsule_radius: f32,
    ) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;

        let mut body = KinematicBody::new(spawn, capsule_radius);
        let mut character = Character::new(id, actor, config);
        character.possess(&mut body);

        self.slots.push(CharacterSlot { character, body });
        id
    }

    fn slot_index(&self, id: CharacterId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.character.id() == id)
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.slots
            .iter()
            .find(|slot| slot.character.id() == id)
            .map(|slot| &slot.character)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.slots
            .iter_mut()
            .find(|slot| slot.character.id() == id)
            .map(|slot| &mut slot.character)
    }

    pub fn body(&self, id: CharacterId) -> Option<&KinematicBody> {
        self.slots
            .iter()
            .find(|slot| slot.character.id() == id)
            .map(|slot| &slot.body)
    }

    pub fn body_mut(&mut self, id: CharacterId) -> Option<&mut KinematicBody> {
        self.slots
            .iter_mut()
            .find(|slot| slot.character.id() == id)
            .map(|slot| &mut slot.body)
    }

    /// Run an input-surface or state call against one character and its body
    pub fn with_character<R>(
        &mut self,
        id: CharacterId,
        f: impl FnOnce(&mut Character, &mut KinematicBody) -> R,
    ) -> Option<R> {
        let index = self.slot_index(id)?;
        let slot = &mut self.slots[index];
        Some(f(&mut slot.character, &mut slot.body))
    }

    /// Advance every character by one fixed timestep
    pub fn update(&mut self, dt: f32) {
        for slot in &mut self.slots {
            slot.character.tick(dt, &mut slot.body, &self.world);
            slot.body.step(dt);
        }
    }

    /// Resolve an attack from one character against another
    pub fn resolve_attack(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
    ) -> Option<AttackOutcome> {
        let attacker_index = self.slot_index(attacker)?;
        let source = self.slots[attacker_index].character.attributes().clone();
        let source_tags = self.slots[attacker_index].character.abilities().active_tags();

        let target_index = self.slot_index(target)?;
        Some(
            self.slots[target_index]
                .character
                .receive_attack(&source, source_tags),
        )
    }

    /// Take the pending events of one character
    pub fn drain_events(&mut self, id: CharacterId) -> Vec<CharacterEvent> {
        self.character_mut(id)
            .map(|character| character.drain_events())
            .unwrap_or_default()
    }

    pub fn character_count(&self) -> usize {
        self.slots.len()
    }

    pub fn alive_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !slot.character.is_dead())
            .count()
    }
}
