// Combat: damage resolution between attribute sets

pub mod damage;

pub use damage::{
    apply_attack, emotional_channel_damage, physical_damage, resolve_attack, AttackOutcome,
};
