// Game layer: abilities, characters, combat, and the arena that steps them

pub mod abilities;
pub mod arena;
pub mod characters;
pub mod combat;
