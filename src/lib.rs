// emberfall: character controller and combat core for a 2D/3D/spline-hybrid
// platformer
//
// The crate is split the same way the game is: `core` for shared math,
// `engine` for the seams to the host engine (movement, world queries,
// splines, input, timing), and `game` for the simulation itself
// (attributes, abilities, damage, characters, arena).

pub mod core;
pub mod engine;
pub mod game;
