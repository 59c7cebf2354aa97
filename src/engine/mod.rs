// Engine seams: movement provider, world queries, splines, input, timing
//
// The character core talks to the host engine exclusively through the
// traits in these modules. Each trait ships with a small concrete
// implementation so the crate runs headless and the game layer is
// testable without a real engine behind it.

pub mod game_loop;
pub mod input;
pub mod movement;
pub mod spline;
pub mod world;

/// Identifies an actor (wall, platform, character body) in the host world
pub type ActorId = u64;
