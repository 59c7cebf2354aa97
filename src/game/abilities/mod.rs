// Ability system
//
// Abilities are identified by a closed enumeration instead of string tags;
// the runtime keeps an explicit per-ability state table (active, duration,
// cooldown) plus counted loose status tags. Activation can always fail and
// failure is never an error: callers fall through to the next behavior.

pub mod runtime;
pub mod tags;

pub use runtime::{AbilityRuntime, AbilitySpec};
pub use tags::{AbilityId, AbilityTags, StatusTag};
