// Attack damage resolution
//
// Pure math over a source's offensive attributes and a target's defensive
// attributes. The only side effect in this module is the single write to
// the target's received-damage scratch in `apply_attack`, and that write
// only happens when the total comes out positive.

use crate::game::abilities::AbilityTags;
use crate::game::characters::attributes::{
    AttributeChange, AttributeId, CharacterAttributeSet, Emotion,
};

/// A channel whose resistance sits within this distance of 1.0 deals no
/// emotional damage
pub const EMOTIONAL_RESISTANCE_EPSILON: f32 = 1e-5;

/// Result of applying an attack to a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOutcome {
    /// Total damage the formula produced (may be zero or negative)
    pub damage: f32,
    /// True when the damage was written to the target. Conditional on-hit
    /// effects (post-hit immunity and the like) should fire exactly when
    /// this is set.
    pub applied: bool,
}

/// Physical damage from raw damage against armor.
///
/// `(5R^2) / (A + 5R) + 1`. The `+ 1` keeps physical damage strictly
/// positive even for a harmless attacker. At `R = 0` the fraction would be
/// `0 / A`, and `0 / 0` for an unarmored target, so that case returns the
/// floor directly instead of evaluating the division.
pub fn physical_damage(raw_damage: f32, armor: f32) -> f32 {
    if raw_damage <= 0.0 {
        return 1.0;
    }
    (5.0 * raw_damage * raw_damage) / (armor + 5.0 * raw_damage) + 1.0
}

/// Emotional damage for one channel. A resistance of exactly 1 (within
/// epsilon) contributes nothing; a resistance above 1 flips the sign and
/// heals, which the formula deliberately does not guard against.
pub fn emotional_channel_damage(resistance: f32, multiplier: f32, raw_damage: f32) -> f32 {
    let resistance_diff = 1.0 - resistance;
    if resistance_diff.abs() < EMOTIONAL_RESISTANCE_EPSILON {
        0.0
    } else {
        resistance_diff * multiplier * raw_damage
    }
}

/// Total damage a target would receive from a source. The tag snapshots are
/// reserved for conditional multipliers and are not consumed by the base
/// formula.
pub fn resolve_attack(
    source: &CharacterAttributeSet,
    target: &CharacterAttributeSet,
    _source_tags: AbilityTags,
    _target_tags: AbilityTags,
) -> f32 {
    let raw_damage = source.raw_damage();
    let physical = physical_damage(raw_damage, target.armor());

    let emotional: f32 = Emotion::ALL
        .into_iter()
        .map(|emotion| {
            emotional_channel_damage(
                target.resistance(emotion),
                source.damage_multiplier(emotion),
                raw_damage,
            )
        })
        .sum();

    physical + emotional
}

/// Resolve an attack and, when the total is positive, deliver it to the
/// target's received-damage scratch. Returns the outcome together with the
/// attribute changes the delivery committed (empty when nothing applied).
pub fn apply_attack(
    source: &CharacterAttributeSet,
    target: &mut CharacterAttributeSet,
    source_tags: AbilityTags,
    target_tags: AbilityTags,
) -> (AttackOutcome, Vec<AttributeChange>) {
    let damage = resolve_attack(source, target, source_tags, target_tags);
    if damage > 0.0 {
        let changes = target.set(
            AttributeId::ReceivedDamage,
            target.value(AttributeId::ReceivedDamage) + damage,
        );
        (
            AttackOutcome {
                damage,
                applied: true,
            },
            changes,
        )
    } else {
        (
            AttackOutcome {
                damage,
                applied: false,
            },
            Vec::new(),
        )
    }
}
