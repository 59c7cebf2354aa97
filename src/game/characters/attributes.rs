// Character attributes: clamped numeric stats and the damage scratch channel
//
// Every write goes through a single clamp gate keyed by attribute identity.
// Clamping never fails; attributes without a rule pass through unmodified.

use log::debug;

use crate::core::math::clamp;

/// The eight emotional damage channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Fear,
    Anger,
    Joy,
    Sadness,
    Trust,
    Loathing,
    Anticipation,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Trust,
        Emotion::Loathing,
        Emotion::Anticipation,
        Emotion::Surprise,
    ];

    fn index(self) -> usize {
        match self {
            Emotion::Fear => 0,
            Emotion::Anger => 1,
            Emotion::Joy => 2,
            Emotion::Sadness => 3,
            Emotion::Trust => 4,
            Emotion::Loathing => 5,
            Emotion::Anticipation => 6,
            Emotion::Surprise => 7,
        }
    }
}

/// Identity of a character attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    Health,
    MaxHealth,
    RawDamage,
    Armor,
    MinEmotionalDamageMultiplier,
    MinEmotionalResistance,
    MaxEmotionalResistance,
    DamageMultiplier(Emotion),
    Resistance(Emotion),
    /// Transient damage accumulator; consumed the moment it turns positive
    ReceivedDamage,
}

/// Outcome of the clamp gate. Distinguishes "no rule for this attribute"
/// from "the clamp evaluated to the same value".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClampOutcome {
    NoRule,
    Clamped(f32),
}

/// How a modifier combines with the current attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModOp {
    Add,
    Multiply,
    Override,
}

/// One attribute modification inside an effect
#[derive(Debug, Clone)]
pub struct AttributeModifier {
    pub id: AttributeId,
    pub op: ModOp,
    pub magnitude: f32,
}

/// An instant bundle of attribute modifiers, applied in order
#[derive(Debug, Clone, Default)]
pub struct Effect {
    pub modifiers: Vec<AttributeModifier>,
}

impl Effect {
    pub fn new(modifiers: Vec<AttributeModifier>) -> Self {
        Self { modifiers }
    }

    /// Single-modifier effect
    pub fn single(id: AttributeId, op: ModOp, magnitude: f32) -> Self {
        Self {
            modifiers: vec![AttributeModifier { id, op, magnitude }],
        }
    }
}

/// A committed attribute mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeChange {
    pub id: AttributeId,
    pub old: f32,
    pub new: f32,
}

/// Numeric combat stats for one character
#[derive(Debug, Clone)]
pub struct CharacterAttributeSet {
    health: f32,
    max_health: f32,
    raw_damage: f32,
    armor: f32,
    min_emotional_damage_multiplier: f32,
    min_emotional_resistance: f32,
    max_emotional_resistance: f32,
    damage_multipliers: [f32; 8],
    resistances: [f32; 8],
    received_damage: f32,
}

impl Default for CharacterAttributeSet {
    fn default() -> Self {
        Self {
            health: 1.0,
            max_health: 1.0,
            raw_damage: 1.0,
            armor: 1.0,
            min_emotional_damage_multiplier: 0.0,
            min_emotional_resistance: 0.0,
            max_emotional_resistance: 1.0,
            damage_multipliers: [0.0; 8],
            resistances: [1.0; 8],
            received_damage: 0.0,
        }
    }
}

impl CharacterAttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of an attribute
    pub fn value(&self, id: AttributeId) -> f32 {
        match id {
            AttributeId::Health => self.health,
            AttributeId::MaxHealth => self.max_health,
            AttributeId::RawDamage => self.raw_damage,
            AttributeId::Armor => self.armor,
            AttributeId::MinEmotionalDamageMultiplier => self.min_emotional_damage_multiplier,
            AttributeId::MinEmotionalResistance => self.min_emotional_resistance,
            AttributeId::MaxEmotionalResistance => self.max_emotional_resistance,
            AttributeId::DamageMultiplier(emotion) => self.damage_multipliers[emotion.index()],
            AttributeId::Resistance(emotion) => self.resistances[emotion.index()],
            AttributeId::ReceivedDamage => self.received_damage,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn raw_damage(&self) -> f32 {
        self.raw_damage
    }

    pub fn armor(&self) -> f32 {
        self.armor
    }

    pub fn damage_multiplier(&self, emotion: Emotion) -> f32 {
        self.damage_multipliers[emotion.index()]
    }

    pub fn resistance(&self, emotion: Emotion) -> f32 {
        self.resistances[emotion.index()]
    }

    /// Evaluate the clamp rule for an attribute without committing anything.
    /// Bounds (`Min`/`MaxEmotionalResistance`, `MinEmotionalDamageMultiplier`)
    /// clamp against fixed limits; the per-channel attributes clamp against
    /// whatever those bounds currently hold.
    pub fn clamp_attribute_value(&self, id: AttributeId, value: f32) -> ClampOutcome {
        match id {
            AttributeId::Health => ClampOutcome::Clamped(clamp(value, 0.0, self.max_health)),
            AttributeId::MaxHealth => ClampOutcome::Clamped(value.max(1.0)),
            AttributeId::RawDamage | AttributeId::Armor => ClampOutcome::Clamped(value.max(0.0)),
            AttributeId::MinEmotionalResistance | AttributeId::MaxEmotionalResistance => {
                ClampOutcome::Clamped(clamp(value, 0.0, 1.0))
            }
            AttributeId::Resistance(_) => ClampOutcome::Clamped(clamp(
                value,
                self.min_emotional_resistance,
                self.max_emotional_resistance,
            )),
            AttributeId::MinEmotionalDamageMultiplier => ClampOutcome::Clamped(value.max(0.0)),
            AttributeId::DamageMultiplier(_) => {
                ClampOutcome::Clamped(value.max(self.min_emotional_damage_multiplier))
            }
            AttributeId::ReceivedDamage => ClampOutcome::NoRule,
        }
    }

    /// Write an attribute through the clamp gate. Returns the committed
    /// changes: the write itself, plus the health mutation when the write
    /// drove the received-damage scratch positive (consumed in the same
    /// call, before any other read of health).
    pub fn set(&mut self, id: AttributeId, proposed: f32) -> Vec<AttributeChange> {
        let committed = match self.clamp_attribute_value(id, proposed) {
            ClampOutcome::Clamped(value) => value,
            ClampOutcome::NoRule => {
                debug!("no clamp rule for {:?}, passing {} through", id, proposed);
                proposed
            }
        };

        let old = self.value(id);
        self.store(id, committed);
        let mut changes = vec![AttributeChange {
            id,
            old,
            new: committed,
        }];

        if id == AttributeId::ReceivedDamage {
            changes.extend(self.consume_received_damage());
        }
        changes
    }

    /// Apply an instant effect, modifier by modifier, through the gate
    pub fn apply_effect(&mut self, effect: &Effect) -> Vec<AttributeChange> {
        let mut changes = Vec::new();
        for modifier in &effect.modifiers {
            let current = self.value(modifier.id);
            let proposed = match modifier.op {
                ModOp::Add => current + modifier.magnitude,
                ModOp::Multiply => current * modifier.magnitude,
                ModOp::Override => modifier.magnitude,
            };
            changes.extend(self.set(modifier.id, proposed));
        }
        changes
    }

    fn store(&mut self, id: AttributeId, value: f32) {
        match id {
            AttributeId::Health => self.health = value,
            AttributeId::MaxHealth => self.max_health = value,
            AttributeId::RawDamage => self.raw_damage = value,
            AttributeId::Armor => self.armor = value,
            AttributeId::MinEmotionalDamageMultiplier => {
                self.min_emotional_damage_multiplier = value
            }
            AttributeId::MinEmotionalResistance => self.min_emotional_resistance = value,
            AttributeId::MaxEmotionalResistance => self.max_emotional_resistance = value,
            AttributeId::DamageMultiplier(emotion) => {
                self.damage_multipliers[emotion.index()] = value
            }
            AttributeId::Resistance(emotion) => self.resistances[emotion.index()] = value,
            AttributeId::ReceivedDamage => self.received_damage = value,
        }
    }

    /// Consume the received-damage scratch: reset it, then commit the
    /// health loss through the health clamp. Runs inside the same mutation
    /// that turned the scratch positive, so no stale health is ever read.
    fn consume_received_damage(&mut self) -> Option<AttributeChange> {
        let amount = self.received_damage;
        self.received_damage = 0.0;
        if amount <= 0.0 {
            return None;
        }

        let old = self.health;
        let new = match self.clamp_attribute_value(AttributeId::Health, old - amount) {
            ClampOutcome::Clamped(value) => value,
            ClampOutcome::NoRule => old - amount,
        };
        self.health = new;
        Some(AttributeChange {
            id: AttributeId::Health,
            old,
            new,
        })
    }

    /// Bypass the clamp gate; only for constructing out-of-domain states
    /// in tests (e.g. resistances above 1)
    #[cfg(test)]
    pub(crate) fn set_resistance_unchecked(&mut self, emotion: Emotion, value: f32) {
        self.resistances[emotion.index()] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set_with_health(max_health: f32, health: f32) -> CharacterAttributeSet {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::MaxHealth, max_health);
        attributes.set(AttributeId::Health, health);
        attributes
    }

    #[test]
    fn test_health_clamps_to_max_health() {
        let mut attributes = set_with_health(10.0, 10.0);
        attributes.set(AttributeId::Health, 25.0);
        assert_relative_eq!(attributes.health(), 10.0);

        attributes.set(AttributeId::Health, -5.0);
        assert_relative_eq!(attributes.health(), 0.0);
    }

    #[test]
    fn test_max_health_floor_is_one() {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::MaxHealth, -10.0);
        assert_relative_eq!(attributes.max_health(), 1.0);
    }

    #[test]
    fn test_raw_damage_and_armor_floor_at_zero() {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::RawDamage, -3.0);
        attributes.set(AttributeId::Armor, -7.0);
        assert_relative_eq!(attributes.raw_damage(), 0.0);
        assert_relative_eq!(attributes.armor(), 0.0);
    }

    #[test]
    fn test_resistance_clamps_to_configured_bounds() {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::MinEmotionalResistance, 0.2);
        attributes.set(AttributeId::MaxEmotionalResistance, 0.8);

        attributes.set(AttributeId::Resistance(Emotion::Fear), 1.5);
        assert_relative_eq!(attributes.resistance(Emotion::Fear), 0.8);

        attributes.set(AttributeId::Resistance(Emotion::Fear), 0.0);
        assert_relative_eq!(attributes.resistance(Emotion::Fear), 0.2);
    }

    #[test]
    fn test_resistance_bounds_clamp_to_unit_interval() {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::MinEmotionalResistance, -1.0);
        attributes.set(AttributeId::MaxEmotionalResistance, 2.0);
        assert_relative_eq!(attributes.value(AttributeId::MinEmotionalResistance), 0.0);
        assert_relative_eq!(attributes.value(AttributeId::MaxEmotionalResistance), 1.0);
    }

    #[test]
    fn test_damage_multiplier_floors_at_min_multiplier() {
        let mut attributes = CharacterAttributeSet::new();
        attributes.set(AttributeId::MinEmotionalDamageMultiplier, 0.5);
        attributes.set(AttributeId::DamageMultiplier(Emotion::Joy), 0.1);
        assert_relative_eq!(attributes.damage_multiplier(Emotion::Joy), 0.5);

        attributes.set(AttributeId::DamageMultiplier(Emotion::Joy), 2.0);
        assert_relative_eq!(attributes.damage_multiplier(Emotion::Joy), 2.0);
    }

    #[test]
    fn test_clamp_is_a_projection() {
        let attributes = set_with_health(10.0, 7.0);
        let once = match attributes.clamp_attribute_value(AttributeId::Health, 25.0) {
            ClampOutcome::Clamped(value) => value,
            ClampOutcome::NoRule => panic!("health has a clamp rule"),
        };
        let twice = match attributes.clamp_attribute_value(AttributeId::Health, once) {
            ClampOutcome::Clamped(value) => value,
            ClampOutcome::NoRule => panic!("health has a clamp rule"),
        };
        assert_relative_eq!(once, twice);
    }

    #[test]
    fn test_received_damage_has_no_rule() {
        let attributes = CharacterAttributeSet::new();
        assert_eq!(
            attributes.clamp_attribute_value(AttributeId::ReceivedDamage, 42.0),
            ClampOutcome::NoRule
        );
    }

    #[test]
    fn test_received_damage_consumed_in_same_call() {
        let mut attributes = set_with_health(10.0, 10.0);
        let changes = attributes.set(AttributeId::ReceivedDamage, 5.0);

        assert_relative_eq!(attributes.health(), 5.0);
        assert_relative_eq!(attributes.value(AttributeId::ReceivedDamage), 0.0);

        // the write and the health mutation are reported together
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].id, AttributeId::Health);
        assert_relative_eq!(changes[1].old, 10.0);
        assert_relative_eq!(changes[1].new, 5.0);
    }

    #[test]
    fn test_received_damage_overkill_clamps_health_to_zero() {
        let mut attributes = set_with_health(10.0, 3.0);
        attributes.set(AttributeId::ReceivedDamage, 100.0);
        assert_relative_eq!(attributes.health(), 0.0);
    }

    #[test]
    fn test_nonpositive_received_damage_is_discarded() {
        let mut attributes = set_with_health(10.0, 10.0);
        let changes = attributes.set(AttributeId::ReceivedDamage, -4.0);
        assert_relative_eq!(attributes.health(), 10.0);
        assert_relative_eq!(attributes.value(AttributeId::ReceivedDamage), 0.0);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_effect_modifiers_apply_in_order() {
        let mut attributes = CharacterAttributeSet::new();
        let init = Effect::new(vec![
            AttributeModifier {
                id: AttributeId::MaxHealth,
                op: ModOp::Override,
                magnitude: 100.0,
            },
            AttributeModifier {
                id: AttributeId::Health,
                op: ModOp::Override,
                magnitude: 100.0,
            },
        ]);
        attributes.apply_effect(&init);
        assert_relative_eq!(attributes.health(), 100.0);

        let halve = Effect::single(AttributeId::Health, ModOp::Multiply, 0.5);
        attributes.apply_effect(&halve);
        assert_relative_eq!(attributes.health(), 50.0);
    }
}
