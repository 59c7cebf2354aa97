// Movement attributes: tunables pushed into the live movement provider

use crate::core::math::clamp;

/// Identity of a movement attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementAttributeId {
    MaxWalkSpeed,
    JumpZVelocity,
    MaxFallSpeed,
    VelocityMultiplierDash,
    VelocityXYMultiplierWallJump,
    VelocityZMultiplierWallJump,
    GravityScaleMultiplierGlide,
    AirControlGlide,
}

/// Movement tunables for one character
#[derive(Debug, Clone)]
pub struct MovementAttributeSet {
    max_walk_speed: f32,
    jump_z_velocity: f32,
    max_fall_speed: f32,
    velocity_multiplier_dash: f32,
    velocity_xy_multiplier_wall_jump: f32,
    velocity_z_multiplier_wall_jump: f32,
    gravity_scale_multiplier_glide: f32,
    air_control_glide: f32,
}

impl Default for MovementAttributeSet {
    fn default() -> Self {
        Self {
            max_walk_speed: 600.0,
            jump_z_velocity: 1000.0,
            max_fall_speed: -1200.0,
            velocity_multiplier_dash: 3.0,
            velocity_xy_multiplier_wall_jump: 1.8,
            velocity_z_multiplier_wall_jump: 1.8,
            gravity_scale_multiplier_glide: 0.1,
            air_control_glide: 0.5,
        }
    }
}

impl MovementAttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, id: MovementAttributeId) -> f32 {
        match id {
            MovementAttributeId::MaxWalkSpeed => self.max_walk_speed,
            MovementAttributeId::JumpZVelocity => self.jump_z_velocity,
            MovementAttributeId::MaxFallSpeed => self.max_fall_speed,
            MovementAttributeId::VelocityMultiplierDash => self.velocity_multiplier_dash,
            MovementAttributeId::VelocityXYMultiplierWallJump => {
                self.velocity_xy_multiplier_wall_jump
            }
            MovementAttributeId::VelocityZMultiplierWallJump => {
                self.velocity_z_multiplier_wall_jump
            }
            MovementAttributeId::GravityScaleMultiplierGlide => {
                self.gravity_scale_multiplier_glide
            }
            MovementAttributeId::AirControlGlide => self.air_control_glide,
        }
    }

    pub fn max_walk_speed(&self) -> f32 {
        self.max_walk_speed
    }

    pub fn jump_z_velocity(&self) -> f32 {
        self.jump_z_velocity
    }

    pub fn max_fall_speed(&self) -> f32 {
        self.max_fall_speed
    }

    pub fn velocity_multiplier_dash(&self) -> f32 {
        self.velocity_multiplier_dash
    }

    pub fn velocity_xy_multiplier_wall_jump(&self) -> f32 {
        self.velocity_xy_multiplier_wall_jump
    }

    pub fn velocity_z_multiplier_wall_jump(&self) -> f32 {
        self.velocity_z_multiplier_wall_jump
    }

    pub fn gravity_scale_multiplier_glide(&self) -> f32 {
        self.gravity_scale_multiplier_glide
    }

    pub fn air_control_glide(&self) -> f32 {
        self.air_control_glide
    }

    /// Clamp rule for a movement attribute: speeds and multipliers floor at
    /// zero, the fall-speed limit stays nonpositive, glide air control lives
    /// on the unit interval.
    pub fn clamp_attribute_value(&self, id: MovementAttributeId, value: f32) -> f32 {
        match id {
            MovementAttributeId::MaxWalkSpeed
            | MovementAttributeId::JumpZVelocity
            | MovementAttributeId::VelocityMultiplierDash
            | MovementAttributeId::VelocityXYMultiplierWallJump
            | MovementAttributeId::VelocityZMultiplierWallJump
            | MovementAttributeId::GravityScaleMultiplierGlide => value.max(0.0),
            MovementAttributeId::MaxFallSpeed => value.min(0.0),
            MovementAttributeId::AirControlGlide => clamp(value, 0.0, 1.0),
        }
    }

    /// Write an attribute through the clamp gate; returns the committed value
    pub fn set(&mut self, id: MovementAttributeId, proposed: f32) -> f32 {
        let committed = self.clamp_attribute_value(id, proposed);
        match id {
            MovementAttributeId::MaxWalkSpeed => self.max_walk_speed = committed,
            MovementAttributeId::JumpZVelocity => self.jump_z_velocity = committed,
            MovementAttributeId::MaxFallSpeed => self.max_fall_speed = committed,
            MovementAttributeId::VelocityMultiplierDash => {
                self.velocity_multiplier_dash = committed
            }
            MovementAttributeId::VelocityXYMultiplierWallJump => {
                self.velocity_xy_multiplier_wall_jump = committed
            }
            MovementAttributeId::VelocityZMultiplierWallJump => {
                self.velocity_z_multiplier_wall_jump = committed
            }
            MovementAttributeId::GravityScaleMultiplierGlide => {
                self.gravity_scale_multiplier_glide = committed
            }
            MovementAttributeId::AirControlGlide => self.air_control_glide = committed,
        }
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let attributes = MovementAttributeSet::new();
        assert_relative_eq!(attributes.max_walk_speed(), 600.0);
        assert_relative_eq!(attributes.jump_z_velocity(), 1000.0);
        assert_relative_eq!(attributes.max_fall_speed(), -1200.0);
    }

    #[test]
    fn test_speeds_floor_at_zero() {
        let mut attributes = MovementAttributeSet::new();
        assert_relative_eq!(attributes.set(MovementAttributeId::MaxWalkSpeed, -100.0), 0.0);
        assert_relative_eq!(attributes.set(MovementAttributeId::JumpZVelocity, -1.0), 0.0);
    }

    #[test]
    fn test_max_fall_speed_stays_nonpositive() {
        let mut attributes = MovementAttributeSet::new();
        assert_relative_eq!(attributes.set(MovementAttributeId::MaxFallSpeed, 500.0), 0.0);
        assert_relative_eq!(
            attributes.set(MovementAttributeId::MaxFallSpeed, -900.0),
            -900.0
        );
    }

    #[test]
    fn test_air_control_clamps_to_unit_interval() {
        let mut attributes = MovementAttributeSet::new();
        assert_relative_eq!(attributes.set(MovementAttributeId::AirControlGlide, 1.4), 1.0);
        assert_relative_eq!(
            attributes.set(MovementAttributeId::AirControlGlide, -0.4),
            0.0
        );
    }
}
