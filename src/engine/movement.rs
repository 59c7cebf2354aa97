// Physical movement seam
//
// The character core never integrates motion itself; it reads and writes
// movement state through the `MovementProvider` trait. `KinematicBody` is a
// minimal grounded/air integrator backing that trait for headless runs and
// tests. It is not a physics solver: the ground is the z = 0 plane and
// walls only exist for line traces (see `engine::world`).

use glam::Vec3;

use crate::core::math::direction_from_yaw;

use super::ActorId;

/// World gravity along Z (units/s^2), before per-body gravity scale
pub const GRAVITY_Z: f32 = -980.0;

/// Axis pinned by the movement plane constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneConstraintAxis {
    X,
    Y,
    Z,
}

/// Read/write access to a character's physical movement state
pub trait MovementProvider {
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);

    fn ground_friction(&self) -> f32;
    fn set_ground_friction(&mut self, friction: f32);

    fn max_walk_speed(&self) -> f32;
    fn set_max_walk_speed(&mut self, speed: f32);

    fn jump_z_velocity(&self) -> f32;
    fn set_jump_z_velocity(&mut self, velocity: f32);

    fn air_control(&self) -> f32;
    fn set_air_control(&mut self, control: f32);

    /// Yaw interpolation speed used when rotating toward movement input
    fn rotation_rate_yaw(&self) -> f32;

    /// True while the body is airborne
    fn is_falling(&self) -> bool;

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Facing yaw in degrees
    fn yaw(&self) -> f32;
    fn set_yaw(&mut self, yaw: f32);

    /// Unit vector the body is facing, in the XY plane
    fn forward_vector(&self) -> Vec3 {
        direction_from_yaw(self.yaw())
    }

    /// Accumulate walk input for the next step; magnitude is capped at 1
    fn add_movement_input(&mut self, direction: Vec3);

    /// Set velocity directly, per-component either overriding or adding
    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool);

    /// Begin a jump if the body is on the ground
    fn jump(&mut self);

    /// Release the jump; any held-jump shaping stops here
    fn stop_jumping(&mut self);

    fn set_plane_constraint_enabled(&mut self, enabled: bool);
    fn set_plane_constraint_axis(&mut self, axis: PlaneConstraintAxis);

    /// Stick the body to another actor (wall riding); survives until detach
    fn attach_to(&mut self, actor: ActorId);
    fn detach(&mut self);
    fn attach_parent(&self) -> Option<ActorId>;

    /// Collision capsule radius, used to scale wall-probe reach
    fn capsule_radius(&self) -> f32;
}

/// Minimal kinematic character body
#[derive(Debug)]
pub struct KinematicBody {
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    grounded: bool,
    pending_input: Vec3,

    gravity_scale: f32,
    ground_friction: f32,
    max_walk_speed: f32,
    jump_z_velocity: f32,
    air_control: f32,
    rotation_rate_yaw: f32,
    capsule_radius: f32,

    plane_constraint_enabled: bool,
    plane_constraint_axis: PlaneConstraintAxis,
    attach_parent: Option<ActorId>,
}

impl KinematicBody {
    pub fn new(position: Vec3, capsule_radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            grounded: position.z <= 0.0,
            pending_input: Vec3::ZERO,
            gravity_scale: 2.0,
            ground_friction: 8.0,
            max_walk_speed: 600.0,
            jump_z_velocity: 1000.0,
            air_control: 0.8,
            rotation_rate_yaw: 10.0,
            capsule_radius,
            plane_constraint_enabled: false,
            plane_constraint_axis: PlaneConstraintAxis::X,
            attach_parent: None,
        }
    }

    pub fn plane_constraint_enabled(&self) -> bool {
        self.plane_constraint_enabled
    }

    pub fn plane_constraint_axis(&self) -> PlaneConstraintAxis {
        self.plane_constraint_axis
    }

    /// Advance the body by one fixed timestep
    pub fn step(&mut self, dt: f32) {
        let mut input = self.pending_input;
        self.pending_input = Vec3::ZERO;
        if input.length_squared() > 1.0 {
            input = input.normalize();
        }

        if self.plane_constraint_enabled {
            match self.plane_constraint_axis {
                PlaneConstraintAxis::X => {
                    input.x = 0.0;
                    self.velocity.x = 0.0;
                }
                PlaneConstraintAxis::Y => {
                    input.y = 0.0;
                    self.velocity.y = 0.0;
                }
                PlaneConstraintAxis::Z => {
                    input.z = 0.0;
                    self.velocity.z = 0.0;
                }
            }
        }

        let walk_input = Vec3::new(input.x, input.y, 0.0);
        if self.grounded {
            if walk_input.length_squared() > 0.0 {
                self.velocity.x = walk_input.x * self.max_walk_speed;
                self.velocity.y = walk_input.y * self.max_walk_speed;
            } else {
                let damp = (self.ground_friction * dt).min(1.0);
                self.velocity.x -= self.velocity.x * damp;
                self.velocity.y -= self.velocity.y * damp;
            }
        } else {
            if walk_input.length_squared() > 0.0 {
                self.velocity.x = walk_input.x * self.max_walk_speed * self.air_control;
                self.velocity.y = walk_input.y * self.max_walk_speed * self.air_control;
            }
            self.velocity.z += GRAVITY_Z * self.gravity_scale * dt;
        }

        self.position += self.velocity * dt;

        if self.position.z <= 0.0 && self.velocity.z <= 0.0 {
            self.position.z = 0.0;
            self.velocity.z = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }
}

impl MovementProvider for KinematicBody {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn ground_friction(&self) -> f32 {
        self.ground_friction
    }

    fn set_ground_friction(&mut self, friction: f32) {
        self.ground_friction = friction;
    }

    fn max_walk_speed(&self) -> f32 {
        self.max_walk_speed
    }

    fn set_max_walk_speed(&mut self, speed: f32) {
        self.max_walk_speed = speed;
    }

    fn jump_z_velocity(&self) -> f32 {
        self.jump_z_velocity
    }

    fn set_jump_z_velocity(&mut self, velocity: f32) {
        self.jump_z_velocity = velocity;
    }

    fn air_control(&self) -> f32 {
        self.air_control
    }

    fn set_air_control(&mut self, control: f32) {
        self.air_control = control;
    }

    fn rotation_rate_yaw(&self) -> f32 {
        self.rotation_rate_yaw
    }

    fn is_falling(&self) -> bool {
        !self.grounded
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn yaw(&self) -> f32 {
        self.yaw
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    fn add_movement_input(&mut self, direction: Vec3) {
        self.pending_input += direction;
    }

    fn launch(&mut self, velocity: Vec3, override_xy: bool, override_z: bool) {
        if override_xy {
            self.velocity.x = velocity.x;
            self.velocity.y = velocity.y;
        } else {
            self.velocity.x += velocity.x;
            self.velocity.y += velocity.y;
        }
        if override_z {
            self.velocity.z = velocity.z;
        } else {
            self.velocity.z += velocity.z;
        }
        if self.velocity.z > 0.0 {
            self.grounded = false;
        }
    }

    fn jump(&mut self) {
        if self.grounded {
            self.velocity.z = self.jump_z_velocity;
            self.grounded = false;
        }
    }

    fn stop_jumping(&mut self) {
        // held-jump shaping is not modeled by this integrator
    }

    fn set_plane_constraint_enabled(&mut self, enabled: bool) {
        self.plane_constraint_enabled = enabled;
    }

    fn set_plane_constraint_axis(&mut self, axis: PlaneConstraintAxis) {
        self.plane_constraint_axis = axis;
    }

    fn attach_to(&mut self, actor: ActorId) {
        self.attach_parent = Some(actor);
    }

    fn detach(&mut self) {
        self.attach_parent = None;
    }

    fn attach_parent(&self) -> Option<ActorId> {
        self.attach_parent
    }

    fn capsule_radius(&self) -> f32 {
        self.capsule_radius
    }
}
