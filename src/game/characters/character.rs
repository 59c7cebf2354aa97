// The character: a frame-stepped movement and ability state machine
//
// One `Character` owns its attribute sets and ability runtime and talks to
// the engine through the movement/world/spline seams passed into its
// methods. Player and enemy characters are the same type; enemies simply
// never receive input-surface calls.

use std::rc::Rc;

use glam::Vec3;
use log::debug;

use crate::core::math::{interp_angle_to, normalize_angle, yaw_from_direction};
use crate::engine::movement::{MovementProvider, PlaneConstraintAxis};
use crate::engine::spline::SplineProvider;
use crate::engine::world::{CollisionChannel, RayHit, WorldQuery};
use crate::engine::ActorId;

use crate::game::abilities::{AbilityId, AbilityRuntime, AbilityTags, StatusTag};
use crate::game::combat;

use super::attributes::{
    AttributeChange, AttributeId, AttributeModifier, CharacterAttributeSet, Effect, ModOp,
};
use super::movement_attributes::{MovementAttributeId, MovementAttributeSet};
use super::state::MovementSpace;

/// Unique identifier for a character
pub type CharacterId = u32;

/// While wall sliding, input may only rotate the character within this many
/// degrees of "directly away from the wall"
const WALL_ROTATION_YAW_TOLERANCE: f32 = 45.0 / 2.0;

/// Wall probe reach as a multiple of the capsule radius
const WALL_PROBE_RADIUS_SCALE: f32 = 1.5;

/// Notifications a character emits for outer layers (animation, UI, spawning)
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterEvent {
    MovementSpaceChanged {
        previous: MovementSpace,
        current: MovementSpace,
    },
    HealthChanged {
        old: f32,
        new: f32,
    },
    /// Fired exactly once, on the dead tag's 0 -> 1 transition
    Died,
    AttackStarted,
    /// The active attack animation should jump to this combo section
    AttackComboSection(String),
}

/// Per-character tuning that is not an attribute
#[derive(Debug, Clone)]
pub struct CharacterConfig {
    /// Walk-speed scale while the sprint ability is active
    pub sprint_speed_multiplier: f32,
    /// Launch speed scale for the quick step, applied to max walk speed
    pub quick_step_velocity_multiplier: f32,
    /// Abilities that suppress direct movement and rotation input
    pub move_blocking: AbilityTags,
    /// Instant effect applied to the attribute set at possession
    pub attribute_init: Effect,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            sprint_speed_multiplier: 1.6,
            quick_step_velocity_multiplier: 2.0,
            move_blocking: AbilityTags::DASH | AbilityTags::DOUBLE_DASH | AbilityTags::QUICK_STEP,
            attribute_init: Effect::new(vec![
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
                AttributeModifier {
                    id: AttributeId::RawDamage,
                    op: ModOp::Override,
                    magnitude: 10.0,
                },
                AttributeModifier {
                    id: AttributeId::Armor,
                    op: ModOp::Override,
                    magnitude: 5.0,
                },
            ]),
        }
    }
}

/// Movement-provider values captured at possession, restored when abilities
/// end
#[derive(Debug, Clone, Copy)]
struct DefaultMovementValues {
    gravity_scale: f32,
    ground_friction: f32,
    air_control: f32,
}

/// A player- or AI-controlled character
pub struct Character {
    id: CharacterId,
    /// Actor backing this character in the world, ignored by its own traces
    actor: ActorId,

    attributes: CharacterAttributeSet,
    movement_attributes: MovementAttributeSet,
    abilities: AbilityRuntime,
    config: CharacterConfig,

    movement_space: MovementSpace,
    previous_movement_space: MovementSpace,
    movement_spline: Option<Rc<dyn SplineProvider>>,

    axis_move_up: f32,
    axis_move_right: f32,
    wall_sliding: bool,
    last_valid_wall_hit: Option<RayHit>,

    attack_combo_enabled: bool,
    attack_next_combo_section: Option<String>,

    defaults: Option<DefaultMovementValues>,
    events: Vec<CharacterEvent>,
}

impl Character {
    pub fn new(id: CharacterId, actor: ActorId, config: CharacterConfig) -> Self {
        Self {
            id,
            actor,
            attributes: CharacterAttributeSet::new(),
            movement_attributes: MovementAttributeSet::new(),
            abilities: AbilityRuntime::with_default_specs(),
            config,
            movement_space: MovementSpace::default(),
            previous_movement_space: MovementSpace::default(),
            movement_spline: None,
            axis_move_up: 0.0,
            axis_move_right: 0.0,
            wall_sliding: false,
            last_valid_wall_hit: None,
            attack_combo_enabled: false,
            attack_next_combo_section: None,
            defaults: None,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn attributes(&self) -> &CharacterAttributeSet {
        &self.attributes
    }

    pub fn movement_attributes(&self) -> &MovementAttributeSet {
        &self.movement_attributes
    }

    pub fn abilities(&self) -> &AbilityRuntime {
        &self.abilities
    }

    /// Mutable runtime access for outer layers that apply loose status tags
    /// (forced input rejection, scripted death)
    pub fn abilities_mut(&mut self) -> &mut AbilityRuntime {
        &mut self.abilities
    }

    pub fn wall_sliding_flag(&self) -> bool {
        self.wall_sliding
    }

    pub fn last_valid_wall_hit(&self) -> Option<RayHit> {
        self.last_valid_wall_hit
    }

    pub fn movement_space_state(&self) -> MovementSpace {
        self.movement_space
    }

    pub fn previous_movement_space_state(&self) -> MovementSpace {
        self.previous_movement_space
    }

    pub fn is_dead(&self) -> bool {
        self.abilities.has_status(StatusTag::Dead)
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<CharacterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take control of a movement provider: capture its defaults, run the
    /// attribute initialization, and push movement attributes into it.
    pub fn possess(&mut self, movement: &mut dyn MovementProvider) {
        self.defaults = Some(DefaultMovementValues {
            gravity_scale: movement.gravity_scale(),
            ground_friction: movement.ground_friction(),
            air_control: movement.air_control(),
        });

        let init = self.config.attribute_init.clone();
        self.apply_effect_to_self(&init);

        self.push_walk_speed(movement);
        movement.set_jump_z_velocity(self.movement_attributes.jump_z_velocity());
        debug!("character {} possessed", self.id);
    }

    // ------------------------------------------------------------------
    // Per-frame update
    // ------------------------------------------------------------------

    /// One simulation step. Ordering is load-bearing: wall detection feeds
    /// the blocking checks, which decide whether input reaches the provider.
    pub fn tick(&mut self, dt: f32, movement: &mut dyn MovementProvider, world: &dyn WorldQuery) {
        let expired = self.abilities.tick(dt);
        for id in expired.ids() {
            self.on_ability_ended(id, movement);
        }

        // gliding ends on touchdown
        if self.abilities.is_active(AbilityId::Glide) && !movement.is_falling() {
            self.abilities.cancel(AbilityTags::GLIDE);
            self.stop_glide(movement);
        }

        self.update_wall_sliding_flag(movement, world);

        // snap to the closest spline location; vertical motion stays free
        if self.movement_space == MovementSpace::OnSpline {
            if let Some(spline) = self.movement_spline.clone() {
                let position = movement.position();
                let closest = spline.closest_point(Vec3::new(position.x, position.y, 0.0));
                movement.set_position(Vec3::new(closest.x, closest.y, position.z));
            }
        }

        if !self.is_move_input_blocked() {
            self.update_movement_to_move_input(movement);
            self.update_rotation_to_move_input(dt, movement);
        } else {
            // no jump extension while an ability owns the movement
            if movement.is_falling() {
                movement.stop_jumping();
            }

            // keep facing along the path while an ability carries the
            // character over a spline
            if self.movement_space == MovementSpace::OnSpline {
                if let Some(spline) = self.movement_spline.clone() {
                    let position = movement.position();
                    let mut yaw = spline
                        .closest_rotation_yaw(Vec3::new(position.x, position.y, 0.0));
                    if normalize_angle(yaw - movement.yaw()).abs() > 90.0 {
                        yaw += 180.0;
                    }
                    movement.set_yaw(normalize_angle(yaw));
                }
            }
        }

        // limit negative Z velocity for better falling control
        let velocity = movement.velocity();
        if velocity.z < 0.0 {
            let limited = velocity.z.max(self.movement_attributes.max_fall_speed());
            if limited != velocity.z {
                movement.set_velocity(Vec3::new(velocity.x, velocity.y, limited));
            }
        }
    }

    fn is_move_input_blocked(&self) -> bool {
        self.abilities.has_any_active(self.config.move_blocking)
            || self.abilities.has_status(StatusTag::RejectMoveInput)
    }

    fn update_wall_sliding_flag(
        &mut self,
        movement: &mut dyn MovementProvider,
        world: &dyn WorldQuery,
    ) {
        let sliding = movement.is_falling()
            && self.touching_wall_for_wall_slide(movement, world).is_some()
            && movement.velocity().z <= 0.0;
        self.set_wall_sliding_flag(sliding, movement);
    }

    /// Probe for a wall ahead of the character on the wall-slide channel.
    /// A hit is cached for dependent logic even after the flag clears.
    fn touching_wall_for_wall_slide(
        &mut self,
        movement: &dyn MovementProvider,
        world: &dyn WorldQuery,
    ) -> Option<RayHit> {
        let start = movement.position();
        let end = start
            + movement.forward_vector() * (movement.capsule_radius() * WALL_PROBE_RADIUS_SCALE);
        let hit = world.line_trace(start, end, CollisionChannel::WallSlide, &[self.actor]);
        if let Some(hit) = hit {
            self.last_valid_wall_hit = Some(hit);
        }
        hit
    }

    fn set_wall_sliding_flag(&mut self, value: bool, movement: &mut dyn MovementProvider) {
        self.wall_sliding = value;
        self.on_wall_sliding_flag_set(movement);
    }

    fn on_wall_sliding_flag_set(&mut self, movement: &mut dyn MovementProvider) {
        if self.wall_sliding {
            if self.abilities.has_any_active(AbilityTags::WALL_SLIDE) {
                // the wall slide is passive: its physical behavior runs here
                // while other abilities merely see its tag
                if let Some(hit) = self.last_valid_wall_hit {
                    movement.set_yaw(yaw_from_direction(-hit.normal));

                    if movement.attach_parent() != Some(hit.actor) {
                        movement.attach_to(hit.actor);
                        movement.set_gravity_scale(0.0);
                        movement.set_velocity(Vec3::ZERO);
                        // press the capsule flush against the wall
                        let push = (hit.distance - movement.capsule_radius()).max(0.0);
                        let position = movement.position();
                        movement.set_position(position + movement.forward_vector() * push);
                    }
                }
            } else {
                self.abilities.try_activate(AbilityId::WallSlide);
            }
        } else if self
            .abilities
            .cancel(AbilityTags::WALL_SLIDE)
            .contains(AbilityTags::WALL_SLIDE)
        {
            // leave the dash's zeroed gravity alone; it restores itself
            if !self
                .abilities
                .has_any_active(AbilityTags::DASH | AbilityTags::DOUBLE_DASH)
            {
                if let Some(defaults) = self.defaults {
                    movement.set_gravity_scale(defaults.gravity_scale);
                }
            }
            if let Some(hit) = self.last_valid_wall_hit {
                if movement.attach_parent() == Some(hit.actor) {
                    movement.detach();
                }
            }
        }
    }

    fn update_movement_to_move_input(&mut self, movement: &mut dyn MovementProvider) {
        if self.is_move_input_blocked() || self.wall_sliding {
            return;
        }

        let mut direction = Vec3::ZERO;
        if self.axis_move_right != 0.0 {
            match self.movement_space {
                MovementSpace::In2D | MovementSpace::In3D => {
                    direction.y = self.axis_move_right;
                }
                MovementSpace::OnSpline => {
                    if let Some(spline) = self.movement_spline.clone() {
                        let position = movement.position();
                        direction = self.axis_move_right
                            * spline.closest_tangent(Vec3::new(position.x, position.y, 0.0));
                    }
                }
            }
        }

        if self.axis_move_up != 0.0 && self.movement_space.uses_up_axis() {
            direction.x = self.axis_move_up;
        }

        if direction.length_squared() > 1e-8 {
            movement.add_movement_input(direction.normalize());
        }
    }

    fn update_rotation_to_move_input(&mut self, dt: f32, movement: &mut dyn MovementProvider) {
        let desired_yaw = match self.movement_space {
            MovementSpace::In2D => {
                if self.axis_move_right == 0.0 {
                    return;
                }
                Some(yaw_from_direction(Vec3::new(0.0, self.axis_move_right, 0.0)))
            }
            MovementSpace::In3D => {
                if self.axis_move_up == 0.0 && self.axis_move_right == 0.0 {
                    return;
                }
                Some(yaw_from_direction(Vec3::new(
                    self.axis_move_up,
                    self.axis_move_right,
                    0.0,
                )))
            }
            MovementSpace::OnSpline => {
                if self.axis_move_right == 0.0 {
                    return;
                }
                self.movement_spline.clone().map(|spline| {
                    let position = movement.position();
                    let mut yaw =
                        spline.closest_rotation_yaw(Vec3::new(position.x, position.y, 0.0));
                    // moving backward along the path flips the facing
                    if self.axis_move_right < 0.0 {
                        yaw += 180.0;
                    }
                    normalize_angle(yaw)
                })
            }
        };

        let Some(desired_yaw) = desired_yaw else {
            return;
        };

        if self.abilities.has_any_active(AbilityTags::WALL_SLIDE) {
            self.try_rotate_away_from_wall(desired_yaw, movement);
        } else {
            let rate = movement.rotation_rate_yaw();
            movement.set_yaw(interp_angle_to(movement.yaw(), desired_yaw, dt, rate));
        }
    }

    /// While sliding, rotation is only honored when it points away from the
    /// wall; anything else would snap the character into the surface.
    fn try_rotate_away_from_wall(&self, desired_yaw: f32, movement: &mut dyn MovementProvider) {
        if let Some(hit) = self.last_valid_wall_hit {
            let away_yaw = yaw_from_direction(hit.normal);
            if normalize_angle(desired_yaw - away_yaw).abs() < WALL_ROTATION_YAW_TOLERANCE {
                movement.set_yaw(desired_yaw);
            }
        }
    }

    // ------------------------------------------------------------------
    // Input surface
    // ------------------------------------------------------------------

    pub fn move_up(&mut self, axis_value: f32) {
        self.axis_move_up = axis_value.clamp(-1.0, 1.0);
    }

    pub fn move_right(&mut self, axis_value: f32) {
        self.axis_move_right = axis_value.clamp(-1.0, 1.0);
    }

    /// Jump presses prefer the wall jump; a normal jump only happens when no
    /// movement-blocking ability is running
    pub fn jump_press(&mut self, movement: &mut dyn MovementProvider) {
        if self.abilities.try_activate(AbilityId::WallJump) {
            self.wall_jump(movement);
        } else if !self.is_move_input_blocked() {
            movement.jump();
        }
    }

    pub fn jump_release(&mut self, movement: &mut dyn MovementProvider) {
        movement.stop_jumping();
    }

    pub fn sprint_press(&mut self, movement: &mut dyn MovementProvider) {
        if !movement.is_falling() && self.abilities.try_activate(AbilityId::Sprint) {
            self.push_walk_speed(movement);
        }
    }

    pub fn sprint_release(&mut self, movement: &mut dyn MovementProvider) {
        if self
            .abilities
            .cancel(AbilityTags::SPRINT)
            .contains(AbilityTags::SPRINT)
        {
            self.push_walk_speed(movement);
        }
    }

    /// A dash press while dashing cancels the running dash first, allowing
    /// shortened and chained dashes; the fresh activation then prefers the
    /// dash over the double dash.
    pub fn dash_press(&mut self, movement: &mut dyn MovementProvider) {
        if self
            .abilities
            .cancel(AbilityTags::DASH)
            .contains(AbilityTags::DASH)
            || self
                .abilities
                .cancel(AbilityTags::DOUBLE_DASH)
                .contains(AbilityTags::DOUBLE_DASH)
        {
            self.stop_dash(movement);
        }

        if self.abilities.try_activate(AbilityId::Dash)
            || self.abilities.try_activate(AbilityId::DoubleDash)
        {
            self.dash(movement);
        }
    }

    pub fn quick_step_press(&mut self, movement: &mut dyn MovementProvider) {
        if !movement.is_falling() && self.abilities.try_activate(AbilityId::QuickStep) {
            let velocity = movement.forward_vector()
                * (movement.max_walk_speed() * self.config.quick_step_velocity_multiplier);
            movement.launch(velocity, true, false);
        }
    }

    /// Glide toggles: a press while gliding cancels, otherwise it activates
    /// only while airborne and swallows any held jump
    pub fn glide_press(&mut self, movement: &mut dyn MovementProvider) {
        if !self.try_cancel_glide_ability(movement)
            && movement.is_falling()
            && self.abilities.try_activate(AbilityId::Glide)
        {
            self.start_glide(movement);
            movement.stop_jumping();
        }
    }

    fn try_cancel_glide_ability(&mut self, movement: &mut dyn MovementProvider) -> bool {
        if self
            .abilities
            .cancel(AbilityTags::GLIDE)
            .contains(AbilityTags::GLIDE)
        {
            self.stop_glide(movement);
            true
        } else {
            false
        }
    }

    /// Fresh presses start the attack; presses inside an open combo window
    /// jump the animation to the configured next section
    pub fn attack_press(&mut self) {
        if self.abilities.is_active(AbilityId::Attack) {
            if self.attack_combo_enabled {
                if let Some(section) = self.attack_next_combo_section.clone() {
                    self.events.push(CharacterEvent::AttackComboSection(section));
                }
            }
        } else if self.abilities.try_activate(AbilityId::Attack) {
            self.events.push(CharacterEvent::AttackStarted);
        }
    }

    /// Open the attack combo window; called from animation notifies
    pub fn activate_attack_combo(&mut self, next_section: impl Into<String>) {
        self.attack_combo_enabled = true;
        self.attack_next_combo_section = Some(next_section.into());
    }

    pub fn deactivate_attack_combo(&mut self) {
        self.attack_combo_enabled = false;
        self.attack_next_combo_section = None;
    }

    // ------------------------------------------------------------------
    // Movement space and spline binding
    // ------------------------------------------------------------------

    pub fn set_movement_space_state(
        &mut self,
        state: MovementSpace,
        movement: &mut dyn MovementProvider,
    ) {
        self.previous_movement_space = self.movement_space;
        self.movement_space = state;
        self.on_movement_space_state_changed(movement);
    }

    fn on_movement_space_state_changed(&mut self, movement: &mut dyn MovementProvider) {
        if self.movement_space == self.previous_movement_space {
            return;
        }

        match self.movement_space {
            MovementSpace::In2D => {
                movement.set_plane_constraint_enabled(true);
                movement.set_plane_constraint_axis(PlaneConstraintAxis::X);
            }
            MovementSpace::In3D | MovementSpace::OnSpline => {
                if self.previous_movement_space == MovementSpace::In2D {
                    movement.set_plane_constraint_enabled(false);
                }
            }
        }

        self.events.push(CharacterEvent::MovementSpaceChanged {
            previous: self.previous_movement_space,
            current: self.movement_space,
        });
    }

    /// Bind (or clear) the spline the character moves along. Entering the
    /// spline movement space does not bind one by itself.
    pub fn set_movement_spline(&mut self, spline: Option<Rc<dyn SplineProvider>>) {
        self.movement_spline = spline;
    }

    pub fn has_movement_spline(&self) -> bool {
        self.movement_spline.is_some()
    }

    // ------------------------------------------------------------------
    // Physical ability behaviors
    // ------------------------------------------------------------------

    /// Launch opposite to the facing direction and snap rotation to it
    fn wall_jump(&mut self, movement: &mut dyn MovementProvider) {
        let launch_direction = -movement.forward_vector();
        let mut launch_velocity = launch_direction
            * (movement.max_walk_speed()
                * self.movement_attributes.velocity_xy_multiplier_wall_jump());
        launch_velocity.z =
            movement.jump_z_velocity() * self.movement_attributes.velocity_z_multiplier_wall_jump();

        movement.launch(launch_velocity, false, true);
        movement.set_yaw(yaw_from_direction(launch_direction));
    }

    fn dash(&mut self, movement: &mut dyn MovementProvider) {
        // direction policy: away from the wall while sliding, else derived
        // from input and the movement space
        let (direction, rotation_yaw) = if self.wall_sliding {
            let direction = -movement.forward_vector();
            (direction, Some(yaw_from_direction(direction)))
        } else {
            match self.movement_space {
                MovementSpace::In3D => {
                    if self.axis_move_up == 0.0 && self.axis_move_right == 0.0 {
                        let direction = movement.forward_vector();
                        (direction, Some(yaw_from_direction(direction)))
                    } else {
                        let direction =
                            Vec3::new(self.axis_move_up, self.axis_move_right, 0.0);
                        (direction, Some(yaw_from_direction(direction)))
                    }
                }
                MovementSpace::In2D | MovementSpace::OnSpline => {
                    if self.axis_move_up == 0.0 && self.axis_move_right == 0.0 {
                        let direction = movement.forward_vector();
                        (direction, Some(yaw_from_direction(direction)))
                    } else {
                        let lateral = match self.movement_space {
                            MovementSpace::OnSpline => {
                                if let Some(spline) = self.movement_spline.clone() {
                                    let position = movement.position();
                                    spline.closest_tangent(Vec3::new(
                                        position.x, position.y, 0.0,
                                    )) * self.axis_move_right
                                } else {
                                    Vec3::new(0.0, self.axis_move_right, 0.0)
                                }
                            }
                            _ => Vec3::new(0.0, self.axis_move_right, 0.0),
                        };
                        let direction = lateral + Vec3::new(0.0, 0.0, self.axis_move_up);
                        // a purely vertical dash keeps the current facing
                        let rotation = if self.axis_move_right != 0.0 {
                            Some(yaw_from_direction(lateral))
                        } else {
                            None
                        };
                        (direction, rotation)
                    }
                }
            }
        };

        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }

        // zero friction and gravity so the dash carries the same on the
        // ground as in the air; restored by stop_dash
        movement.set_ground_friction(0.0);
        movement.set_gravity_scale(0.0);

        let dash_velocity = direction
            * (movement.max_walk_speed() * self.movement_attributes.velocity_multiplier_dash());
        movement.launch(dash_velocity, true, true);

        if let Some(yaw) = rotation_yaw {
            movement.set_yaw(yaw);
        }
    }

    /// Revert everything the dash changed, in the same call that ended it
    fn stop_dash(&mut self, movement: &mut dyn MovementProvider) {
        if let Some(defaults) = self.defaults {
            movement.set_ground_friction(defaults.ground_friction);
            movement.set_gravity_scale(defaults.gravity_scale);
        }
        movement.set_velocity(Vec3::ZERO);
    }

    fn start_glide(&mut self, movement: &mut dyn MovementProvider) {
        if let Some(defaults) = self.defaults {
            movement.set_gravity_scale(
                defaults.gravity_scale
                    * self.movement_attributes.gravity_scale_multiplier_glide(),
            );
        }
        movement.set_air_control(self.movement_attributes.air_control_glide());
    }

    fn stop_glide(&mut self, movement: &mut dyn MovementProvider) {
        if let Some(defaults) = self.defaults {
            if !self
                .abilities
                .has_any_active(AbilityTags::DASH | AbilityTags::DOUBLE_DASH)
            {
                movement.set_gravity_scale(defaults.gravity_scale);
            }
            movement.set_air_control(defaults.air_control);
        }
    }

    fn on_ability_ended(&mut self, id: AbilityId, movement: &mut dyn MovementProvider) {
        match id {
            AbilityId::Dash | AbilityId::DoubleDash => self.stop_dash(movement),
            AbilityId::Glide => self.stop_glide(movement),
            AbilityId::Sprint => self.push_walk_speed(movement),
            AbilityId::QuickStep => {
                let velocity = movement.velocity();
                movement.set_velocity(Vec3::new(0.0, 0.0, velocity.z));
            }
            AbilityId::WallSlide | AbilityId::WallJump | AbilityId::Attack => {}
        }
    }

    /// Push the walk speed attribute into the provider, scaled while
    /// sprinting
    fn push_walk_speed(&mut self, movement: &mut dyn MovementProvider) {
        let scale = if self.abilities.is_active(AbilityId::Sprint) {
            self.config.sprint_speed_multiplier
        } else {
            1.0
        };
        movement.set_max_walk_speed(self.movement_attributes.max_walk_speed() * scale);
    }

    // ------------------------------------------------------------------
    // Attributes, damage, death
    // ------------------------------------------------------------------

    /// Write a movement attribute through its clamp gate and mirror the
    /// committed value into the live provider where it applies
    pub fn set_movement_attribute(
        &mut self,
        id: MovementAttributeId,
        proposed: f32,
        movement: &mut dyn MovementProvider,
    ) -> f32 {
        let committed = self.movement_attributes.set(id, proposed);
        match id {
            MovementAttributeId::MaxWalkSpeed => self.push_walk_speed(movement),
            MovementAttributeId::JumpZVelocity => movement.set_jump_z_velocity(committed),
            _ => {}
        }
        committed
    }

    /// Apply an instant effect to this character's own attributes
    pub fn apply_effect_to_self(&mut self, effect: &Effect) {
        let changes = self.attributes.apply_effect(effect);
        self.process_attribute_changes(&changes);
    }

    /// Resolve an incoming attack against this character
    pub fn receive_attack(
        &mut self,
        source: &CharacterAttributeSet,
        source_tags: AbilityTags,
    ) -> combat::AttackOutcome {
        let target_tags = self.abilities.active_tags();
        let (outcome, changes) =
            combat::apply_attack(source, &mut self.attributes, source_tags, target_tags);
        self.process_attribute_changes(&changes);
        outcome
    }

    fn process_attribute_changes(&mut self, changes: &[AttributeChange]) {
        for change in changes {
            if change.id == AttributeId::Health {
                self.events.push(CharacterEvent::HealthChanged {
                    old: change.old,
                    new: change.new,
                });
                if change.new <= 0.0 && self.abilities.add_status(StatusTag::Dead) == 1 {
                    debug!("character {} died", self.id);
                    self.events.push(CharacterEvent::Died);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::movement::KinematicBody;
    use crate::engine::spline::PolylineSpline;
    use crate::engine::world::{StaticWorld, WallPanel};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;
    const PLAYER_ACTOR: ActorId = 100;
    const WALL_ACTOR: ActorId = 1;

    fn possessed_character(body: &mut KinematicBody) -> Character {
        let mut character = Character::new(0, PLAYER_ACTOR, CharacterConfig::default());
        character.possess(body);
        character
    }

    fn empty_world() -> StaticWorld {
        StaticWorld::new()
    }

    fn world_with_wall_ahead() -> StaticWorld {
        // wall close enough for the 1.5x radius probe of a radius-34 capsule
        let mut world = StaticWorld::new();
        world.add_panel(
            WallPanel::new(
                WALL_ACTOR,
                Vec3::new(40.0, 0.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                200.0,
                400.0,
                crate::engine::world::CollisionChannel::WallSlide,
            )
            .unwrap(),
        );
        world
    }

    fn airborne_body() -> KinematicBody {
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.0, 200.0), 34.0);
        body.set_velocity(Vec3::new(0.0, 0.0, -10.0));
        body
    }

    #[test]
    fn test_possess_pushes_movement_attributes() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        body.set_max_walk_speed(0.0);
        body.set_jump_z_velocity(0.0);

        let _character = possessed_character(&mut body);
        assert_relative_eq!(body.max_walk_speed(), 600.0);
        assert_relative_eq!(body.jump_z_velocity(), 1000.0);
    }

    #[test]
    fn test_movement_space_transition_fires_once() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.drain_events();

        character.set_movement_space_state(MovementSpace::In2D, &mut body);
        assert!(body.plane_constraint_enabled());
        let events = character.drain_events();
        assert_eq!(events.len(), 1);

        // same-state transition must not re-fire
        character.set_movement_space_state(MovementSpace::In2D, &mut body);
        assert!(character.drain_events().is_empty());

        character.set_movement_space_state(MovementSpace::In3D, &mut body);
        assert!(!body.plane_constraint_enabled());
    }

    #[test]
    fn test_wall_slide_needs_fall_hit_and_descent() {
        let world = world_with_wall_ahead();

        // falling toward the wall with downward velocity: sliding
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &world);
        assert!(character.wall_sliding_flag());
        assert!(character.abilities().is_active(AbilityId::WallSlide));

        // grounded: not sliding
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &world);
        assert!(!character.wall_sliding_flag());

        // rising: not sliding
        let mut body = airborne_body();
        body.set_velocity(Vec3::new(0.0, 0.0, 50.0));
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &world);
        assert!(!character.wall_sliding_flag());

        // no wall in range: not sliding
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &empty_world());
        assert!(!character.wall_sliding_flag());
    }

    #[test]
    fn test_wall_slide_sticks_to_the_wall() {
        let world = world_with_wall_ahead();
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);

        character.tick(DT, &mut body, &world);
        character.tick(DT, &mut body, &world);

        assert_relative_eq!(body.gravity_scale(), 0.0);
        assert_relative_eq!(body.velocity().length(), 0.0);
        assert_eq!(body.attach_parent(), Some(WALL_ACTOR));
        // pushed flush: capsule edge on the wall plane
        assert_relative_eq!(body.position().x, 40.0 - 34.0, epsilon = 1e-3);
    }

    #[test]
    fn test_wall_slide_end_restores_gravity_and_detaches() {
        let world = world_with_wall_ahead();
        let mut body = airborne_body();
        let default_gravity = body.gravity_scale();
        let mut character = possessed_character(&mut body);

        character.tick(DT, &mut body, &world);
        assert!(character.wall_sliding_flag());

        // move out of wall range; the slide must fully unwind
        body.set_position(Vec3::new(-500.0, 0.0, 200.0));
        body.set_velocity(Vec3::new(0.0, 0.0, -10.0));
        character.tick(DT, &mut body, &world);

        assert!(!character.wall_sliding_flag());
        assert!(!character.abilities().is_active(AbilityId::WallSlide));
        assert_relative_eq!(body.gravity_scale(), default_gravity);
        assert_eq!(body.attach_parent(), None);
    }

    #[test]
    fn test_jump_press_wall_jumps_while_sliding() {
        let world = world_with_wall_ahead();
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &world);
        assert!(character.abilities().is_active(AbilityId::WallSlide));

        character.jump_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::WallJump));
        // launched away from the wall (the character faces +X)
        assert!(body.velocity().x < 0.0);
        assert_relative_eq!(body.velocity().z, 1000.0 * 1.8);
        assert_relative_eq!(normalize_angle(body.yaw()).abs(), 180.0, epsilon = 1e-3);
    }

    #[test]
    fn test_jump_press_normal_jump_on_ground() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.jump_press(&mut body);
        assert_relative_eq!(body.velocity().z, 1000.0);
    }

    #[test]
    fn test_jump_blocked_while_dashing() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.dash_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::Dash));

        character.jump_press(&mut body);
        assert_relative_eq!(body.velocity().z, 0.0);
    }

    #[test]
    fn test_dash_zeroes_friction_and_gravity_until_it_ends() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let default_friction = body.ground_friction();
        let default_gravity = body.gravity_scale();
        let mut character = possessed_character(&mut body);

        character.dash_press(&mut body);
        assert_relative_eq!(body.ground_friction(), 0.0);
        assert_relative_eq!(body.gravity_scale(), 0.0);
        // forward dash at walk speed times the dash multiplier
        assert_relative_eq!(body.velocity().x, 600.0 * 3.0);

        // run past the dash duration; stop_dash must revert everything
        let world = empty_world();
        for _ in 0..30 {
            character.tick(DT, &mut body, &world);
        }
        assert!(!character.abilities().is_active(AbilityId::Dash));
        assert_relative_eq!(body.ground_friction(), default_friction);
        assert_relative_eq!(body.gravity_scale(), default_gravity);
        assert_relative_eq!(body.velocity().length(), 0.0);
    }

    #[test]
    fn test_dash_again_cancels_then_chains_to_double_dash() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let default_friction = body.ground_friction();
        let mut character = possessed_character(&mut body);

        character.dash_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::Dash));

        character.dash_press(&mut body);
        assert!(!character.abilities().is_active(AbilityId::Dash));
        assert!(character.abilities().is_active(AbilityId::DoubleDash));
        // the second dash re-zeroed friction after the first was restored
        assert_relative_eq!(body.ground_friction(), 0.0);

        // cancel the double dash with nothing left to chain into
        character.dash_press(&mut body);
        assert!(!character.abilities().is_active(AbilityId::DoubleDash));
        assert_relative_eq!(body.ground_friction(), default_friction);
    }

    #[test]
    fn test_dash_away_from_wall_while_sliding() {
        let world = world_with_wall_ahead();
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &world);
        assert!(character.wall_sliding_flag());

        character.dash_press(&mut body);
        assert!(body.velocity().x < 0.0);
        assert_relative_eq!(body.velocity().z, 0.0);
    }

    #[test]
    fn test_vertical_dash_keeps_facing() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.set_movement_space_state(MovementSpace::In2D, &mut body);
        body.set_yaw(90.0);

        character.move_up(1.0);
        character.dash_press(&mut body);
        assert_relative_eq!(body.velocity().z, 1800.0);
        assert_relative_eq!(body.velocity().y, 0.0);
        assert_relative_eq!(body.yaw(), 90.0);
    }

    #[test]
    fn test_glide_toggles_and_needs_air() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);

        // grounded press does nothing
        character.glide_press(&mut body);
        assert!(!character.abilities().is_active(AbilityId::Glide));

        let mut body = airborne_body();
        let default_gravity = body.gravity_scale();
        let default_air_control = body.air_control();
        let mut character = possessed_character(&mut body);

        character.glide_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::Glide));
        assert_relative_eq!(body.gravity_scale(), default_gravity * 0.1);
        assert_relative_eq!(body.air_control(), 0.5);

        // second press toggles off and restores
        character.glide_press(&mut body);
        assert!(!character.abilities().is_active(AbilityId::Glide));
        assert_relative_eq!(body.gravity_scale(), default_gravity);
        assert_relative_eq!(body.air_control(), default_air_control);
    }

    #[test]
    fn test_glide_ends_on_touchdown() {
        let mut body = airborne_body();
        let mut character = possessed_character(&mut body);
        character.glide_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::Glide));

        body.set_position(Vec3::ZERO);
        body.set_velocity(Vec3::ZERO);
        body.step(DT); // settles on the ground
        character.tick(DT, &mut body, &empty_world());
        assert!(!character.abilities().is_active(AbilityId::Glide));
    }

    #[test]
    fn test_sprint_scales_walk_speed() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);

        character.sprint_press(&mut body);
        assert!(character.abilities().is_active(AbilityId::Sprint));
        assert_relative_eq!(body.max_walk_speed(), 600.0 * 1.6);

        character.sprint_release(&mut body);
        assert_relative_eq!(body.max_walk_speed(), 600.0);
    }

    #[test]
    fn test_fall_speed_clamp() {
        let mut body = airborne_body();
        body.set_velocity(Vec3::new(0.0, 0.0, -5000.0));
        let mut character = possessed_character(&mut body);
        character.tick(DT, &mut body, &empty_world());
        assert_relative_eq!(body.velocity().z, -1200.0);
    }

    #[test]
    fn test_spline_snap_preserves_z() {
        let mut body = KinematicBody::new(Vec3::new(50.0, 30.0, 77.0), 34.0);
        let mut character = possessed_character(&mut body);
        let spline = Rc::new(
            PolylineSpline::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(200.0, 0.0, 0.0)])
                .unwrap(),
        );
        character.set_movement_spline(Some(spline));
        character.set_movement_space_state(MovementSpace::OnSpline, &mut body);

        character.tick(DT, &mut body, &empty_world());
        assert_relative_eq!(body.position().y, 0.0);
        assert_relative_eq!(body.position().z, 77.0);
    }

    #[test]
    fn test_move_input_respects_movement_space() {
        // In 3D both axes feed movement
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.move_up(1.0);
        character.tick(DT, &mut body, &empty_world());
        body.step(DT);
        assert!(body.velocity().x > 0.0);

        // In 2D the up axis is ignored
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.set_movement_space_state(MovementSpace::In2D, &mut body);
        character.move_up(1.0);
        character.tick(DT, &mut body, &empty_world());
        body.step(DT);
        assert_relative_eq!(body.velocity().x, 0.0);
        assert_relative_eq!(body.velocity().y, 0.0);
    }

    #[test]
    fn test_rotation_turns_toward_input() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.move_right(1.0);

        character.tick(DT, &mut body, &empty_world());
        let first = body.yaw();
        assert!(first > 0.0 && first <= 90.0);

        for _ in 0..120 {
            character.tick(DT, &mut body, &empty_world());
        }
        assert_relative_eq!(body.yaw(), 90.0, epsilon = 0.5);
    }

    #[test]
    fn test_attack_combo_window() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.drain_events();

        character.attack_press();
        assert!(character.abilities().is_active(AbilityId::Attack));
        assert_eq!(character.drain_events(), vec![CharacterEvent::AttackStarted]);

        // without an open window a second press does nothing
        character.attack_press();
        assert!(character.drain_events().is_empty());

        character.activate_attack_combo("Combo2");
        character.attack_press();
        assert_eq!(
            character.drain_events(),
            vec![CharacterEvent::AttackComboSection("Combo2".to_string())]
        );

        character.deactivate_attack_combo();
        character.attack_press();
        assert!(character.drain_events().is_empty());
    }

    #[test]
    fn test_death_fires_exactly_once() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.drain_events();

        let lethal = Effect::single(AttributeId::Health, ModOp::Override, 0.0);
        character.apply_effect_to_self(&lethal);
        assert!(character.is_dead());
        let died: Vec<_> = character
            .drain_events()
            .into_iter()
            .filter(|event| *event == CharacterEvent::Died)
            .collect();
        assert_eq!(died.len(), 1);

        // hitting a corpse must not re-fire the death signal
        character.apply_effect_to_self(&lethal);
        assert!(character
            .drain_events()
            .into_iter()
            .all(|event| event != CharacterEvent::Died));
    }

    #[test]
    fn test_receive_attack_damages_health() {
        let mut body = KinematicBody::new(Vec3::ZERO, 34.0);
        let mut character = possessed_character(&mut body);
        character.drain_events();

        let mut source = CharacterAttributeSet::new();
        source.set(AttributeId::RawDamage, 10.0);

        let outcome = character.receive_attack(&source, AbilityTags::empty());
        assert!(outcome.applied);
        // armor 5: (5 * 100) / (5 + 50) + 1
        assert_relative_eq!(outcome.damage, 500.0 / 55.0 + 1.0);
        assert!(character
            .drain_events()
            .iter()
            .any(|event| matches!(event, CharacterEvent::HealthChanged { .. })));
    }
}
