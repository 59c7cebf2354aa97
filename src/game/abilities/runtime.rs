// Ability runtime: per-ability state table and counted status tags

use log::{debug, trace};

use super::tags::{AbilityId, AbilityTags, StatusTag};

/// Static configuration for one ability
#[derive(Debug, Clone)]
pub struct AbilitySpec {
    /// How long the ability stays active on its own; `None` means it runs
    /// until canceled
    pub duration: Option<f32>,
    /// Cooldown started when the ability ends or is canceled
    pub cooldown: f32,
    /// At least one of these must be active for activation to succeed
    pub requires_any: AbilityTags,
    /// Activation fails while any of these is active
    pub blocked_by: AbilityTags,
    /// Whether the ability can activate while the character is dead
    pub usable_while_dead: bool,
}

impl Default for AbilitySpec {
    fn default() -> Self {
        Self {
            duration: None,
            cooldown: 0.0,
            requires_any: AbilityTags::empty(),
            blocked_by: AbilityTags::empty(),
            usable_while_dead: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AbilityState {
    active: bool,
    time_remaining: f32,
    cooldown_remaining: f32,
}

const STATUS_COUNT: usize = 2;

/// Tracks ability activation state and loose status tags for one character
#[derive(Debug)]
pub struct AbilityRuntime {
    specs: [AbilitySpec; 8],
    states: [AbilityState; 8],
    status_counts: [u32; STATUS_COUNT],
}

impl AbilityRuntime {
    pub fn new(specs: [AbilitySpec; 8]) -> Self {
        Self {
            specs,
            states: [AbilityState::default(); 8],
            status_counts: [0; STATUS_COUNT],
        }
    }

    /// Runtime with the default ability wiring: wall jumps need an active
    /// wall slide, dashes block each other, and dash cooldowns are what
    /// push a repeated press over to the double dash.
    pub fn with_default_specs() -> Self {
        let mut specs: [AbilitySpec; 8] = Default::default();
        specs[AbilityId::WallJump.index()] = AbilitySpec {
            duration: Some(0.2),
            requires_any: AbilityTags::WALL_SLIDE,
            ..Default::default()
        };
        specs[AbilityId::Dash.index()] = AbilitySpec {
            duration: Some(0.25),
            cooldown: 1.0,
            blocked_by: AbilityTags::DOUBLE_DASH,
            ..Default::default()
        };
        specs[AbilityId::DoubleDash.index()] = AbilitySpec {
            duration: Some(0.25),
            cooldown: 1.5,
            blocked_by: AbilityTags::DASH,
            ..Default::default()
        };
        specs[AbilityId::QuickStep.index()] = AbilitySpec {
            duration: Some(0.15),
            cooldown: 0.75,
            ..Default::default()
        };
        specs[AbilityId::Attack.index()] = AbilitySpec {
            duration: Some(0.6),
            ..Default::default()
        };
        Self::new(specs)
    }

    pub fn spec(&self, id: AbilityId) -> &AbilitySpec {
        &self.specs[id.index()]
    }

    /// Try to activate an ability. Returns false without side effects when
    /// any prerequisite is unmet; callers fall through to their next option.
    pub fn try_activate(&mut self, id: AbilityId) -> bool {
        let spec = self.specs[id.index()].clone();
        let state = self.states[id.index()];

        if state.active {
            trace!("{:?} rejected: already active", id);
            return false;
        }
        if state.cooldown_remaining > 0.0 {
            trace!("{:?} rejected: on cooldown", id);
            return false;
        }
        if !spec.usable_while_dead && self.has_status(StatusTag::Dead) {
            trace!("{:?} rejected: character is dead", id);
            return false;
        }
        if !spec.requires_any.is_empty() && !self.has_any_active(spec.requires_any) {
            trace!("{:?} rejected: prerequisites unmet", id);
            return false;
        }
        if self.has_any_active(spec.blocked_by) {
            trace!("{:?} rejected: blocked by an active ability", id);
            return false;
        }

        let state = &mut self.states[id.index()];
        state.active = true;
        state.time_remaining = spec.duration.unwrap_or(0.0);
        debug!("{:?} activated", id);
        true
    }

    /// Cancel every active ability in the set; returns the subset that was
    /// actually active. Cooldowns start immediately.
    pub fn cancel(&mut self, tags: AbilityTags) -> AbilityTags {
        let mut canceled = AbilityTags::empty();
        for id in tags.ids() {
            let spec_cooldown = self.specs[id.index()].cooldown;
            let state = &mut self.states[id.index()];
            if state.active {
                state.active = false;
                state.time_remaining = 0.0;
                state.cooldown_remaining = spec_cooldown;
                canceled |= id.tag();
                debug!("{:?} canceled", id);
            }
        }
        canceled
    }

    pub fn is_active(&self, id: AbilityId) -> bool {
        self.states[id.index()].active
    }

    pub fn has_any_active(&self, tags: AbilityTags) -> bool {
        tags.ids().any(|id| self.is_active(id))
    }

    /// Snapshot of all currently active abilities
    pub fn active_tags(&self) -> AbilityTags {
        let mut tags = AbilityTags::empty();
        for id in AbilityId::ALL {
            if self.is_active(id) {
                tags |= id.tag();
            }
        }
        tags
    }

    /// Advance cooldowns and durations; returns abilities that expired on
    /// their own this tick, so the owner can revert their side effects.
    pub fn tick(&mut self, dt: f32) -> AbilityTags {
        let mut expired = AbilityTags::empty();
        for id in AbilityId::ALL {
            let spec_cooldown = self.specs[id.index()].cooldown;
            let has_duration = self.specs[id.index()].duration.is_some();
            let state = &mut self.states[id.index()];

            if state.cooldown_remaining > 0.0 {
                state.cooldown_remaining = (state.cooldown_remaining - dt).max(0.0);
            }
            if state.active && has_duration {
                state.time_remaining -= dt;
                if state.time_remaining <= 0.0 {
                    state.active = false;
                    state.time_remaining = 0.0;
                    state.cooldown_remaining = spec_cooldown;
                    expired |= id.tag();
                    debug!("{:?} expired", id);
                }
            }
        }
        expired
    }

    /// Increment a loose status tag; returns the new count. A return of 1
    /// marks the 0 -> 1 edge.
    pub fn add_status(&mut self, tag: StatusTag) -> u32 {
        let count = &mut self.status_counts[tag.index()];
        *count += 1;
        *count
    }

    /// Decrement a loose status tag; returns the new count
    pub fn remove_status(&mut self, tag: StatusTag) -> u32 {
        let count = &mut self.status_counts[tag.index()];
        *count = count.saturating_sub(1);
        *count
    }

    pub fn status_count(&self, tag: StatusTag) -> u32 {
        self.status_counts[tag.index()]
    }

    pub fn has_status(&self, tag: StatusTag) -> bool {
        self.status_count(tag) > 0
    }
}

impl Default for AbilityRuntime {
    fn default() -> Self {
        Self::with_default_specs()
    }
}
