// World-geometry queries

use glam::Vec3;
use thiserror::Error;

use super::ActorId;

/// Collision channels for filtered line traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionChannel {
    /// Regular blocking level geometry
    Static,
    /// Surfaces a character is allowed to wall-slide on
    WallSlide,
}

/// Result of a successful line trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space impact point
    pub point: Vec3,
    /// Surface normal at the impact point, facing against the ray
    pub normal: Vec3,
    /// Distance from the trace start to the impact point
    pub distance: f32,
    /// Actor owning the hit surface
    pub actor: ActorId,
}

/// Read-only geometry queries the character core depends on
pub trait WorldQuery {
    /// Trace a segment against the given channel, skipping ignored actors.
    /// Returns the closest hit, if any.
    fn line_trace(
        &self,
        start: Vec3,
        end: Vec3,
        channel: CollisionChannel,
        ignore: &[ActorId],
    ) -> Option<RayHit>;
}

/// World construction errors
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("wall panel normal must be a non-zero horizontal vector")]
    DegenerateNormal,

    #[error("wall panel extents must be positive, got {0}x{1}")]
    InvalidExtents(f32, f32),
}

/// A finite rectangular wall surface
#[derive(Debug, Clone)]
pub struct WallPanel {
    actor: ActorId,
    center: Vec3,
    normal: Vec3,
    /// Horizontal axis along the panel face
    u_axis: Vec3,
    half_width: f32,
    half_height: f32,
    channel: CollisionChannel,
}

impl WallPanel {
    /// Create a vertical wall panel. The normal must lie in the XY plane.
    pub fn new(
        actor: ActorId,
        center: Vec3,
        normal: Vec3,
        half_width: f32,
        half_height: f32,
        channel: CollisionChannel,
    ) -> Result<Self, WorldError> {
        let flat = Vec3::new(normal.x, normal.y, 0.0);
        if flat.length_squared() < 1e-8 {
            return Err(WorldError::DegenerateNormal);
        }
        if half_width <= 0.0 || half_height <= 0.0 {
            return Err(WorldError::InvalidExtents(half_width, half_height));
        }
        let normal = flat.normalize();
        Ok(Self {
            actor,
            center,
            normal,
            u_axis: Vec3::Z.cross(normal).normalize(),
            half_width,
            half_height,
            channel,
        })
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

/// Static level geometry backing [`WorldQuery`]
#[derive(Debug, Default)]
pub struct StaticWorld {
    panels: Vec<WallPanel>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wall panel to the world
    pub fn add_panel(&mut self, panel: WallPanel) {
        self.panels.push(panel);
    }

    fn trace_panel(panel: &WallPanel, start: Vec3, end: Vec3) -> Option<RayHit> {
        let segment = end - start;
        let length = segment.length();
        if length < 1e-6 {
            return None;
        }
        let direction = segment / length;

        let denom = direction.dot(panel.normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (panel.center - start).dot(panel.normal) / denom;
        if t < 0.0 || t > length {
            return None;
        }

        let point = start + direction * t;
        let offset = point - panel.center;
        if offset.dot(panel.u_axis).abs() > panel.half_width || offset.z.abs() > panel.half_height {
            return None;
        }

        // report the normal facing against the incoming ray
        let normal = if denom > 0.0 { -panel.normal } else { panel.normal };
        Some(RayHit {
            point,
            normal,
            distance: t,
            actor: panel.actor,
        })
    }
}

impl WorldQuery for StaticWorld {
    fn line_trace(
        &self,
        start: Vec3,
        end: Vec3,
        channel: CollisionChannel,
        ignore: &[ActorId],
    ) -> Option<RayHit> {
        self.panels
            .iter()
            .filter(|panel| panel.channel == channel && !ignore.contains(&panel.actor))
            .filter_map(|panel| Self::trace_panel(panel, start, end))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
