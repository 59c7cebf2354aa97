// Movement space states

/// Geometric constraint mode governing how freely a character moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementSpace {
    /// Locked to a vertical plane; only the right axis moves the character
    In2D,
    /// Free movement in the horizontal plane
    In3D,
    /// Bound to a spline path, with free vertical motion
    OnSpline,
}

impl Default for MovementSpace {
    fn default() -> Self {
        Self::In3D
    }
}

impl MovementSpace {
    /// Whether this space pins movement to a plane
    pub fn is_plane_constrained(&self) -> bool {
        matches!(self, Self::In2D)
    }

    /// Whether the up/forward axis contributes to movement in this space
    pub fn uses_up_axis(&self) -> bool {
        matches!(self, Self::In3D)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_3d() {
        assert_eq!(MovementSpace::default(), MovementSpace::In3D);
    }

    #[test]
    fn test_plane_constraint() {
        assert!(MovementSpace::In2D.is_plane_constrained());
        assert!(!MovementSpace::In3D.is_plane_constrained());
        assert!(!MovementSpace::OnSpline.is_plane_constrained());
    }

    #[test]
    fn test_up_axis_usage() {
        assert!(MovementSpace::In3D.uses_up_axis());
        assert!(!MovementSpace::In2D.uses_up_axis());
        assert!(!MovementSpace::OnSpline.uses_up_axis());
    }
}
