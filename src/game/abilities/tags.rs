// Ability and status identifiers

use bitflags::bitflags;

/// All abilities a character can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityId {
    Sprint,
    WallSlide,
    WallJump,
    Dash,
    DoubleDash,
    QuickStep,
    Glide,
    Attack,
}

impl AbilityId {
    pub const ALL: [AbilityId; 8] = [
        AbilityId::Sprint,
        AbilityId::WallSlide,
        AbilityId::WallJump,
        AbilityId::Dash,
        AbilityId::DoubleDash,
        AbilityId::QuickStep,
        AbilityId::Glide,
        AbilityId::Attack,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            AbilityId::Sprint => 0,
            AbilityId::WallSlide => 1,
            AbilityId::WallJump => 2,
            AbilityId::Dash => 3,
            AbilityId::DoubleDash => 4,
            AbilityId::QuickStep => 5,
            AbilityId::Glide => 6,
            AbilityId::Attack => 7,
        }
    }

    /// The single-bit tag set for this ability
    pub fn tag(self) -> AbilityTags {
        match self {
            AbilityId::Sprint => AbilityTags::SPRINT,
            AbilityId::WallSlide => AbilityTags::WALL_SLIDE,
            AbilityId::WallJump => AbilityTags::WALL_JUMP,
            AbilityId::Dash => AbilityTags::DASH,
            AbilityId::DoubleDash => AbilityTags::DOUBLE_DASH,
            AbilityId::QuickStep => AbilityTags::QUICK_STEP,
            AbilityId::Glide => AbilityTags::GLIDE,
            AbilityId::Attack => AbilityTags::ATTACK,
        }
    }
}

bitflags! {
    /// A set of ability identifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AbilityTags: u16 {
        const SPRINT = 1 << 0;
        const WALL_SLIDE = 1 << 1;
        const WALL_JUMP = 1 << 2;
        const DASH = 1 << 3;
        const DOUBLE_DASH = 1 << 4;
        const QUICK_STEP = 1 << 5;
        const GLIDE = 1 << 6;
        const ATTACK = 1 << 7;
    }
}

impl AbilityTags {
    /// Iterate the ability ids contained in this set
    pub fn ids(self) -> impl Iterator<Item = AbilityId> {
        AbilityId::ALL
            .into_iter()
            .filter(move |id| self.contains(id.tag()))
    }
}

/// Loose, counted status tags applied to a character from outside the
/// ability table (death, forced input rejection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTag {
    Dead,
    RejectMoveInput,
}

impl StatusTag {
    pub(crate) fn index(self) -> usize {
        match self {
            StatusTag::Dead => 0,
            StatusTag::RejectMoveInput => 1,
        }
    }
}
