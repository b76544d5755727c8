//! Guard behavior states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Behavioral state of a guard.
///
/// There is no terminal state; a guard cycles through these for its whole
/// lifetime, starting in `Patrol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GuardState {
    /// Walking the patrol route
    #[default]
    Patrol,
    /// Has glimpsed the player and is closing in
    Suspicious,
    /// Pursuing the player until contact is lost long enough
    Chase,
    /// Heading to a noise
    Distracted,
    /// Heading to where a camera last saw the player
    Alerted,
    /// Standing still and sweeping the view after a distraction
    LookingAround,
}

impl GuardState {
    pub const ALL: [Self; 6] = [
        Self::Patrol,
        Self::Suspicious,
        Self::Chase,
        Self::Distracted,
        Self::Alerted,
        Self::LookingAround,
    ];

    /// State name for logging and debug overlays
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Suspicious => "Suspicious",
            Self::Chase => "Chase",
            Self::Distracted => "Distracted",
            Self::Alerted => "Alerted",
            Self::LookingAround => "LookingAround",
        }
    }

    /// Whether a distraction event can interrupt this state
    #[must_use]
    pub fn accepts_distractions(self) -> bool {
        matches!(self, Self::Patrol | Self::Distracted | Self::LookingAround)
    }

    /// Whether the guard is engaged with the player
    #[must_use]
    pub fn is_hostile(self) -> bool {
        matches!(self, Self::Suspicious | Self::Chase)
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A committed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GuardState,
    pub to: GuardState,
}
