//! Form lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle phases of the onboarding form.
///
/// Loading → Ready → Submitting → Succeeded, with Submitting → Ready when a
/// submission fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Loading,
    Ready,
    Submitting,
    Succeeded,
}

impl FormPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FormPhase) -> bool {
        use FormPhase::*;
        matches!(
            (self, target),
            (Loading, Ready) | (Ready, Submitting) | (Submitting, Ready) | (Submitting, Succeeded)
        )
    }
}

impl std::fmt::Display for FormPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
        };
        write!(f, "{s}")
    }
}
