//! Rejected hold requests

use thiserror::Error;

/// Why a begin-hold request was refused.
///
/// Rejections are expected input (overlapping key handlers, auto-repeat) and
/// leave all state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoldRejected {
    #[error("'{active}' is already being held")]
    AnotherHoldActive { active: String },

    #[error("'{action}' is cooling down ({remaining_secs}s left)")]
    CoolingDown { action: String, remaining_secs: u32 },

    #[error("'{action}' is not available on this panel")]
    ActionDisabled { action: String },
}
