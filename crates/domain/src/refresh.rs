//! Refresh cycle state.

use serde::{Deserialize, Serialize};

/// Whether a token refresh is currently in flight for a dispatcher.
///
/// While `Refreshing`, no second refresh call may be issued; requests that
/// hit an expired token are parked until the cycle resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    /// No refresh in flight.
    #[default]
    Idle,
    /// One refresh call is in flight.
    Refreshing,
}

impl RefreshState {
    /// Check if a refresh cycle is active.
    #[must_use]
    pub const fn is_refreshing(self) -> bool {
        matches!(self, Self::Refreshing)
    }

    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Idle => "Session ready",
            Self::Refreshing => "Refreshing session...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = RefreshState::default();
        assert_eq!(state, RefreshState::Idle);
        assert!(!state.is_refreshing());
        assert!(RefreshState::Refreshing.is_refreshing());
    }
}
