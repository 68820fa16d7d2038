//! Session-expired collaborator port

use crate::error::RefreshError;

/// Notified when the dispatcher ends a session because the credential
/// could not be refreshed.
///
/// Typical implementations navigate to the sign-in entry point. The call
/// happens after the credential store was cleared and before any parked
/// request is rejected.
pub trait SessionListener: Send + Sync {
    /// The session has ended for `reason`.
    fn session_expired(&self, reason: &RefreshError);
}
