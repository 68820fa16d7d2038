//! Sends the client back to sign-in when its session ends.

use relay_application::RefreshError;
use relay_application::ports::SessionListener;
use relay_domain::Navigation;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Session listener that requests navigation to the sign-in route.
///
/// Navigations are delivered on an unbounded channel; whoever owns the
/// UI (or the CLI loop) drains the receiver and acts on them.
#[derive(Debug, Clone)]
pub struct SignInRedirector {
    route: String,
    navigations: mpsc::UnboundedSender<Navigation>,
}

impl SignInRedirector {
    /// Creates a redirector for `route` and the receiving end of its
    /// navigation channel.
    #[must_use]
    pub fn new(route: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (navigations, receiver) = mpsc::unbounded_channel();
        let redirector = Self {
            route: route.into(),
            navigations,
        };
        (redirector, receiver)
    }
}

impl SessionListener for SignInRedirector {
    fn session_expired(&self, reason: &RefreshError) {
        info!(route = %self.route, %reason, "session expired; redirecting to sign-in");

        let navigation = Navigation {
            route: self.route.clone(),
            reason: reason.to_string(),
        };
        if self.navigations.send(navigation).is_err() {
            debug!("no one is listening for navigations");
        }
    }
}
