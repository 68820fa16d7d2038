//! Single-flight refresh gate and the queue of parked requests.

use parking_lot::Mutex;
use relay_domain::{RefreshState, RequestSpec};
use tokio::sync::oneshot;

use crate::error::{DispatchError, DispatchResult, RefreshError};

/// One caller waiting on a refresh cycle.
///
/// Holds the replayable request and the continuation that hands the
/// caller its outcome. Dropping it without resolving wakes the caller
/// with `RefreshError::Abandoned`.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub(crate) request: RequestSpec,
    reply: oneshot::Sender<DispatchResult>,
}

impl PendingRequest {
    /// Hands the caller its final outcome.
    pub(crate) fn resolve(self, outcome: DispatchResult) {
        // The caller may have given up on the future; nothing to do then.
        let _ = self.reply.send(outcome);
    }

    /// Rejects the caller with a refresh failure.
    pub(crate) fn reject(self, error: RefreshError) {
        self.resolve(Err(DispatchError::RefreshFailed(error)));
    }
}

/// How an unauthorized request enters refresh coordination.
#[derive(Debug)]
pub(crate) enum Admission {
    /// A refresh finished after this request read its token; replay now
    /// with the current credential instead of refreshing again.
    Replay(RequestSpec),
    /// This request opened a new cycle and must start the refresh call.
    Trigger(oneshot::Receiver<DispatchResult>),
    /// A cycle is already in flight; wait for it.
    Parked(oneshot::Receiver<DispatchResult>),
}

#[derive(Debug, Default)]
struct CoordinatorState {
    refresh: RefreshState,
    /// Advances on every successful refresh.
    epoch: u64,
    pending: Vec<PendingRequest>,
}

/// Per-dispatcher refresh state machine.
///
/// The lock is only held for bookkeeping, never across an await.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Credential generation; read before reading the access token.
    pub(crate) fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    pub(crate) fn refresh_state(&self) -> RefreshState {
        self.state.lock().refresh
    }

    pub(crate) fn parked(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Routes a request that was rejected as unauthorized.
    ///
    /// `observed_epoch` is the epoch read before the request's token was.
    pub(crate) fn admit(&self, observed_epoch: u64, request: RequestSpec) -> Admission {
        let mut state = self.state.lock();

        if !state.refresh.is_refreshing() && state.epoch != observed_epoch {
            return Admission::Replay(request);
        }

        let (reply, receiver) = oneshot::channel();
        state.pending.push(PendingRequest { request, reply });

        if state.refresh.is_refreshing() {
            Admission::Parked(receiver)
        } else {
            state.refresh = RefreshState::Refreshing;
            Admission::Trigger(receiver)
        }
    }

    /// Ends the current cycle and hands back every request parked on it.
    ///
    /// The return to `Idle` and the hand-over happen under one lock, so a
    /// request is drained by exactly the cycle it observed.
    pub(crate) fn finish(&self, refreshed: bool) -> Vec<PendingRequest> {
        let mut state = self.state.lock();
        state.refresh = RefreshState::Idle;
        if refreshed {
            state.epoch += 1;
        }
        std::mem::take(&mut state.pending)
    }

    /// Guards the cycle opened by a `Trigger` admission.
    pub(crate) const fn cycle(&self) -> CycleGuard<'_> {
        CycleGuard {
            coordinator: self,
            finished: false,
        }
    }
}

/// Ends a refresh cycle even when the task running it unwinds.
///
/// Dropping the guard without calling [`CycleGuard::finish`] returns the
/// coordinator to `Idle` and rejects the parked batch as abandoned.
#[derive(Debug)]
pub(crate) struct CycleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl CycleGuard<'_> {
    pub(crate) fn finish(&mut self, refreshed: bool) -> Vec<PendingRequest> {
        self.finished = true;
        self.coordinator.finish(refreshed)
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        for pending in self.coordinator.finish(false) {
            pending.reject(RefreshError::Abandoned);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relay_domain::ResponseSpec;

    #[test]
    fn test_first_unauthorized_triggers_then_others_park() {
        let coordinator = RefreshCoordinator::new();

        let first = coordinator.admit(0, RequestSpec::get("/a"));
        assert!(matches!(first, Admission::Trigger(_)));
        assert_eq!(coordinator.refresh_state(), RefreshState::Refreshing);

        let second = coordinator.admit(0, RequestSpec::get("/b"));
        assert!(matches!(second, Admission::Parked(_)));
        assert_eq!(coordinator.parked(), 2);
    }

    #[test]
    fn test_finish_drains_and_resets() {
        let coordinator = RefreshCoordinator::new();
        let _first = coordinator.admit(0, RequestSpec::get("/a"));
        let _second = coordinator.admit(0, RequestSpec::get("/b"));

        let batch = coordinator.finish(true);

        assert_eq!(batch.len(), 2);
        assert_eq!(coordinator.parked(), 0);
        assert_eq!(coordinator.refresh_state(), RefreshState::Idle);
        assert_eq!(coordinator.epoch(), 1);
    }

    #[test]
    fn test_failed_cycle_keeps_epoch() {
        let coordinator = RefreshCoordinator::new();
        let _first = coordinator.admit(0, RequestSpec::get("/a"));
        coordinator.finish(false);
        assert_eq!(coordinator.epoch(), 0);
    }

    #[test]
    fn test_stale_token_replays_without_new_cycle() {
        let coordinator = RefreshCoordinator::new();
        let _first = coordinator.admit(0, RequestSpec::get("/a"));
        coordinator.finish(true);

        let late = coordinator.admit(0, RequestSpec::get("/late"));
        let Admission::Replay(request) = late else {
            panic!("expected replay, got {late:?}");
        };
        assert_eq!(request.path, "/late");
        assert_eq!(coordinator.refresh_state(), RefreshState::Idle);

        let fresh = coordinator.admit(1, RequestSpec::get("/fresh"));
        assert!(matches!(fresh, Admission::Trigger(_)));
    }

    #[tokio::test]
    async fn test_dropped_pending_wakes_caller() {
        let coordinator = RefreshCoordinator::new();
        let Admission::Trigger(receiver) = coordinator.admit(0, RequestSpec::get("/a")) else {
            panic!("expected trigger");
        };
        drop(coordinator.finish(false));
        assert!(receiver.await.is_err());
    }

    #[tokio::test]
    async fn test_unfinished_cycle_rejects_batch_on_drop() {
        let coordinator = RefreshCoordinator::new();
        let Admission::Trigger(receiver) = coordinator.admit(0, RequestSpec::get("/a")) else {
            panic!("expected trigger");
        };
        let Admission::Parked(parked) = coordinator.admit(0, RequestSpec::get("/b")) else {
            panic!("expected parked");
        };

        drop(coordinator.cycle());

        assert_eq!(coordinator.refresh_state(), RefreshState::Idle);
        assert_eq!(coordinator.parked(), 0);
        assert_eq!(coordinator.epoch(), 0);
        for outcome in [receiver.await, parked.await] {
            assert!(matches!(
                outcome,
                Ok(Err(DispatchError::RefreshFailed(RefreshError::Abandoned)))
            ));
        }
    }

    #[test]
    fn test_finished_cycle_leaves_state_alone_on_drop() {
        let coordinator = RefreshCoordinator::new();
        let _first = coordinator.admit(0, RequestSpec::get("/a"));

        let mut cycle = coordinator.cycle();
        let batch = cycle.finish(true);
        let _next = coordinator.admit(1, RequestSpec::get("/b"));
        drop(cycle);

        assert_eq!(batch.len(), 1);
        assert_eq!(coordinator.refresh_state(), RefreshState::Refreshing);
        assert_eq!(coordinator.parked(), 1);
    }

    #[tokio::test]
    async fn test_resolve_delivers_outcome() {
        let coordinator = RefreshCoordinator::new();
        let Admission::Trigger(receiver) = coordinator.admit(0, RequestSpec::get("/a")) else {
            panic!("expected trigger");
        };
        for pending in coordinator.finish(true) {
            pending.resolve(Ok(ResponseSpec::with_status(200, "ok")));
        }
        let outcome = receiver.await;
        assert!(matches!(outcome, Ok(Ok(ref r)) if r.is_success()));
    }
}
