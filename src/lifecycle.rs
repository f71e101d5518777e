//! Session and realtime state reported by the simulator.
//!
//! Session boundaries are a reset point for the relay: both starting and
//! ending a session clear the cache and zero the frame. Realtime transitions
//! only toggle the published flag.

use tracing::debug;

/// Whether a session is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    InSession,
}

/// Action the caller has to perform after a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Clear the kinematic cache and zero the frame.
    Reset,
    /// Publish the new realtime flag.
    Realtime(bool),
}

/// Tracks session and realtime transitions.
///
/// Every transition is accepted from every state; repeated calls yield the
/// same action, so `start, start` behaves like a single `start`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionLifecycle {
    state: SessionState,
    in_realtime: bool,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn in_realtime(&self) -> bool {
        self.in_realtime
    }

    pub fn start_session(&mut self) -> LifecycleAction {
        debug!(from = ?self.state, "Session started");
        self.state = SessionState::InSession;
        self.in_realtime = false;
        LifecycleAction::Reset
    }

    pub fn end_session(&mut self) -> LifecycleAction {
        debug!(from = ?self.state, "Session ended");
        self.state = SessionState::Idle;
        self.in_realtime = false;
        LifecycleAction::Reset
    }

    pub fn enter_realtime(&mut self) -> LifecycleAction {
        self.set_realtime(true)
    }

    pub fn exit_realtime(&mut self) -> LifecycleAction {
        self.set_realtime(false)
    }

    fn set_realtime(&mut self, in_realtime: bool) -> LifecycleAction {
        debug!(in_realtime, "Realtime changed");
        self.in_realtime = in_realtime;
        LifecycleAction::Realtime(in_realtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_boundaries_reset() {
        let mut lifecycle = SessionLifecycle::new();
        assert_eq!(lifecycle.state(), SessionState::Idle);

        assert_eq!(lifecycle.start_session(), LifecycleAction::Reset);
        assert_eq!(lifecycle.state(), SessionState::InSession);

        assert_eq!(lifecycle.end_session(), LifecycleAction::Reset);
        assert_eq!(lifecycle.state(), SessionState::Idle);
    }

    #[test]
    fn realtime_only_toggles_the_flag() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.start_session();

        assert_eq!(lifecycle.enter_realtime(), LifecycleAction::Realtime(true));
        assert!(lifecycle.in_realtime());
        assert_eq!(lifecycle.state(), SessionState::InSession);

        assert_eq!(lifecycle.exit_realtime(), LifecycleAction::Realtime(false));
        assert!(!lifecycle.in_realtime());
        assert_eq!(lifecycle.state(), SessionState::InSession);
    }

    #[test]
    fn session_change_leaves_realtime() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.start_session();
        lifecycle.enter_realtime();
        lifecycle.end_session();
        assert!(!lifecycle.in_realtime());
    }

    #[test]
    fn repeated_starts_are_equivalent() {
        let mut once = SessionLifecycle::new();
        once.start_session();

        let mut twice = SessionLifecycle::new();
        twice.start_session();
        twice.start_session();

        assert_eq!(once.state(), twice.state());
        assert_eq!(once.in_realtime(), twice.in_realtime());
    }
}
