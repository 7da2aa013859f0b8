//! Shared forwarding state.
//!
//! One [`ForwardContext`] is created at startup and handed by `Arc` to the
//! mode controller and the forwarding use case.  The mode is an atomic so
//! the gate can read it without locking; the small state machines sit behind
//! `std::sync::Mutex` because every critical section is a few field updates
//! with no `.await` inside.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use hidrelay_core::{
    AtomicMode, KeyCode, KeyEdge, Mode, ModifierState, MoveRateLimiter, ToggleOutcome,
    ToggleStateMachine,
};

use super::forward_input::ForwardError;

#[derive(Debug)]
pub struct ForwardContext {
    mode: AtomicMode,
    modifiers: Mutex<ModifierState>,
    toggle: Mutex<ToggleStateMachine>,
    limiter: Mutex<MoveRateLimiter>,
}

impl ForwardContext {
    pub fn new(toggle_key: KeyCode, move_interval: Duration) -> Self {
        Self {
            mode: AtomicMode::new(Mode::Local),
            modifiers: Mutex::new(ModifierState::default()),
            toggle: Mutex::new(ToggleStateMachine::new(toggle_key)),
            limiter: Mutex::new(MoveRateLimiter::new(move_interval)),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.load()
    }

    /// Flips the mode and returns the new value.
    pub fn flip_mode(&self) -> Mode {
        self.mode.flip()
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode);
    }

    /// Runs one key event through the modifier tracker and then the toggle
    /// machine.  The modifier flags are updated for every key, including the
    /// toggle key itself.
    pub fn observe_key(&self, code: KeyCode, edge: KeyEdge) -> Result<ToggleOutcome, ForwardError> {
        lock(&self.modifiers, "modifiers")?.update(code, edge);
        Ok(lock(&self.toggle, "toggle")?.observe(code, edge))
    }

    pub fn modifiers(&self) -> Result<ModifierState, ForwardError> {
        Ok(*lock(&self.modifiers, "modifiers")?)
    }

    pub fn offer_move(&self, dx: i32, dy: i32, now: Instant) -> Result<Option<(i32, i32)>, ForwardError> {
        Ok(lock(&self.limiter, "rate limiter")?.offer(dx, dy, now))
    }

    pub fn flush_move(&self, now: Instant) -> Result<Option<(i32, i32)>, ForwardError> {
        Ok(lock(&self.limiter, "rate limiter")?.flush(now))
    }

    /// Drops any held-back pointer motion.
    pub fn reset_motion(&self) -> Result<(), ForwardError> {
        lock(&self.limiter, "rate limiter")?.reset();
        Ok(())
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> Result<MutexGuard<'a, T>, ForwardError> {
    mutex.lock().map_err(|_| ForwardError::StatePoisoned(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ForwardContext {
        ForwardContext::new(KeyCode::Backquote, Duration::from_millis(16))
    }

    #[test]
    fn test_context_starts_local_with_no_modifiers() {
        let ctx = context();
        assert_eq!(ctx.mode(), Mode::Local);
        assert_eq!(ctx.modifiers().unwrap(), ModifierState::default());
    }

    #[test]
    fn test_observe_key_updates_modifiers_before_toggle() {
        // Arrange
        let ctx = context();

        // Act
        let outcome = ctx.observe_key(KeyCode::ShiftLeft, KeyEdge::Down).unwrap();

        // Assert
        assert_eq!(outcome, ToggleOutcome::PassThrough);
        assert!(ctx.modifiers().unwrap().shift);
    }

    #[test]
    fn test_observe_key_reports_toggle_outcomes() {
        let ctx = context();
        assert_eq!(ctx.observe_key(KeyCode::Backquote, KeyEdge::Down).unwrap(), ToggleOutcome::Consumed);
        assert_eq!(ctx.observe_key(KeyCode::Backquote, KeyEdge::Up).unwrap(), ToggleOutcome::Fired);
    }

    #[test]
    fn test_reset_motion_clears_pending() {
        let ctx = context();
        let t0 = Instant::now();
        ctx.offer_move(1, 0, t0).unwrap();
        ctx.offer_move(2, 0, t0 + Duration::from_millis(1)).unwrap();

        ctx.reset_motion().unwrap();

        assert_eq!(ctx.flush_move(t0 + Duration::from_millis(100)).unwrap(), None);
    }
}
