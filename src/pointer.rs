//! Pointer lock handling.
//!
//! Browsers (and some compositors) refuse to re-lock the pointer right after
//! the user left a lock. A refused request is retried exactly once after
//! `pointer_retry_delay`; further refusals are logged and dropped until the
//! next explicit request.

use crate::config::Config;
use crate::error::PointerLockError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exclusive pointer capture provided by the platform.
///
/// `request_lock` only *asks*; the grant arrives later as
/// [`InputKind::PointerLockChanged`](crate::event::InputKind::PointerLockChanged).
pub trait PointerCapture {
    fn request_lock(&mut self) -> Result<(), PointerLockError>;
    fn exit_lock(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Requested,
    Locked,
    RetryPending { at: Instant },
}

#[derive(Debug)]
pub struct PointerLock {
    state: LockState,
    retry_delay: Duration,
    retry_used: bool,
}

impl PointerLock {
    pub fn new(config: &Config) -> Self {
        Self {
            state: LockState::Unlocked,
            retry_delay: config.pointer_retry_delay(),
            retry_used: false,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Asks the platform for a lock. Does nothing while already locked.
    pub fn request(&mut self, now: Instant, capture: &mut dyn PointerCapture) {
        if self.state == LockState::Locked {
            return;
        }
        self.retry_used = false;
        self.send_request(now, capture);
    }

    pub fn release(&mut self, capture: &mut dyn PointerCapture) {
        if matches!(self.state, LockState::Locked | LockState::Requested) {
            capture.exit_lock();
        }
        self.state = LockState::Unlocked;
    }

    /// The platform refused the last request.
    pub fn on_lock_error(&mut self, now: Instant) {
        if self.state == LockState::Locked {
            return;
        }
        if self.retry_used {
            warn!("pointer lock refused again, giving up until next request");
            self.state = LockState::Unlocked;
            return;
        }
        let at = now + self.retry_delay;
        debug!(delay = ?self.retry_delay, "pointer lock refused, retrying");
        self.retry_used = true;
        self.state = LockState::RetryPending { at };
    }

    pub fn on_lock_changed(&mut self, locked: bool) {
        debug!(locked, "pointer lock changed");
        self.state = if locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        };
    }

    /// Sends a pending retry once it is due.
    pub fn tick(&mut self, now: Instant, capture: &mut dyn PointerCapture) {
        if let LockState::RetryPending { at } = self.state {
            if now >= at {
                self.send_request(now, capture);
            }
        }
    }

    fn send_request(&mut self, now: Instant, capture: &mut dyn PointerCapture) {
        match capture.request_lock() {
            Ok(()) => self.state = LockState::Requested,
            Err(err) => {
                debug!(%err, "pointer lock request failed");
                self.state = LockState::Unlocked;
                self.on_lock_error(now);
            }
        }
    }
}
