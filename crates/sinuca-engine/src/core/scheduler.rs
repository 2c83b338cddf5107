//! Caller-owned frame loop with explicit cancellation.

use std::cell::Cell;
use std::rc::Rc;

/// Shared stop flag. Clones observe the same flag; the loop is single-threaded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Runs a pure step function until its token is cancelled.
///
/// The token is checked before every iteration, so a step always completes
/// and no step runs after `cancel()` returns to the loop.
pub struct FrameLoop {
    token: CancelToken,
    frames: u64,
}

impl FrameLoop {
    pub fn new(token: CancelToken) -> Self {
        Self { token, frames: 0 }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Frames completed over the loop's lifetime.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `state = step(state)` then `on_frame(&state)`, until cancelled.
    /// Returns the last state.
    pub fn run<T, S, F>(&mut self, mut state: T, mut step: S, mut on_frame: F) -> T
    where
        S: FnMut(T) -> T,
        F: FnMut(&T),
    {
        while !self.token.is_cancelled() {
            state = step(state);
            self.frames += 1;
            on_frame(&state);
        }
        log::debug!("frame loop stopped after {} frames", self.frames);
        state
    }
}
