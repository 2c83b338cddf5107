use crate::config::LoopConfig;

/// Turns variable host frame times into whole simulation steps.
///
/// The physics has no delta-time: one step is one nominal frame. A 120 Hz
/// display therefore runs a step every other callback, and a stalled tab
/// catches up by at most `max_steps` steps per callback.
pub struct FrameClock {
    /// Seconds per step.
    step_secs: f32,
    max_steps: u32,
    /// Time not yet consumed by a whole step.
    carry: f32,
}

impl FrameClock {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            step_secs: 1.0 / config.step_rate_hz,
            max_steps: config.max_steps_per_frame,
            carry: 0.0,
        }
    }

    /// Feed one host frame. Returns how many steps to run now.
    pub fn advance(&mut self, frame_secs: f32) -> u32 {
        if !(frame_secs > 0.0) {
            return 0;
        }
        self.carry += frame_secs;
        let due = (self.carry / self.step_secs) as u32;
        if due > self.max_steps {
            // Drop the backlog rather than replaying it later
            self.carry = 0.0;
            return self.max_steps;
        }
        self.carry -= due as f32 * self.step_secs;
        due
    }

    /// Forget any partial step, so a fresh rack starts on a step boundary.
    pub fn reset(&mut self) {
        self.carry = 0.0;
    }

    pub fn step_secs(&self) -> f32 {
        self.step_secs
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&LoopConfig::default())
    }
}
