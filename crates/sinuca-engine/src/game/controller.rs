//! Aim, power and shot state machine.

use glam::Vec2;
use thiserror::Error;

use crate::core::ball::Ball;

/// Power slider range is [0, MAX_POWER].
pub const MAX_POWER: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    /// Accepting aim, power and trigger input.
    Aiming,
    /// Cue ball struck; waiting for every ball to stop.
    ShotInFlight,
    /// Motion just ended; left on the same poll.
    Resolving,
}

/// Why an aim or shot input was refused. Refused input is dropped, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShotRejected {
    #[error("balls are still moving")]
    BallsInMotion,
    #[error("the cue ball is off the table")]
    CueBallPocketed,
    #[error("a shot is already in flight")]
    NotAiming,
    #[error("the game is over")]
    GameOver,
}

/// Result of an accepted trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// Cue ball velocity was set.
    Fired { velocity: Vec2 },
    /// Power was zero; nothing happened.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotController {
    phase: ShotPhase,
    /// Radians, table coordinates (0 = +x, y grows downward on screen).
    aim_angle: f32,
    power: f32,
    shot_scale: f32,
    /// Pointer went down while aiming; released pointer fires.
    armed: bool,
}

impl ShotController {
    pub fn new(shot_scale: f32) -> Self {
        Self {
            phase: ShotPhase::Aiming,
            aim_angle: 0.0,
            power: 0.0,
            shot_scale,
            armed: false,
        }
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn aim_angle(&self) -> f32 {
        self.aim_angle
    }

    pub fn aim_direction(&self) -> Vec2 {
        Vec2::from_angle(self.aim_angle)
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    /// Back to a fresh aiming state (new rack).
    pub fn reset(&mut self) {
        *self = Self::new(self.shot_scale);
    }

    fn ensure_can_aim(&self, cue: &Ball, moving: bool) -> Result<(), ShotRejected> {
        if self.phase != ShotPhase::Aiming {
            return Err(ShotRejected::NotAiming);
        }
        if moving {
            return Err(ShotRejected::BallsInMotion);
        }
        if !cue.active {
            return Err(ShotRejected::CueBallPocketed);
        }
        Ok(())
    }

    /// Point the cue from the cue ball toward `pointer`. Returns the new angle.
    /// A pointer exactly on the cue ball center keeps the previous angle.
    pub fn aim_at(&mut self, pointer: Vec2, cue: &Ball, moving: bool) -> Result<f32, ShotRejected> {
        self.ensure_can_aim(cue, moving)?;
        let delta = pointer - cue.pos;
        if delta != Vec2::ZERO {
            self.aim_angle = delta.y.atan2(delta.x);
        }
        Ok(self.aim_angle)
    }

    /// Absolute power from a slider. Clamped to [0, 100]; NaN is ignored.
    pub fn set_power(&mut self, value: f32) -> Result<f32, ShotRejected> {
        if self.phase != ShotPhase::Aiming {
            return Err(ShotRejected::NotAiming);
        }
        if !value.is_nan() {
            self.power = value.clamp(0.0, MAX_POWER);
        }
        Ok(self.power)
    }

    /// Relative power from +/- buttons.
    pub fn adjust_power(&mut self, delta: f32) -> Result<f32, ShotRejected> {
        self.set_power(self.power + delta)
    }

    /// Pointer down: arm the shot.
    pub fn arm(&mut self, cue: &Ball, moving: bool) -> Result<(), ShotRejected> {
        self.ensure_can_aim(cue, moving)?;
        self.armed = true;
        Ok(())
    }

    /// Pointer up: returns whether a shot was armed, and disarms.
    pub fn release(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    /// Strike the cue ball at the current angle and power.
    ///
    /// Rejected while balls move, with the cue ball pocketed, or mid-shot; a
    /// rejected trigger leaves every velocity untouched. Zero power is a
    /// silent no-op.
    pub fn trigger(&mut self, cue: &mut Ball, moving: bool) -> Result<ShotOutcome, ShotRejected> {
        self.ensure_can_aim(cue, moving)?;
        self.armed = false;
        if self.power <= 0.0 {
            return Ok(ShotOutcome::Ignored);
        }
        let velocity = self.aim_direction() * (self.power * self.shot_scale);
        cue.vel = velocity;
        self.phase = ShotPhase::ShotInFlight;
        Ok(ShotOutcome::Fired { velocity })
    }

    /// Called once per step with the physics motion flag. Returns true on the
    /// step where an in-flight shot comes to rest; the controller passes
    /// through `Resolving` and is back to `Aiming` when this returns.
    pub fn poll(&mut self, any_active: bool) -> bool {
        if self.phase != ShotPhase::ShotInFlight || any_active {
            return false;
        }
        self.phase = ShotPhase::Resolving;
        log::debug!("shot resolved, aiming again");
        self.phase = ShotPhase::Aiming;
        true
    }

    /// Guide line from the cue ball along the aim, for the renderer.
    /// None unless aiming with the cue ball on the table.
    pub fn aim_guide(&self, cue: &Ball, length: f32) -> Option<(Vec2, Vec2)> {
        if self.phase != ShotPhase::Aiming || !cue.active {
            return None;
        }
        Some((cue.pos, cue.pos + self.aim_direction() * length))
    }
}
