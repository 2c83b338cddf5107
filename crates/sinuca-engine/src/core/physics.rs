use glam::Vec2;

use crate::api::types::CaptureEvent;
use crate::config::TableConfig;
use crate::core::ball::Ball;
use crate::core::table::Table;

/// Below this center distance two balls count as coincident.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Overlap left after a step's separation passes is at most about this much.
pub const OVERLAP_TOLERANCE: f32 = 0.01;

/// Upper bound on positional separation passes per step.
const MAX_SEPARATION_PASSES: usize = 128;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Scalars applied on every step. One global pair for all balls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub friction: f32,
    pub restitution: f32,
    pub stop_epsilon: f32,
}

impl From<&TableConfig> for PhysicsParams {
    fn from(config: &TableConfig) -> Self {
        Self {
            friction: config.friction,
            restitution: config.restitution,
            stop_epsilon: config.stop_epsilon,
        }
    }
}

/// Outcome of a ball-ball contact test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Not touching.
    None,
    /// Overlapping but already moving apart; only pushed out of overlap.
    Separated,
    /// Normal velocity components were swapped and the overlap removed.
    Exchanged,
}

/// What one simulation step produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// True iff some active ball still has non-zero velocity.
    pub any_active: bool,
    /// Balls captured during this step, in ball order.
    pub captures: Vec<CaptureEvent>,
    /// Pairs whose velocities were exchanged.
    pub contacts: u32,
}

// ---------------------------------------------------------------------------
// Per-ball and per-pair functions
// ---------------------------------------------------------------------------

/// Explicit Euler step with constant linear damping.
/// `pos += vel`, then `vel *= friction`; speeds under `stop_epsilon` snap to zero.
pub fn integrate(ball: &mut Ball, friction: f32, stop_epsilon: f32) {
    ball.pos += ball.vel;
    ball.vel *= friction;
    if ball.vel.length() < stop_epsilon {
        ball.vel = Vec2::ZERO;
    }
}

/// Bounce off the cushions, each axis on its own so a corner hit flips both.
/// Returns true if the ball touched a cushion.
pub fn reflect_walls(ball: &mut Ball, table: &Table, restitution: f32) -> bool {
    let lo = table.play_min() + Vec2::splat(ball.radius);
    let hi = table.play_max() - Vec2::splat(ball.radius);
    let mut hit = false;

    if ball.pos.x < lo.x {
        ball.pos.x = lo.x;
        if ball.vel.x < 0.0 {
            ball.vel.x = -ball.vel.x * restitution;
        }
        hit = true;
    } else if ball.pos.x > hi.x {
        ball.pos.x = hi.x;
        if ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x * restitution;
        }
        hit = true;
    }

    if ball.pos.y < lo.y {
        ball.pos.y = lo.y;
        if ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y * restitution;
        }
        hit = true;
    } else if ball.pos.y > hi.y {
        ball.pos.y = hi.y;
        if ball.vel.y > 0.0 {
            ball.vel.y = -ball.vel.y * restitution;
        }
        hit = true;
    }

    hit
}

/// Equal-mass elastic collision along the line of centers.
///
/// Parallel components are swapped, perpendicular components are kept. Pairs
/// already separating keep their velocities. Any overlap is split evenly
/// between the two balls.
pub fn resolve_collision(a: &mut Ball, b: &mut Ball) -> Contact {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;
    if dist >= min_dist {
        return Contact::None;
    }

    let normal = contact_normal(delta, dist);

    let a_n = a.vel.dot(normal);
    let b_n = b.vel.dot(normal);
    let closing = b_n - a_n < 0.0;
    if closing {
        a.vel += normal * (b_n - a_n);
        b.vel += normal * (a_n - b_n);
    }

    separate(a, b);

    if closing {
        Contact::Exchanged
    } else {
        Contact::Separated
    }
}

/// Push an overlapping pair apart by half the overlap each, along the line of
/// centers. Velocities are untouched. Returns the overlap that was removed.
pub fn separate(a: &mut Ball, b: &mut Ball) -> f32 {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let overlap = a.radius + b.radius - dist;
    if overlap <= 0.0 {
        return 0.0;
    }
    let push = contact_normal(delta, dist) * (overlap * 0.5);
    a.pos -= push;
    b.pos += push;
    overlap
}

/// Unit vector from `a` to `b`; coincident centers fall back to +x.
fn contact_normal(delta: Vec2, dist: f32) -> Vec2 {
    if dist > COINCIDENT_EPSILON {
        delta / dist
    } else {
        Vec2::X
    }
}

/// Drop `ball` into the first pocket whose capture radius contains its center.
/// Returns the pocket index. Inactive balls are never tested.
pub fn test_pocket_capture(ball: &mut Ball, table: &Table) -> Option<usize> {
    if !ball.active {
        return None;
    }
    let pocket = table
        .pockets
        .iter()
        .position(|p| ball.pos.distance(*p) < table.pocket_radius)?;
    ball.active = false;
    ball.vel = Vec2::ZERO;
    Some(pocket)
}

/// Total kinetic energy of the active balls (unit mass).
pub fn kinetic_energy(balls: &[Ball]) -> f32 {
    balls.iter().map(Ball::kinetic_energy).sum()
}

pub fn any_active(balls: &[Ball]) -> bool {
    balls.iter().any(Ball::is_moving)
}

/// Two distinct mutable elements of a slice, `i < j`.
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert!(i < j);
    let (head, tail) = balls.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// The table plus the scalars the step needs. Owns no balls; the session
/// hands its ball list to `step` once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsWorld {
    table: Table,
    params: PhysicsParams,
}

impl PhysicsWorld {
    pub fn new(table: Table, params: PhysicsParams) -> Self {
        Self { table, params }
    }

    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(Table::from_config(config), PhysicsParams::from(config))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Advance every ball by one frame: integrate, bounce off cushions,
    /// resolve ball contacts, keep everything inside the rails, then test pockets.
    ///
    /// Balls at rest when the step starts skip integration, and a pair of two
    /// untouched resting balls is not resolved. Every active ball is pocket-tested.
    ///
    /// Velocities are exchanged at most once per pair. Positions are then
    /// relaxed over repeated passes, so pushing one pair apart cannot leave a
    /// ball sunk into a third one after the step.
    ///
    /// Panics if `balls` is empty: stepping without a rack is a caller bug.
    pub fn step(&self, balls: &mut [Ball]) -> StepReport {
        assert!(!balls.is_empty(), "physics step called without a rack");

        let moving: Vec<bool> = balls.iter().map(Ball::is_moving).collect();

        for (ball, _) in balls.iter_mut().zip(&moving).filter(|(_, m)| **m) {
            integrate(ball, self.params.friction, self.params.stop_epsilon);
            reflect_walls(ball, &self.table, self.params.restitution);
        }

        // Balls that moved or were pushed this step
        let mut touched = moving.clone();
        let mut contacts = 0;
        let count = balls.len();
        for i in 0..count {
            for j in (i + 1)..count {
                if !(moving[i] || moving[j]) {
                    continue;
                }
                let (a, b) = pair_mut(balls, i, j);
                if !(a.active && b.active) {
                    continue;
                }
                let contact = resolve_collision(a, b);
                if contact == Contact::Exchanged {
                    contacts += 1;
                }
                if contact != Contact::None {
                    touched[i] = true;
                    touched[j] = true;
                }
            }
        }

        self.relax_overlaps(balls, &mut touched);

        let mut captures = Vec::new();
        for ball in balls.iter_mut() {
            if let Some(pocket) = test_pocket_capture(ball, &self.table) {
                captures.push(CaptureEvent {
                    ball: ball.id,
                    category: ball.category,
                    pocket,
                });
            }
        }

        StepReport {
            any_active: any_active(balls),
            captures,
            contacts,
        }
    }

    /// Repeat half-overlap separation over every pair with a touched ball
    /// until the worst overlap found in a pass is within `OVERLAP_TOLERANCE`.
    /// Balls are clamped inside the rails before each pass and once more at
    /// the end.
    fn relax_overlaps(&self, balls: &mut [Ball], touched: &mut [bool]) {
        let count = balls.len();
        for pass in 1..=MAX_SEPARATION_PASSES {
            self.clamp_to_rails(balls);

            let mut worst = 0.0f32;
            for i in 0..count {
                for j in (i + 1)..count {
                    if !(touched[i] || touched[j]) {
                        continue;
                    }
                    let (a, b) = pair_mut(balls, i, j);
                    if !(a.active && b.active) {
                        continue;
                    }
                    let overlap = separate(a, b);
                    if overlap > 0.0 {
                        touched[i] = true;
                        touched[j] = true;
                        worst = worst.max(overlap);
                    }
                }
            }

            if worst <= OVERLAP_TOLERANCE {
                break;
            }
            if pass == MAX_SEPARATION_PASSES {
                log::debug!("overlap of {:.3} left after {} separation passes", worst, pass);
            }
        }
        self.clamp_to_rails(balls);
    }

    fn clamp_to_rails(&self, balls: &mut [Ball]) {
        for ball in balls.iter_mut().filter(|b| b.active) {
            ball.pos = self.table.clamp_center(ball.pos, ball.radius);
        }
    }
}
