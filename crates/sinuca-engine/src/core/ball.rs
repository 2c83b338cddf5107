//! Pool ball data: identities, categories, colors, and rack positions.

use glam::Vec2;

use crate::api::types::{BallCategory, BallId};
use crate::config::{TableConfig, ROW_FACTOR};

/// Display color (linear RGB, 0..1). Only the renderer reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BallColor {
    const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Static description of one ball of the set.
#[derive(Debug, Clone, Copy)]
pub struct BallDef {
    pub number: u8,
    pub category: BallCategory,
    pub color: BallColor,
}

const YELLOW: BallColor = BallColor::rgb(1.0, 0.84, 0.0);
const BLUE: BallColor = BallColor::rgb(0.0, 0.0, 0.7);
const RED: BallColor = BallColor::rgb(0.86, 0.0, 0.0);
const PURPLE: BallColor = BallColor::rgb(0.39, 0.0, 0.55);
const ORANGE: BallColor = BallColor::rgb(1.0, 0.39, 0.0);
const GREEN: BallColor = BallColor::rgb(0.0, 0.47, 0.0);
const MAROON: BallColor = BallColor::rgb(0.51, 0.12, 0.12);

/// All 16 balls, indexed by number (cue ball first).
pub const BALLS: [BallDef; 16] = [
    BallDef { number: 0, category: BallCategory::Cue, color: BallColor::rgb(1.0, 1.0, 1.0) },
    BallDef { number: 1, category: BallCategory::Solid, color: YELLOW },
    BallDef { number: 2, category: BallCategory::Solid, color: BLUE },
    BallDef { number: 3, category: BallCategory::Solid, color: RED },
    BallDef { number: 4, category: BallCategory::Solid, color: PURPLE },
    BallDef { number: 5, category: BallCategory::Solid, color: ORANGE },
    BallDef { number: 6, category: BallCategory::Solid, color: GREEN },
    BallDef { number: 7, category: BallCategory::Solid, color: MAROON },
    BallDef { number: 8, category: BallCategory::Eight, color: BallColor::rgb(0.04, 0.04, 0.04) },
    // Stripes reuse the 1-7 colors
    BallDef { number: 9, category: BallCategory::Stripe, color: YELLOW },
    BallDef { number: 10, category: BallCategory::Stripe, color: BLUE },
    BallDef { number: 11, category: BallCategory::Stripe, color: RED },
    BallDef { number: 12, category: BallCategory::Stripe, color: PURPLE },
    BallDef { number: 13, category: BallCategory::Stripe, color: ORANGE },
    BallDef { number: 14, category: BallCategory::Stripe, color: GREEN },
    BallDef { number: 15, category: BallCategory::Stripe, color: MAROON },
];

/// One ball on the table. Plain data; the physics step mutates it in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub category: BallCategory,
    /// False once pocketed. Never flips back.
    pub active: bool,
}

impl Ball {
    pub fn new(id: BallId, category: BallCategory, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            category,
            active: true,
        }
    }

    /// Build ball `number` of the standard set.
    pub fn from_def(number: u8, pos: Vec2, radius: f32) -> Self {
        let def = &BALLS[number as usize];
        Self::new(BallId(def.number), def.category, pos, radius)
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn is_moving(&self) -> bool {
        self.active && self.vel != Vec2::ZERO
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.active {
            0.5 * self.vel.length_squared()
        } else {
            0.0
        }
    }

    pub fn color(&self) -> BallColor {
        BALLS[self.id.0 as usize].color
    }
}

/// Standard 8-ball triangle. Returns positions indexed by `number - 1`.
/// The apex points LEFT toward the cue ball, rows spread RIGHT.
///
/// ```text
///  1              <- apex (row 0)
///  9   2
/// 10   8   3
/// 11   4  12   5
/// 13   6  14   7  15
/// ```
pub fn rack_positions(apex: Vec2, ball_radius: f32) -> [Vec2; 15] {
    // Tight rack with a one-unit gap so no two balls start in contact
    let gap = ball_radius * 2.0 + 1.0;
    let row_offset = gap * ROW_FACTOR;

    const ORDER: [u8; 15] = [1, 9, 2, 10, 8, 3, 11, 4, 12, 5, 13, 6, 14, 7, 15];

    let mut positions = [Vec2::ZERO; 15];
    let mut slot = 0;
    for row in 0..5usize {
        for col in 0..=row {
            let number = ORDER[slot];
            let x = apex.x + row as f32 * row_offset;
            let y = apex.y + (col as f32 - row as f32 / 2.0) * gap;
            positions[(number - 1) as usize] = Vec2::new(x, y);
            slot += 1;
        }
    }
    positions
}

/// Fresh set of 16 balls for `config`, indexed by ball number.
/// Cue ball at 25% of the playing width, rack apex at 75%, both on the center line.
pub fn rack(config: &TableConfig) -> Vec<Ball> {
    let origin = Vec2::splat(config.cushion);
    let center_y = origin.y + config.play_height() / 2.0;
    let cue_pos = Vec2::new(origin.x + config.play_width() * 0.25, center_y);
    let apex = Vec2::new(origin.x + config.play_width() * 0.75, center_y);

    let mut balls = Vec::with_capacity(BALLS.len());
    balls.push(Ball::from_def(0, cue_pos, config.ball_radius));
    for (i, pos) in rack_positions(apex, config.ball_radius).into_iter().enumerate() {
        balls.push(Ball::from_def(i as u8 + 1, pos, config.ball_radius));
    }
    balls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TablePreset;

    #[test]
    fn ball_set_categories() {
        assert_eq!(BALLS[0].category, BallCategory::Cue);
        assert!(BALLS[1..8].iter().all(|b| b.category == BallCategory::Solid));
        assert_eq!(BALLS[8].category, BallCategory::Eight);
        assert!(BALLS[9..].iter().all(|b| b.category == BallCategory::Stripe));
        for (i, def) in BALLS.iter().enumerate() {
            assert_eq!(def.number as usize, i);
        }
    }

    #[test]
    fn rack_is_indexed_by_number() {
        let balls = rack(&TableConfig::default());
        assert_eq!(balls.len(), 16);
        for (i, ball) in balls.iter().enumerate() {
            assert_eq!(ball.id, BallId(i as u8));
            assert!(ball.active);
            assert_eq!(ball.vel, Vec2::ZERO);
        }
        assert_eq!(balls[0].pos, Vec2::new(200.0, 200.0));
        assert_eq!(balls[1].pos, Vec2::new(600.0, 200.0));
    }

    #[test]
    fn eight_sits_in_middle_of_third_row() {
        let apex = Vec2::new(600.0, 200.0);
        let positions = rack_positions(apex, 8.0);
        let eight = positions[7];
        assert_eq!(eight.y, 200.0);
        assert!((eight.x - (600.0 + 2.0 * 17.0 * ROW_FACTOR)).abs() < 1e-3);
    }

    #[test]
    fn racked_balls_do_not_overlap() {
        for preset in TablePreset::ALL {
            let balls = rack(&preset.config());
            for i in 0..balls.len() {
                for j in (i + 1)..balls.len() {
                    let d = balls[i].pos.distance(balls[j].pos);
                    assert!(
                        d >= balls[i].radius + balls[j].radius,
                        "{:?}: balls {} and {} overlap (d={})",
                        preset, i, j, d
                    );
                }
            }
        }
    }

    #[test]
    fn inactive_ball_has_no_energy() {
        let mut ball = Ball::from_def(3, Vec2::ZERO, 8.0).with_velocity(Vec2::new(3.0, 4.0));
        assert_eq!(ball.kinetic_energy(), 12.5);
        ball.active = false;
        assert_eq!(ball.kinetic_energy(), 0.0);
        assert!(!ball.is_moving());
    }
}
