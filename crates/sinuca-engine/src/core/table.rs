use glam::Vec2;

use crate::config::TableConfig;

/// Number of pockets on an 8-ball table.
pub const POCKET_COUNT: usize = 6;

/// Static table geometry. Pure data; read by the physics step and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub width: f32,
    pub height: f32,
    pub cushion: f32,
    /// Corner pockets first (top-left, top-right, bottom-left, bottom-right),
    /// then the side pockets (top, bottom).
    pub pockets: [Vec2; POCKET_COUNT],
    pub pocket_radius: f32,
}

impl Table {
    pub fn new(width: f32, height: f32, cushion: f32, pocket_radius: f32) -> Self {
        let min = Vec2::splat(cushion);
        let max = Vec2::new(width - cushion, height - cushion);
        let mid_x = width / 2.0;
        Self {
            width,
            height,
            cushion,
            pockets: [
                Vec2::new(min.x, min.y),
                Vec2::new(max.x, min.y),
                Vec2::new(min.x, max.y),
                Vec2::new(max.x, max.y),
                Vec2::new(mid_x, min.y),
                Vec2::new(mid_x, max.y),
            ],
            pocket_radius,
        }
    }

    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.table_width, config.table_height, config.cushion, config.pocket_radius)
    }

    /// Top-left corner of the playing rectangle (inner cushion line).
    pub fn play_min(&self) -> Vec2 {
        Vec2::splat(self.cushion)
    }

    /// Bottom-right corner of the playing rectangle.
    pub fn play_max(&self) -> Vec2 {
        Vec2::new(self.width - self.cushion, self.height - self.cushion)
    }

    pub fn play_size(&self) -> Vec2 {
        self.play_max() - self.play_min()
    }

    /// Clamp a ball center so its edge stays inside the playing rectangle.
    pub fn clamp_center(&self, pos: Vec2, radius: f32) -> Vec2 {
        let lo = self.play_min() + Vec2::splat(radius);
        let hi = self.play_max() - Vec2::splat(radius);
        pos.clamp(lo, hi)
    }
}
