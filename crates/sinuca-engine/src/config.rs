//! Named table parameters and presets.
//!
//! Every constant the simulation uses lives here, so the physics code never
//! re-derives literals and tests can run the same logic on several tables.

use std::f32::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ball;
use crate::core::table::Table;

/// Errors raised while loading or validating a table configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid table config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` = {value} is out of range ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    #[error("the rack does not fit on a {width}x{height} playing area")]
    RackDoesNotFit { width: f32, height: f32 },
    #[error("pocket radius {pocket_radius} cannot reach a ball resting in a corner (needs > {min})")]
    PocketTooSmall { pocket_radius: f32, min: f32 },
    #[error("pocket {pocket} swallows ball {ball} on its starting spot")]
    PocketCoversSpot { pocket: usize, ball: u8 },
}

/// Built-in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TablePreset {
    /// 800x400 table with no rail inset.
    #[default]
    Classic,
    /// 900x450 with a thin rail and larger balls.
    Arcade,
    /// 1000x500 with a wide rail and slow cloth.
    Tournament,
}

impl TablePreset {
    pub const ALL: [TablePreset; 3] = [TablePreset::Classic, TablePreset::Arcade, TablePreset::Tournament];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(TablePreset::Classic),
            "arcade" => Some(TablePreset::Arcade),
            "tournament" => Some(TablePreset::Tournament),
            _ => None,
        }
    }

    pub fn config(self) -> TableConfig {
        match self {
            TablePreset::Classic => TableConfig {
                table_width: 800.0,
                table_height: 400.0,
                cushion: 0.0,
                ball_radius: 8.0,
                pocket_radius: 20.0,
                friction: 0.98,
                restitution: 0.8,
                stop_epsilon: 0.1,
                shot_scale: 0.25,
            },
            TablePreset::Arcade => TableConfig {
                table_width: 900.0,
                table_height: 450.0,
                cushion: 20.0,
                ball_radius: 11.0,
                pocket_radius: 25.0,
                friction: 0.975,
                restitution: 0.8,
                stop_epsilon: 0.2,
                shot_scale: 0.3,
            },
            TablePreset::Tournament => TableConfig {
                table_width: 1000.0,
                table_height: 500.0,
                cushion: 35.0,
                ball_radius: 12.0,
                pocket_radius: 22.0,
                friction: 0.985,
                restitution: 0.85,
                stop_epsilon: 0.15,
                shot_scale: 0.2,
            },
        }
    }
}

/// Parameters of one table. Immutable for the length of a match.
/// Missing fields deserialize from the classic preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Outer table width in table units.
    pub table_width: f32,
    /// Outer table height in table units.
    pub table_height: f32,
    /// Rail thickness; the playing rectangle is inset by this much on every side.
    pub cushion: f32,
    pub ball_radius: f32,
    /// Capture radius around each pocket center.
    pub pocket_radius: f32,
    /// Per-step velocity multiplier, in (0, 1).
    pub friction: f32,
    /// Fraction of the normal speed kept after a cushion bounce, in [0, 1].
    pub restitution: f32,
    /// Speeds below this snap to zero.
    pub stop_epsilon: f32,
    /// Cue speed per unit of power (power is 0-100).
    pub shot_scale: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        TablePreset::Classic.config()
    }
}

/// JSON shape accepted by `TableConfig::from_json`: an optional preset name
/// plus optional per-field overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableConfigFile {
    #[serde(default)]
    preset: TablePreset,
    table_width: Option<f32>,
    table_height: Option<f32>,
    cushion: Option<f32>,
    ball_radius: Option<f32>,
    pocket_radius: Option<f32>,
    friction: Option<f32>,
    restitution: Option<f32>,
    stop_epsilon: Option<f32>,
    shot_scale: Option<f32>,
}

impl TableConfigFile {
    fn resolve(self) -> TableConfig {
        let base = self.preset.config();
        TableConfig {
            table_width: self.table_width.unwrap_or(base.table_width),
            table_height: self.table_height.unwrap_or(base.table_height),
            cushion: self.cushion.unwrap_or(base.cushion),
            ball_radius: self.ball_radius.unwrap_or(base.ball_radius),
            pocket_radius: self.pocket_radius.unwrap_or(base.pocket_radius),
            friction: self.friction.unwrap_or(base.friction),
            restitution: self.restitution.unwrap_or(base.restitution),
            stop_epsilon: self.stop_epsilon.unwrap_or(base.stop_epsilon),
            shot_scale: self.shot_scale.unwrap_or(base.shot_scale),
        }
    }
}

impl TableConfig {
    /// Parse `{"preset": "arcade", "friction": 0.97, ...}`. Missing fields come
    /// from the preset (classic when absent). The result is validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: TableConfigFile = serde_json::from_str(json)?;
        let config = file.resolve();
        config.validate()?;
        Ok(config)
    }

    /// Named preset lookup.
    pub fn preset(name: &str) -> Option<Self> {
        TablePreset::from_name(name).map(TablePreset::config)
    }

    /// Width of the playing rectangle inside the rails.
    pub fn play_width(&self) -> f32 {
        self.table_width - 2.0 * self.cushion
    }

    /// Height of the playing rectangle inside the rails.
    pub fn play_height(&self) -> f32 {
        self.table_height - 2.0 * self.cushion
    }

    /// Center spacing of neighbouring balls in the rack.
    pub fn rack_gap(&self) -> f32 {
        self.ball_radius * 2.0 + 1.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("table_width", self.table_width)?;
        positive("table_height", self.table_height)?;
        positive("ball_radius", self.ball_radius)?;
        positive("pocket_radius", self.pocket_radius)?;
        positive("shot_scale", self.shot_scale)?;
        if !(self.cushion >= 0.0) {
            return Err(ConfigError::OutOfRange { field: "cushion", value: self.cushion, expected: ">= 0" });
        }
        if !(self.stop_epsilon >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "stop_epsilon",
                value: self.stop_epsilon,
                expected: ">= 0",
            });
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(ConfigError::OutOfRange { field: "friction", value: self.friction, expected: "(0, 1)" });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::OutOfRange {
                field: "restitution",
                value: self.restitution,
                expected: "[0, 1]",
            });
        }

        // Rack apex sits at 75% of the playing width; five rows spread right
        // and the widest row spans four gaps vertically.
        let gap = self.rack_gap();
        let rack_right = self.play_width() * 0.75 + 4.0 * gap * ROW_FACTOR + self.ball_radius;
        let rack_half_height = 2.0 * gap + self.ball_radius;
        if self.play_width() <= 0.0
            || self.play_height() <= 0.0
            || rack_right > self.play_width()
            || rack_half_height > self.play_height() / 2.0
        {
            return Err(ConfigError::RackDoesNotFit {
                width: self.play_width(),
                height: self.play_height(),
            });
        }

        // A ball clamped into a corner sits r*sqrt(2) from the corner pocket
        let min_pocket = self.ball_radius * SQRT_2;
        if !(self.pocket_radius > min_pocket) {
            return Err(ConfigError::PocketTooSmall { pocket_radius: self.pocket_radius, min: min_pocket });
        }
        let table = Table::from_config(self);
        let clearance = self.pocket_radius + self.ball_radius;
        for spot in ball::rack(self) {
            if let Some(pocket) = table.pockets.iter().position(|p| p.distance(spot.pos) < clearance) {
                return Err(ConfigError::PocketCoversSpot { pocket, ball: spot.id.0 });
            }
        }
        Ok(())
    }
}

/// sqrt(3)/2: row spacing of an equilateral rack relative to the ball gap.
pub(crate) const ROW_FACTOR: f32 = 0.866;

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, expected: "> 0" })
    }
}

/// Frame clock settings for the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Nominal simulation steps per second. One step = one visual frame.
    pub step_rate_hz: f32,
    /// Upper bound on steps run for a single host frame.
    pub max_steps_per_frame: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            step_rate_hz: 60.0,
            max_steps_per_frame: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in TablePreset::ALL {
            let config = preset.config();
            assert!(config.validate().is_ok(), "{:?} failed validation", preset);
        }
    }

    #[test]
    fn default_is_classic() {
        assert_eq!(TableConfig::default(), TablePreset::Classic.config());
    }

    #[test]
    fn json_preset_with_override() {
        let config = TableConfig::from_json(r#"{ "preset": "arcade", "friction": 0.97 }"#).unwrap();
        assert_eq!(config.table_width, 900.0);
        assert_eq!(config.friction, 0.97);
        assert_eq!(config.ball_radius, 11.0);
    }

    #[test]
    fn empty_json_is_classic() {
        let config = TableConfig::from_json("{}").unwrap();
        assert_eq!(config, TableConfig::default());
    }

    #[test]
    fn partial_table_config_fills_from_classic() {
        let config: TableConfig = serde_json::from_str(r#"{ "ball_radius": 9.0 }"#).unwrap();
        assert_eq!(config, TableConfig { ball_radius: 9.0, ..TableConfig::default() });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_friction_of_one() {
        let err = TableConfig::from_json(r#"{ "friction": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "friction", .. }), "got {}", err);
    }

    #[test]
    fn rejects_restitution_above_one() {
        let err = TableConfig::from_json(r#"{ "restitution": 1.2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "restitution", .. }));
    }

    #[test]
    fn rejects_tiny_table() {
        let err = TableConfig::from_json(r#"{ "table_width": 100.0, "table_height": 60.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::RackDoesNotFit { .. }), "got {}", err);
    }

    #[test]
    fn rejects_pockets_too_small_for_the_corners() {
        let config = TableConfig { pocket_radius: 5.0, ..TableConfig::default() };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::PocketTooSmall { .. }), "got {}", err);

        // Exactly r*sqrt(2) still leaves a cornered ball outside the pocket
        let config = TableConfig { pocket_radius: 8.0 * SQRT_2, ..TableConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::PocketTooSmall { .. })));
    }

    #[test]
    fn rejects_pockets_over_the_starting_spots() {
        let err = TableConfig::from_json(r#"{ "pocket_radius": 250.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::PocketCoversSpot { .. }), "got {}", err);
    }

    #[test]
    fn preset_pockets_clear_the_rack() {
        for preset in TablePreset::ALL {
            let config = preset.config();
            let table = Table::from_config(&config);
            for spot in ball::rack(&config) {
                for pocket in table.pockets {
                    assert!(
                        pocket.distance(spot.pos) >= config.pocket_radius + config.ball_radius,
                        "{:?}: ball {} starts too close to a pocket",
                        preset,
                        spot.id.0
                    );
                }
            }
        }
    }

    #[test]
    fn rejects_unknown_fields_and_bad_json() {
        assert!(matches!(TableConfig::from_json(r#"{ "gravity": 9.8 }"#), Err(ConfigError::Json(_))));
        assert!(matches!(TableConfig::from_json("not json"), Err(ConfigError::Json(_))));
        assert!(matches!(TableConfig::from_json(r#"{ "preset": "snooker" }"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn preset_names() {
        assert_eq!(TablePreset::from_name("tournament"), Some(TablePreset::Tournament));
        assert_eq!(TablePreset::from_name("snooker"), None);
        assert_eq!(TableConfig::preset("arcade"), Some(TablePreset::Arcade.config()));
    }
}
