//! Shared snapshot layout read by the JS renderer.
//! Must stay in sync with the TypeScript `protocol.ts` on the host side.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Balls:  max_balls × 12 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Capacities are written into the header once per snapshot, so the host
//! computes section offsets from the header alone.

use crate::api::types::GameEvent;
use crate::bridge::snapshot::BallInstance;
use crate::core::ball::BALLS;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_MAX_BALLS: usize = 2;
pub const HEADER_BALL_COUNT: usize = 3;
pub const HEADER_MAX_EVENTS: usize = 4;
pub const HEADER_EVENT_COUNT: usize = 5;
pub const HEADER_TABLE_WIDTH: usize = 6;
pub const HEADER_TABLE_HEIGHT: usize = 7;
pub const HEADER_CUSHION: usize = 8;
pub const HEADER_POCKET_RADIUS: usize = 9;
pub const HEADER_PLAYER: usize = 10;
pub const HEADER_PHASE: usize = 11;
pub const HEADER_BALLS_IN_MOTION: usize = 12;
pub const HEADER_POWER: usize = 13;
pub const HEADER_AIM_ANGLE: usize = 14;
pub const HEADER_BALLS_REMAINING: usize = 15;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per ball instance (wire format, fixed).
pub const BALL_FLOATS: usize = BallInstance::FLOATS;

/// Floats per game event: kind, a, b, c (wire format, fixed).
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Default capacities: one slot per ball of a full rack, and enough event
/// slots for a frame in which every ball drops.
pub const DEFAULT_MAX_BALLS: usize = BALLS.len();
pub const DEFAULT_MAX_EVENTS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_balls: usize,
    pub max_events: usize,

    /// Size of the ball section in floats.
    pub ball_data_floats: usize,
    /// Size of the event section in floats.
    pub event_data_floats: usize,

    /// Offset (in floats) where ball data begins.
    pub ball_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    pub buffer_total_floats: usize,
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_balls: usize, max_events: usize) -> Self {
        let ball_data_floats = max_balls * BALL_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let ball_data_offset = HEADER_FLOATS;
        let event_data_offset = ball_data_offset + ball_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_balls,
            max_events,
            ball_data_floats,
            event_data_floats,
            ball_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }
}

impl Default for ProtocolLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BALLS, DEFAULT_MAX_EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_fits_a_full_rack() {
        let layout = ProtocolLayout::default();
        assert_eq!(layout.max_balls, 16);
        assert_eq!(layout.ball_data_floats, 16 * 12);
        assert_eq!(layout.event_data_floats, 64 * 4);
        assert_eq!(layout.buffer_total_floats, 16 + 16 * 12 + 64 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(10, 20);
        assert_eq!(layout.ball_data_offset, HEADER_FLOATS);
        assert_eq!(layout.event_data_offset, layout.ball_data_offset + layout.ball_data_floats);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + layout.event_data_floats);
    }

    #[test]
    fn header_indices_are_distinct_and_in_range() {
        let mut fields = [
            HEADER_FRAME_COUNTER,
            HEADER_PROTOCOL_VERSION,
            HEADER_MAX_BALLS,
            HEADER_BALL_COUNT,
            HEADER_MAX_EVENTS,
            HEADER_EVENT_COUNT,
            HEADER_TABLE_WIDTH,
            HEADER_TABLE_HEIGHT,
            HEADER_CUSHION,
            HEADER_POCKET_RADIUS,
            HEADER_PLAYER,
            HEADER_PHASE,
            HEADER_BALLS_IN_MOTION,
            HEADER_POWER,
            HEADER_AIM_ANGLE,
            HEADER_BALLS_REMAINING,
        ];
        fields.sort_unstable();
        for (expected, field) in fields.iter().enumerate() {
            assert_eq!(*field, expected, "header fields must cover 0..{}", HEADER_FLOATS);
        }
    }
}
