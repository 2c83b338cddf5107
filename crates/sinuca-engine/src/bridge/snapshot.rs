use bytemuck::{Pod, Zeroable};

use crate::api::types::GameEvent;
use crate::bridge::protocol::*;
use crate::core::ball::Ball;
use crate::game::session::MatchSession;

/// Per-ball render data. 12 floats = 48 bytes per instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    pub id: f32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// `BallCategory::code`.
    pub category: f32,
    /// 1.0 on the table, 0.0 once pocketed.
    pub active: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub _pad0: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

impl BallInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_ball(ball: &Ball) -> Self {
        let color = ball.color();
        Self {
            id: ball.id.0 as f32,
            x: ball.pos.x,
            y: ball.pos.y,
            radius: ball.radius,
            category: ball.category.code(),
            active: if ball.active { 1.0 } else { 0.0 },
            r: color.r,
            g: color.g,
            b: color.b,
            ..Self::default()
        }
    }
}

/// Per-frame copy of everything the renderer reads: header, balls, events.
/// Rebuilt after each tick; the host reads it through raw pointers.
pub struct SnapshotBuffer {
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    balls: Vec<BallInstance>,
    events: Vec<GameEvent>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::with_layout(ProtocolLayout::default())
    }

    pub fn with_layout(layout: ProtocolLayout) -> Self {
        Self {
            header: [0.0; HEADER_FLOATS],
            balls: Vec::with_capacity(layout.max_balls),
            events: Vec::with_capacity(layout.max_events),
            layout,
        }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    /// Copy the session state. Events accumulated since the last capture
    /// (possibly over several steps) are passed in by the caller.
    pub fn capture(&mut self, session: &MatchSession, events: &[GameEvent]) {
        self.balls.clear();
        self.balls.extend(session.balls().iter().take(self.layout.max_balls).map(BallInstance::from_ball));
        if session.balls().len() > self.layout.max_balls {
            log::warn!("snapshot holds {} balls, dropping {}", self.layout.max_balls, session.balls().len() - self.layout.max_balls);
        }

        self.events.clear();
        self.events.extend(events.iter().take(self.layout.max_events).copied());
        if events.len() > self.layout.max_events {
            log::warn!("snapshot holds {} events, dropping {}", self.layout.max_events, events.len() - self.layout.max_events);
        }

        let table = session.table();
        let h = &mut self.header;
        h[HEADER_FRAME_COUNTER] = session.frame() as f32;
        h[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        h[HEADER_MAX_BALLS] = self.layout.max_balls as f32;
        h[HEADER_BALL_COUNT] = self.balls.len() as f32;
        h[HEADER_MAX_EVENTS] = self.layout.max_events as f32;
        h[HEADER_EVENT_COUNT] = self.events.len() as f32;
        h[HEADER_TABLE_WIDTH] = table.width;
        h[HEADER_TABLE_HEIGHT] = table.height;
        h[HEADER_CUSHION] = table.cushion;
        h[HEADER_POCKET_RADIUS] = table.pocket_radius;
        h[HEADER_PLAYER] = session.player().number() as f32;
        h[HEADER_PHASE] = session.phase().code();
        h[HEADER_BALLS_IN_MOTION] = if session.balls_in_motion() { 1.0 } else { 0.0 };
        h[HEADER_POWER] = session.power();
        h[HEADER_AIM_ANGLE] = session.aim_angle();
        h[HEADER_BALLS_REMAINING] = session.balls_remaining() as f32;
    }

    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    pub fn balls(&self) -> &[BallInstance] {
        &self.balls
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn ball_count(&self) -> u32 {
        self.balls.len() as u32
    }

    pub fn event_count(&self) -> u32 {
        self.events.len() as u32
    }

    // ---- Raw pointers for zero-copy reads from wasm memory ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn balls_ptr(&self) -> *const f32 {
        self.balls.as_ptr() as *const f32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.events.as_ptr() as *const f32
    }

    /// The whole snapshot flattened into `ProtocolLayout` order, unused
    /// slots zeroed.
    pub fn to_floats(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.layout.buffer_total_floats];
        out[..HEADER_FLOATS].copy_from_slice(&self.header);

        let balls: &[f32] = bytemuck::cast_slice(&self.balls);
        let start = self.layout.ball_data_offset;
        out[start..start + balls.len()].copy_from_slice(balls);

        let events: &[f32] = bytemuck::cast_slice(&self.events);
        let start = self.layout.event_data_offset;
        out[start..start + events.len()].copy_from_slice(events);
        out
    }
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
