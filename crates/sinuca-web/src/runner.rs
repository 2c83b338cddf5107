use sinuca_engine::{
    CancelToken, FrameClock, GameEvent, InputEvent, InputQueue, LoopConfig, MatchSession, SnapshotBuffer,
    TableConfig,
};

/// Owns one match and drives it from the host's animation frames.
///
/// The browser side keeps a single `thread_local!` MatchRunner and calls the
/// free functions exported from `lib.rs`, because wasm-bindgen cannot export
/// a struct with engine types in its fields directly.
pub struct MatchRunner {
    session: MatchSession,
    input: InputQueue,
    clock: FrameClock,
    snapshot: SnapshotBuffer,
    /// Events from every step of the current tick.
    events: Vec<GameEvent>,
    token: CancelToken,
}

impl MatchRunner {
    pub fn new(session: MatchSession, loop_config: &LoopConfig) -> Self {
        let mut snapshot = SnapshotBuffer::new();
        snapshot.capture(&session, session.events());
        Self {
            session,
            input: InputQueue::new(),
            clock: FrameClock::new(loop_config),
            snapshot,
            events: Vec::with_capacity(64),
            token: CancelToken::new(),
        }
    }

    /// Build from the page's JSON table config. An empty string means the
    /// default table; a bad config is logged and replaced by the default.
    pub fn from_json(json: &str) -> Self {
        let config = if json.trim().is_empty() {
            TableConfig::default()
        } else {
            TableConfig::from_json(json).unwrap_or_else(|err| {
                log::warn!("Invalid table config ({}), using the classic table", err);
                TableConfig::default()
            })
        };
        let session = MatchSession::new(config).unwrap_or_else(|err| {
            log::warn!("Table config rejected ({}), using the classic table", err);
            MatchSession::default()
        });
        Self::new(session, &LoopConfig::default())
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Advance by `dt` seconds of wall time: run the fixed steps that are due,
    /// feeding queued input to the first of them, then refresh the snapshot.
    /// Does nothing once torn down.
    pub fn tick(&mut self, dt: f32) {
        if self.token.is_cancelled() {
            return;
        }

        let steps = self.clock.advance(dt);
        if steps == 0 {
            return;
        }

        self.events.clear();
        let mut input = self.input.drain();
        let racked = input.contains(&InputEvent::Rack);
        for _ in 0..steps {
            self.session.advance(&input);
            input.clear();
            self.events.extend_from_slice(self.session.events());
        }
        if racked {
            self.clock.reset();
        }

        self.snapshot.capture(&self.session, &self.events);
    }

    /// Stop for good. Later ticks are no-ops.
    pub fn teardown(&mut self) {
        self.token.cancel();
        log::info!("Match torn down after {} frames", self.session.frame());
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn session(&self) -> &MatchSession {
        &self.session
    }

    pub fn snapshot(&self) -> &SnapshotBuffer {
        &self.snapshot
    }

    // ---- Pointer accessors for zero-copy reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.snapshot.header_ptr()
    }

    pub fn balls_ptr(&self) -> *const f32 {
        self.snapshot.balls_ptr()
    }

    pub fn ball_count(&self) -> u32 {
        self.snapshot.ball_count()
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.snapshot.events_ptr()
    }

    pub fn event_count(&self) -> u32 {
        self.snapshot.event_count()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.snapshot.layout().buffer_total_floats as u32
    }

    pub fn table_width(&self) -> f32 {
        self.session.table().width
    }

    pub fn table_height(&self) -> f32 {
        self.session.table().height
    }

    /// `[x0, y0, x1, y1]` of the aim guide, or empty when there is none.
    pub fn aim_guide(&self, length: f32) -> Vec<f32> {
        match self.session.aim_guide(length) {
            Some((start, end)) => vec![start.x, start.y, end.x, end.y],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinuca_engine::bridge::protocol::HEADER_FRAME_COUNTER;
    use sinuca_engine::{event_kind, TablePreset};

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn bad_config_falls_back_to_classic() {
        let runner = MatchRunner::from_json("{ not json");
        assert_eq!(runner.session().config(), &TablePreset::Classic.config());

        let runner = MatchRunner::from_json(r#"{ "friction": 2.0 }"#);
        assert_eq!(runner.session().config(), &TablePreset::Classic.config());

        let runner = MatchRunner::from_json(r#"{ "preset": "arcade" }"#);
        assert_eq!(runner.table_width(), 900.0);
    }

    #[test]
    fn input_reaches_the_first_step_only() {
        let mut runner = MatchRunner::from_json("");
        runner.push_input(InputEvent::SetPower { value: 50.0 });
        runner.push_input(InputEvent::Shoot);
        // Two frames' worth of time: two steps, one shot
        runner.tick(2.0 * FRAME + 1e-4);
        assert_eq!(runner.session().shots(), 1);
        assert_eq!(runner.session().frame(), 2);
        assert!(runner.snapshot().events().iter().any(|e| e.kind == event_kind::MOTION_CHANGED));
        assert_eq!(runner.snapshot().header()[HEADER_FRAME_COUNTER], 2.0);
    }

    #[test]
    fn short_tick_keeps_input_queued() {
        let mut runner = MatchRunner::from_json("");
        runner.push_input(InputEvent::SetPower { value: 50.0 });
        runner.push_input(InputEvent::Shoot);
        runner.tick(FRAME / 4.0);
        assert_eq!(runner.session().shots(), 0);
        runner.tick(FRAME);
        assert_eq!(runner.session().shots(), 1);
    }

    #[test]
    fn rack_drops_the_partial_step() {
        let mut runner = MatchRunner::from_json("");
        runner.tick(1.5 * FRAME);
        runner.push_input(InputEvent::Rack);
        runner.tick(FRAME);
        let frame = runner.session().frame();
        // Without the reset the leftover half frame would make this a step
        runner.tick(0.6 * FRAME);
        assert_eq!(runner.session().frame(), frame);
        runner.tick(0.6 * FRAME);
        assert_eq!(runner.session().frame(), frame + 1);
    }

    #[test]
    fn teardown_stops_ticking() {
        let mut runner = MatchRunner::from_json("");
        runner.tick(FRAME + 1e-4);
        let frame = runner.session().frame();
        runner.teardown();
        assert!(runner.is_torn_down());
        runner.push_input(InputEvent::Shoot);
        runner.tick(1.0);
        assert_eq!(runner.session().frame(), frame);
    }

    #[test]
    fn aim_guide_is_four_floats_while_aiming() {
        let runner = MatchRunner::from_json("");
        assert_eq!(runner.aim_guide(120.0).len(), 4);
        assert_eq!(runner.ball_count(), 16);
    }
}
