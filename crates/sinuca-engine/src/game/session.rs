//! Match state and the per-frame step function.

use glam::Vec2;

use crate::api::types::{event_kind, BallId, CaptureEvent, CaptureKind, GameEvent, Group, Player};
use crate::config::{ConfigError, TableConfig};
use crate::core::ball::{self, Ball};
use crate::core::physics::{self, PhysicsWorld, StepReport};
use crate::core::table::Table;
use crate::game::controller::{ShotController, ShotOutcome, ShotPhase, ShotRejected};
use crate::input::queue::InputEvent;

/// Where the match is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Before the opening shot has come to rest.
    Break,
    /// Groups not yet assigned.
    Open,
    /// Groups assigned; players alternate.
    InTurn,
    /// Reported for the step in which a shot came to rest.
    Resolving,
    /// The eight ball is down. Terminal until the next rack.
    GameOver,
}

impl MatchPhase {
    /// Numeric code for `event_kind::PHASE_CHANGED`.
    pub fn code(self) -> f32 {
        match self {
            MatchPhase::Break => 0.0,
            MatchPhase::Open => 1.0,
            MatchPhase::InTurn => 2.0,
            MatchPhase::Resolving => 3.0,
            MatchPhase::GameOver => 4.0,
        }
    }
}

/// Everything one match owns. Recreated balls on every rack; nothing outlives it.
#[derive(Debug, Clone)]
pub struct MatchSession {
    config: TableConfig,
    world: PhysicsWorld,
    /// Indexed by ball number; slot 0 is always the cue ball.
    balls: Vec<Ball>,
    controller: ShotController,
    player: Player,
    groups: [Group; 2],
    phase: MatchPhase,
    /// True iff some active ball has non-zero velocity.
    balls_in_motion: bool,
    /// Captures since the current shot was fired.
    shot_captures: Vec<CaptureEvent>,
    shot_frames: u32,
    shots: u32,
    frame: u64,
    /// Output of the most recent step.
    events: Vec<GameEvent>,
    report: StepReport,
}

impl MatchSession {
    /// Validate `config` and rack a new match.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TableConfig) -> Self {
        let mut session = Self {
            config,
            world: PhysicsWorld::from_config(&config),
            balls: Vec::new(),
            controller: ShotController::new(config.shot_scale),
            player: Player::One,
            groups: [Group::Unassigned; 2],
            phase: MatchPhase::Break,
            balls_in_motion: false,
            shot_captures: Vec::new(),
            shot_frames: 0,
            shots: 0,
            frame: 0,
            events: Vec::with_capacity(16),
            report: StepReport::default(),
        };
        session.rack();
        session
    }

    /// Build a session around an arbitrary ball layout (slot 0 must be the cue).
    /// Used for scripted scenes; the match starts in the break phase.
    pub fn from_layout(config: TableConfig, balls: Vec<Ball>) -> Result<Self, ConfigError> {
        let mut session = Self::new(config)?;
        assert_rack(&balls);
        session.balls = balls;
        session.balls_in_motion = physics::any_active(&session.balls);
        Ok(session)
    }

    // -- Accessors --

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        self.world.table()
    }

    /// Current ball list, indexed by ball number. Read by the renderer between steps.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn cue_ball(&self) -> &Ball {
        assert_rack(&self.balls);
        &self.balls[0]
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn group(&self, player: Player) -> Group {
        self.groups[player.index()]
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn shot_phase(&self) -> ShotPhase {
        self.controller.phase()
    }

    pub fn balls_in_motion(&self) -> bool {
        self.balls_in_motion
    }

    pub fn aim_angle(&self) -> f32 {
        self.controller.aim_angle()
    }

    pub fn power(&self) -> f32 {
        self.controller.power()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Events produced by the most recent step (or rack).
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Physics report of the most recent step.
    pub fn last_report(&self) -> &StepReport {
        &self.report
    }

    /// Object balls still on the table.
    pub fn balls_remaining(&self) -> u32 {
        self.balls.iter().filter(|b| b.active && !b.id.is_cue()).count() as u32
    }

    pub fn kinetic_energy(&self) -> f32 {
        physics::kinetic_energy(&self.balls)
    }

    /// Aim guide segment for the renderer, while aiming.
    pub fn aim_guide(&self, length: f32) -> Option<(Vec2, Vec2)> {
        if self.phase == MatchPhase::GameOver {
            return None;
        }
        self.controller.aim_guide(self.cue_ball(), length)
    }

    // -- Commands --

    /// Fresh rack: new balls, player one to break, groups cleared.
    pub fn rack(&mut self) {
        self.balls = ball::rack(&self.config);
        self.controller.reset();
        self.player = Player::One;
        self.groups = [Group::Unassigned; 2];
        self.balls_in_motion = false;
        self.shot_captures.clear();
        self.shot_frames = 0;
        self.shots = 0;
        self.phase = MatchPhase::Break;
        self.emit(event_kind::PHASE_CHANGED, MatchPhase::Break.code());
        self.emit(event_kind::TURN_CHANGED, self.player.number() as f32);
        self.emit(event_kind::BALLS_REMAINING, self.balls_remaining() as f32);
        log::info!("Table racked: {} balls, player {} to break", self.balls.len(), self.player.number());
    }

    /// Run one frame: apply input, step the physics, fold captures into the
    /// match, and hand control back to aiming once everything rests.
    pub fn advance(&mut self, input: &[InputEvent]) {
        assert_rack(&self.balls);
        self.events.clear();
        self.frame += 1;

        if self.phase == MatchPhase::Resolving {
            let settled = self.settled_phase();
            self.set_phase(settled);
        }

        for event in input {
            self.apply(*event);
        }

        let report = self.world.step(&mut self.balls);
        if self.controller.phase() == ShotPhase::ShotInFlight {
            self.shot_frames += 1;
        }

        for capture in &report.captures {
            self.on_capture(capture);
        }
        if !report.captures.is_empty() {
            self.emit(event_kind::BALLS_REMAINING, self.balls_remaining() as f32);
        }

        if self.balls_in_motion != report.any_active {
            self.balls_in_motion = report.any_active;
            self.emit(event_kind::MOTION_CHANGED, if report.any_active { 1.0 } else { 0.0 });
        }

        if self.controller.poll(report.any_active) {
            self.resolve_shot();
        }
        self.report = report;
    }

    fn apply(&mut self, event: InputEvent) {
        let result = match event {
            InputEvent::PointerMove { x, y } => self.aim(Vec2::new(x, y)).map(|_| ()),
            InputEvent::PointerDown { x, y } => {
                self.aim(Vec2::new(x, y)).and_then(|_| self.controller.arm(&self.balls[0], self.balls_in_motion))
            }
            InputEvent::PointerUp { .. } => {
                if self.controller.release() {
                    self.shoot()
                } else {
                    Ok(())
                }
            }
            InputEvent::SetPower { value } => self.controller.set_power(value).map(|_| ()),
            InputEvent::AdjustPower { delta } => self.controller.adjust_power(delta).map(|_| ()),
            InputEvent::Shoot => self.shoot(),
            InputEvent::Rack => {
                self.rack();
                Ok(())
            }
        };
        if let Err(reason) = result {
            match event {
                // Pointer moves arrive every frame while balls roll
                InputEvent::PointerMove { .. } => log::trace!("aim ignored: {}", reason),
                _ => log::debug!("{:?} rejected: {}", event, reason),
            }
        }
    }

    fn aim(&mut self, pointer: Vec2) -> Result<f32, ShotRejected> {
        if self.phase == MatchPhase::GameOver {
            return Err(ShotRejected::GameOver);
        }
        self.controller.aim_at(pointer, &self.balls[0], self.balls_in_motion)
    }

    fn shoot(&mut self) -> Result<(), ShotRejected> {
        if self.phase == MatchPhase::GameOver {
            return Err(ShotRejected::GameOver);
        }
        match self.controller.trigger(&mut self.balls[0], self.balls_in_motion)? {
            ShotOutcome::Fired { velocity } => {
                self.shots += 1;
                self.shot_frames = 0;
                self.shot_captures.clear();
                self.balls_in_motion = true;
                self.emit(event_kind::MOTION_CHANGED, 1.0);
                log::info!(
                    "Player {} shoots: power {:.0}, angle {:.3} rad, speed {:.2}",
                    self.player.number(),
                    self.controller.power(),
                    self.controller.aim_angle(),
                    velocity.length()
                );
            }
            ShotOutcome::Ignored => log::debug!("zero-power shot ignored"),
        }
        Ok(())
    }

    fn on_capture(&mut self, capture: &CaptureEvent) {
        self.shot_captures.push(*capture);
        self.events.push(GameEvent::from_capture(capture, self.player));

        match capture.kind() {
            CaptureKind::Foul => log::info!("Cue ball pocketed into pocket {}", capture.pocket),
            CaptureKind::GameEnding => log::info!("Eight ball pocketed into pocket {}", capture.pocket),
            CaptureKind::Scoring => {
                log::info!("Ball {} pocketed into pocket {}", capture.ball.0, capture.pocket);
                self.assign_groups(capture);
            }
        }
    }

    /// First scoring capture of an unassigned table gives the shooter that group.
    fn assign_groups(&mut self, capture: &CaptureEvent) {
        if self.group(self.player) != Group::Unassigned {
            return;
        }
        let Some(group) = Group::of(capture.category) else {
            return;
        };
        self.groups[self.player.index()] = group;
        self.groups[self.player.other().index()] = group.opposite();
        log::info!("Player {} takes {:?}", self.player.number(), group);
    }

    fn resolve_shot(&mut self) {
        log::debug!(
            "Shot {} settled after {} frames, {} captured, energy left {:.3}",
            self.shots,
            self.shot_frames,
            self.shot_captures.len(),
            self.kinetic_energy()
        );

        if self.shot_captures.iter().any(|c| c.kind() == CaptureKind::GameEnding) {
            self.set_phase(MatchPhase::GameOver);
            log::info!("Game over: eight ball down on player {}'s shot", self.player.number());
            return;
        }

        self.set_phase(MatchPhase::Resolving);
        self.player = self.player.other();
        self.emit(event_kind::TURN_CHANGED, self.player.number() as f32);
        log::info!("Player {} to shoot", self.player.number());
    }

    fn settled_phase(&self) -> MatchPhase {
        if self.groups[0] == Group::Unassigned {
            MatchPhase::Open
        } else {
            MatchPhase::InTurn
        }
    }

    fn set_phase(&mut self, phase: MatchPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(event_kind::PHASE_CHANGED, phase.code());
        }
    }

    fn emit(&mut self, kind: f32, a: f32) {
        self.events.push(GameEvent::new(kind, a));
    }
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::with_valid_config(TableConfig::default())
    }
}

/// Pure step: `state' = step(state, input)`.
pub fn step(mut session: MatchSession, input: &[InputEvent]) -> MatchSession {
    session.advance(input);
    session
}

/// A match needs a rack whose first slot is the cue ball; anything else is a bug.
fn assert_rack(balls: &[Ball]) {
    assert!(!balls.is_empty(), "match has no rack");
    assert!(balls[0].id.is_cue(), "rack slot 0 must hold the cue ball, found ball {}", balls[0].id.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BallCategory;
    use crate::config::TablePreset;

    fn settle(mut session: MatchSession) -> MatchSession {
        for _ in 0..5000 {
            session = step(session, &[]);
            if !session.balls_in_motion() {
                break;
            }
        }
        assert!(!session.balls_in_motion(), "balls never came to rest");
        session
    }

    fn has_event(session: &MatchSession, kind: f32) -> bool {
        session.events().iter().any(|e| e.kind == kind)
    }

    /// Cue ball plus one object ball on the classic table.
    fn two_ball_layout(object: u8, object_pos: Vec2) -> MatchSession {
        let config = TableConfig::default();
        let balls = vec![
            Ball::from_def(0, Vec2::new(200.0, 200.0), config.ball_radius),
            Ball::from_def(object, object_pos, config.ball_radius),
        ];
        MatchSession::from_layout(config, balls).unwrap()
    }

    #[test]
    fn new_match_is_racked_for_the_break() {
        let session = MatchSession::default();
        assert_eq!(session.balls().len(), 16);
        assert_eq!(session.phase(), MatchPhase::Break);
        assert_eq!(session.player(), Player::One);
        assert_eq!(session.group(Player::Two), Group::Unassigned);
        assert_eq!(session.balls_remaining(), 15);
        assert!(!session.balls_in_motion());
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = TableConfig { friction: 1.5, ..TableConfig::default() };
        assert!(MatchSession::new(config).is_err());
    }

    #[test]
    fn break_shot_runs_and_passes_the_turn() {
        let mut session = MatchSession::new(TablePreset::Classic.config()).unwrap();
        session = step(
            session,
            &[
                InputEvent::PointerMove { x: 600.0, y: 200.0 },
                InputEvent::SetPower { value: 100.0 },
                InputEvent::Shoot,
            ],
        );
        assert!(session.balls_in_motion());
        assert_eq!(session.shot_phase(), ShotPhase::ShotInFlight);
        assert_eq!(session.shots(), 1);

        session = settle(session);
        assert_eq!(session.shot_phase(), ShotPhase::Aiming);
        match session.phase() {
            MatchPhase::GameOver => assert_eq!(session.player(), Player::One),
            MatchPhase::Resolving => assert_eq!(session.player(), Player::Two),
            other => panic!("unexpected phase after the break: {:?}", other),
        }
    }

    #[test]
    fn shoot_while_moving_changes_nothing() {
        let mut session = MatchSession::default();
        session = step(session, &[InputEvent::SetPower { value: 60.0 }, InputEvent::Shoot]);
        assert!(session.balls_in_motion());

        let mut trial = session.clone();
        let mut reference = session;
        trial = step(trial, &[InputEvent::SetPower { value: 100.0 }, InputEvent::Shoot]);
        reference = step(reference, &[]);
        assert_eq!(trial.balls(), reference.balls());
        assert_eq!(trial.shots(), 1);
    }

    #[test]
    fn zero_power_shot_keeps_aiming() {
        let session = step(MatchSession::default(), &[InputEvent::Shoot]);
        assert!(!session.balls_in_motion());
        assert_eq!(session.shot_phase(), ShotPhase::Aiming);
        assert_eq!(session.shots(), 0);
        assert_eq!(session.player(), Player::One);
    }

    #[test]
    fn pointer_gesture_fires_on_release() {
        let mut session = MatchSession::default();
        session = step(session, &[InputEvent::SetPower { value: 40.0 }]);
        session = step(session, &[InputEvent::PointerDown { x: 600.0, y: 200.0 }]);
        assert!(!session.balls_in_motion());
        session = step(session, &[InputEvent::PointerUp { x: 600.0, y: 200.0 }]);
        assert!(session.balls_in_motion());
        assert!(session.cue_ball().vel.x > 0.0);
    }

    #[test]
    fn pointer_up_without_down_does_nothing() {
        let session = step(
            MatchSession::default(),
            &[InputEvent::SetPower { value: 40.0 }, InputEvent::PointerUp { x: 0.0, y: 0.0 }],
        );
        assert!(!session.balls_in_motion());
    }

    #[test]
    fn potting_a_solid_assigns_groups() {
        // Object ball sits right next to the top-left pocket, cue lined up behind it
        let mut session = two_ball_layout(3, Vec2::new(40.0, 40.0));
        session = step(
            session,
            &[
                InputEvent::PointerMove { x: 40.0, y: 40.0 },
                InputEvent::SetPower { value: 60.0 },
                InputEvent::Shoot,
            ],
        );
        session = settle(session);
        assert!(!session.balls()[1].active, "ball 3 should be pocketed");
        assert_eq!(session.group(Player::One), Group::Solids);
        assert_eq!(session.group(Player::Two), Group::Stripes);
        assert_eq!(session.player(), Player::Two);

        // Next step settles into InTurn
        session = step(session, &[]);
        assert_eq!(session.phase(), MatchPhase::InTurn);
    }

    #[test]
    fn potting_the_eight_ends_the_game() {
        let mut session = two_ball_layout(8, Vec2::new(40.0, 40.0));
        session = step(
            session,
            &[
                InputEvent::PointerMove { x: 40.0, y: 40.0 },
                InputEvent::SetPower { value: 60.0 },
                InputEvent::Shoot,
            ],
        );
        let mut saw_eight = has_event(&session, event_kind::EIGHT_POCKETED);
        for _ in 0..5000 {
            if !session.balls_in_motion() {
                break;
            }
            session = step(session, &[]);
            saw_eight |= has_event(&session, event_kind::EIGHT_POCKETED);
        }
        assert!(saw_eight);
        assert_eq!(session.phase(), MatchPhase::GameOver);
        assert_eq!(session.player(), Player::One);

        // Terminal: further shots are refused
        session = step(session, &[InputEvent::SetPower { value: 50.0 }, InputEvent::Shoot]);
        assert!(!session.balls_in_motion());
        assert_eq!(session.aim_guide(100.0), None);

        // A new rack starts over
        session = step(session, &[InputEvent::Rack]);
        assert_eq!(session.phase(), MatchPhase::Break);
        assert_eq!(session.balls_remaining(), 15);
    }

    #[test]
    fn scratch_is_reported_as_foul() {
        let config = TableConfig::default();
        let balls = vec![
            Ball::from_def(0, Vec2::new(60.0, 60.0), config.ball_radius),
            Ball::from_def(9, Vec2::new(400.0, 200.0), config.ball_radius),
        ];
        let mut session = MatchSession::from_layout(config, balls).unwrap();
        session = step(
            session,
            &[
                InputEvent::PointerMove { x: 0.0, y: 0.0 },
                InputEvent::SetPower { value: 50.0 },
                InputEvent::Shoot,
            ],
        );
        let mut scratched = has_event(&session, event_kind::CUE_SCRATCH);
        while session.balls_in_motion() {
            session = step(session, &[]);
            scratched |= has_event(&session, event_kind::CUE_SCRATCH);
        }
        assert!(scratched);
        assert!(!session.cue_ball().active);
        assert_eq!(session.group(Player::One), Group::Unassigned);

        // Cue ball off the table: shots are rejected
        session = step(session, &[InputEvent::SetPower { value: 50.0 }, InputEvent::Shoot]);
        assert!(!session.balls_in_motion());
        assert_eq!(session.aim_guide(50.0), None);
    }

    #[test]
    fn last_report_counts_contacts() {
        let mut session = step(MatchSession::default(), &[InputEvent::SetPower { value: 100.0 }, InputEvent::Shoot]);
        let mut contacts = session.last_report().contacts;
        while session.balls_in_motion() {
            session = step(session, &[]);
            contacts += session.last_report().contacts;
        }
        assert!(contacts > 0, "the break never touched the rack");
        assert!(!session.last_report().any_active);
    }

    #[test]
    fn rack_event_stream() {
        let session = step(MatchSession::default(), &[InputEvent::Rack]);
        assert!(has_event(&session, event_kind::PHASE_CHANGED));
        assert!(has_event(&session, event_kind::TURN_CHANGED));
        let remaining = session
            .events()
            .iter()
            .find(|e| e.kind == event_kind::BALLS_REMAINING)
            .unwrap();
        assert_eq!(remaining.a, 15.0);
    }

    #[test]
    fn capture_category_lookup() {
        let session = MatchSession::default();
        assert_eq!(session.ball(BallId::EIGHT).unwrap().category, BallCategory::Eight);
        assert!(session.ball(BallId(16)).is_none());
    }

    #[test]
    #[should_panic(expected = "cue ball")]
    fn layout_without_cue_panics() {
        let config = TableConfig::default();
        let balls = vec![Ball::from_def(1, Vec2::new(100.0, 100.0), config.ball_radius)];
        let _ = MatchSession::from_layout(config, balls);
    }
}
