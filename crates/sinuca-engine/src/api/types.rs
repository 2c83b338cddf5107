use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Ball identity: 0 is the cue ball, 1-15 are the numbered balls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u8);

impl BallId {
    pub const CUE: BallId = BallId(0);
    pub const EIGHT: BallId = BallId(8);

    pub fn is_cue(self) -> bool {
        self.0 == 0
    }
}

/// What a ball counts as. Decides how its capture is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallCategory {
    Cue,
    Solid,
    Stripe,
    Eight,
}

impl BallCategory {
    /// Numeric code written into the render snapshot.
    pub fn code(self) -> f32 {
        match self {
            BallCategory::Cue => 0.0,
            BallCategory::Solid => 1.0,
            BallCategory::Stripe => 2.0,
            BallCategory::Eight => 3.0,
        }
    }
}

/// Group a player is shooting at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    #[default]
    Unassigned,
    Solids,
    Stripes,
}

impl Group {
    /// The group a scoring capture of `category` belongs to.
    pub fn of(category: BallCategory) -> Option<Group> {
        match category {
            BallCategory::Solid => Some(Group::Solids),
            BallCategory::Stripe => Some(Group::Stripes),
            BallCategory::Cue | BallCategory::Eight => None,
        }
    }

    pub fn opposite(self) -> Group {
        match self {
            Group::Solids => Group::Stripes,
            Group::Stripes => Group::Solids,
            Group::Unassigned => Group::Unassigned,
        }
    }
}

/// Acting player. Two-player matches only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Player {
    #[default]
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 1 or 2, as shown to users.
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// How a pocket capture is classified for the rules layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// The cue ball went down.
    Foul,
    /// The eight ball went down; the match ends.
    GameEnding,
    /// A solid or stripe went down.
    Scoring,
}

impl CaptureKind {
    pub fn classify(category: BallCategory) -> Self {
        match category {
            BallCategory::Cue => CaptureKind::Foul,
            BallCategory::Eight => CaptureKind::GameEnding,
            BallCategory::Solid | BallCategory::Stripe => CaptureKind::Scoring,
        }
    }
}

/// Emitted by the physics step when a ball drops into a pocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureEvent {
    pub ball: BallId,
    pub category: BallCategory,
    /// Index into `Table::pockets`.
    pub pocket: usize,
}

impl CaptureEvent {
    pub fn kind(&self) -> CaptureKind {
        CaptureKind::classify(self.category)
    }
}

/// Game event kinds written into `GameEvent::kind`.
pub mod event_kind {
    /// Scoring capture. a = ball number, b = pocket index.
    pub const BALL_POCKETED: f32 = 1.0;
    /// Cue ball captured. a = pocket index.
    pub const CUE_SCRATCH: f32 = 2.0;
    /// Eight ball captured. a = pocket index, b = shooter (1|2).
    pub const EIGHT_POCKETED: f32 = 3.0;
    /// a = new acting player (1|2).
    pub const TURN_CHANGED: f32 = 4.0;
    /// a = object balls still on the table.
    pub const BALLS_REMAINING: f32 = 5.0;
    /// a = 1.0 while any ball is moving, 0.0 once everything rests.
    pub const MOTION_CHANGED: f32 = 6.0;
    /// a = `MatchPhase::code`.
    pub const PHASE_CHANGED: f32 = 7.0;
}

/// A game event communicated from Rust to the page.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32) -> Self {
        Self { kind, a, b: 0.0, c: 0.0 }
    }

    /// Wire form of a capture.
    pub fn from_capture(capture: &CaptureEvent, shooter: Player) -> Self {
        match capture.kind() {
            CaptureKind::Foul => GameEvent::new(event_kind::CUE_SCRATCH, capture.pocket as f32),
            CaptureKind::GameEnding => GameEvent {
                kind: event_kind::EIGHT_POCKETED,
                a: capture.pocket as f32,
                b: shooter.number() as f32,
                c: 0.0,
            },
            CaptureKind::Scoring => GameEvent {
                kind: event_kind::BALL_POCKETED,
                a: capture.ball.0 as f32,
                b: capture.pocket as f32,
                c: 0.0,
            },
        }
    }
}
