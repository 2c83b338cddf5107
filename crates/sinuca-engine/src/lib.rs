pub mod api;
pub mod bridge;
pub mod config;
pub mod core;
pub mod game;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::types::{event_kind, BallCategory, BallId, CaptureEvent, CaptureKind, GameEvent, Group, Player};
pub use bridge::protocol::ProtocolLayout;
pub use bridge::snapshot::{BallInstance, SnapshotBuffer};
pub use config::{ConfigError, LoopConfig, TableConfig, TablePreset};
pub use crate::core::ball::{Ball, BallColor};
pub use crate::core::physics::{PhysicsParams, PhysicsWorld, StepReport};
pub use crate::core::scheduler::{CancelToken, FrameLoop};
pub use crate::core::table::Table;
pub use crate::core::time::FrameClock;
pub use game::controller::{ShotController, ShotOutcome, ShotPhase, ShotRejected};
pub use game::session::{step, MatchPhase, MatchSession};
pub use input::queue::{InputEvent, InputQueue};
