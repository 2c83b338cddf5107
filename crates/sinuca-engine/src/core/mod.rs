pub mod ball;
pub mod physics;
pub mod scheduler;
pub mod table;
pub mod time;
