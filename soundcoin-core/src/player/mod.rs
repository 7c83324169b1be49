pub mod session;

pub use session::{Decision, PlayerSession, PlayerState, RepeatMode, Step};
