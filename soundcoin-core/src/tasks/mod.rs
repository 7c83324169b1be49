pub mod ad_reward;
pub mod session_sweep;

pub use ad_reward::spawn_ad_reward_task;
pub use session_sweep::{spawn_session_sweep_task, DEFAULT_SWEEP_INTERVAL};
