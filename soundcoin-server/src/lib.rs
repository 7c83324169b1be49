//! soundcoin-server/src/lib.rs

pub mod api;
pub mod config;
pub mod context;
pub mod server;

pub use config::Args;
pub use context::{Repositories, ServerContext};
pub use server::run_server;
