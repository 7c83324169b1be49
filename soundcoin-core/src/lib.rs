// src/lib.rs

pub mod db;
pub mod economy;
pub mod repositories;
pub mod auth;
pub mod http;
pub mod player;
pub mod tasks;
pub mod eventbus;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use soundcoin_common::error::Error;
pub use http::{DefaultHttpClient, HttpClient, HttpResponse};
pub use economy::{EconomyConfig, RedemptionTier};
