// src/repositories/mod.rs

pub mod postgres;

pub use soundcoin_common::traits::repository_traits::{
    AdRepository, AdViewRepository, CoinLedgerRepository, ProfileRepository,
    RedemptionRepository, TrackRepository,
};

pub use postgres::{
    PostgresAdRepository, PostgresAdViewRepository, PostgresCoinLedgerRepository,
    PostgresProfileRepository, PostgresRedemptionRepository, PostgresTrackRepository,
};
