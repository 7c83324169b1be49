// src/repositories/postgres/mod.rs

pub mod profiles;
pub mod coin_ledger;
pub mod tracks;
pub mod ads;
pub mod ad_views;
pub mod redemptions;

pub use profiles::PostgresProfileRepository;
pub use coin_ledger::PostgresCoinLedgerRepository;
pub use tracks::PostgresTrackRepository;
pub use ads::PostgresAdRepository;
pub use ad_views::PostgresAdViewRepository;
pub use redemptions::PostgresRedemptionRepository;
