
// File: src/services/mod.rs

pub mod ledger_service;
pub mod ad_service;
pub mod catalog_service;
pub mod redemption_service;
pub mod admin_service;
pub mod playback_service;

pub use ledger_service::CoinLedgerService;
pub use ad_service::{AdService, AdViewOutcome};
pub use catalog_service::{CatalogFilters, TrackCatalogService};
pub use redemption_service::{RedemptionReceipt, RedemptionRequest, RedemptionService};
pub use admin_service::AdminService;
pub use playback_service::{PlaybackService, SessionSettings, StepOutcome};
