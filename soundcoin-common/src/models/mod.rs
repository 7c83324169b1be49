// File: soundcoin-common/src/models/mod.rs
pub mod profile;
pub mod track;
pub mod ad;
pub mod coin;
pub mod redemption;
pub mod stats;

pub use profile::{Profile, BalanceSnapshot};
pub use track::{Track, NewTrack, TrackFilter, TrackSort};
pub use ad::{Ad, AdKind, AdView, NewAd};
pub use coin::{CoinTransaction, TransactionKind, LedgerEntry, LedgerReceipt};
pub use redemption::{Redemption, RedemptionStatus, PayoutMethod, RedemptionResolution};
pub use stats::AdminStats;
