use serde::{Deserialize, Serialize};

/// Dashboard counters for the admin surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_tracks: i64,
    pub total_ads: i64,
    pub pending_redemptions: i64,
}
