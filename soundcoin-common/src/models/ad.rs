// File: soundcoin-common/src/models/ad.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media kind of an advertisement; also the listener-selectable ad mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdKind {
    #[default]
    Audio,
    Video,
}

impl AdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdKind::Audio => "audio",
            AdKind::Video => "video",
        }
    }
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(AdKind::Audio),
            "video" => Ok(AdKind::Video),
            _ => Err(format!("Unknown ad type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AdKind,
    pub title: String,
    pub content_url: String,
    /// Nominal length in seconds; the reward timer waits this long.
    pub duration: i32,
    pub subtitle_text: Option<String>,
    pub coin_reward: Option<i32>,
    pub impressions: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_AD_DURATION_SECS: i32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAd {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AdKind,
    pub content_url: String,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub subtitle_text: Option<String>,
    #[serde(default)]
    pub coin_reward: Option<i32>,
}

impl Ad {
    pub fn from_new(new: NewAd) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: new.kind,
            title: new.title,
            content_url: new.content_url,
            duration: new.duration.unwrap_or(DEFAULT_AD_DURATION_SECS),
            subtitle_text: new.subtitle_text,
            coin_reward: new.coin_reward,
            impressions: 0,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Immutable record of one ad playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ad_id: Uuid,
    pub track_id: Option<Uuid>,
    pub viewed_at: DateTime<Utc>,
    pub completed: bool,
    pub verified: bool,
    pub coins_earned: i32,
}

impl AdView {
    pub fn new(user_id: Uuid, ad_id: Uuid, track_id: Option<Uuid>, completed: bool, coins_earned: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ad_id,
            track_id,
            viewed_at: Utc::now(),
            completed,
            verified: true,
            coins_earned,
        }
    }
}
