// File: soundcoin-common/src/models/track.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Seconds.
    pub duration: i32,
    pub cover_url: Option<String>,
    pub audio_url: String,
    pub genre: String,
    pub mood: String,
    pub bpm: Option<i32>,
    pub tags: Vec<String>,
    pub plays: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub is_ai_generated: bool,
    pub source: String,
    pub active: bool,
}

/// Admin input for registering a track whose media already lives in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub bpm: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_ai_generated: bool,
}

/// Uploaded tracks without a probed duration get this many seconds.
pub const DEFAULT_TRACK_DURATION_SECS: i32 = 180;

impl Track {
    pub fn from_new(new: NewTrack) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            artist: new.artist,
            album: new.album,
            duration: new.duration.unwrap_or(DEFAULT_TRACK_DURATION_SECS),
            cover_url: new.cover_url,
            audio_url: new.audio_url,
            genre: new.genre,
            mood: new.mood,
            bpm: new.bpm,
            tags: new.tags,
            plays: 0,
            likes: 0,
            created_at: Utc::now(),
            is_ai_generated: new.is_ai_generated,
            source: new.source.unwrap_or_else(|| "uploaded".to_string()),
            active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSort {
    #[default]
    Newest,
    Popular,
    Duration,
    Alphabetical,
}

impl fmt::Display for TrackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSort::Newest => write!(f, "newest"),
            TrackSort::Popular => write!(f, "popular"),
            TrackSort::Duration => write!(f, "duration"),
            TrackSort::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl FromStr for TrackSort {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(TrackSort::Newest),
            "popular" => Ok(TrackSort::Popular),
            "duration" => Ok(TrackSort::Duration),
            "alphabetical" => Ok(TrackSort::Alphabetical),
            _ => Err(format!("Unknown sort: {}", s)),
        }
    }
}

pub const DEFAULT_TRACK_LIMIT: i64 = 20;
pub const MAX_TRACK_LIMIT: i64 = 100;

/// Catalog search. Only active tracks are ever returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFilter {
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub search: Option<String>,
    pub bpm_min: Option<i32>,
    pub bpm_max: Option<i32>,
    pub duration_min: Option<i32>,
    pub duration_max: Option<i32>,
    pub sort_by: TrackSort,
    pub limit: i64,
    pub offset: i64,
}

impl Default for TrackFilter {
    fn default() -> Self {
        Self {
            genre: None,
            mood: None,
            search: None,
            bpm_min: None,
            bpm_max: None,
            duration_min: None,
            duration_max: None,
            sort_by: TrackSort::Newest,
            limit: DEFAULT_TRACK_LIMIT,
            offset: 0,
        }
    }
}

impl TrackFilter {
    /// Clamps paging into range and drops blank text filters.
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_TRACK_LIMIT);
        self.offset = self.offset.max(0);
        for field in [&mut self.genre, &mut self.mood, &mut self.search] {
            if field.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self
    }

    /// In-process equivalent of the SQL predicate.
    pub fn matches(&self, track: &Track) -> bool {
        if !track.active {
            return false;
        }
        if let Some(g) = &self.genre {
            if &track.genre != g {
                return false;
            }
        }
        if let Some(m) = &self.mood {
            if &track.mood != m {
                return false;
            }
        }
        if let Some(q) = &self.search {
            let needle = q.to_lowercase();
            let hit = track.title.to_lowercase().contains(&needle)
                || track.artist.to_lowercase().contains(&needle)
                || track.tags.iter().any(|t| t == q);
            if !hit {
                return false;
            }
        }
        let bpm = track.bpm;
        if let Some(min) = self.bpm_min {
            if bpm.is_none_or(|b| b < min) {
                return false;
            }
        }
        if let Some(max) = self.bpm_max {
            if bpm.is_none_or(|b| b > max) {
                return false;
            }
        }
        if let Some(min) = self.duration_min {
            if track.duration < min {
                return false;
            }
        }
        if let Some(max) = self.duration_max {
            if track.duration > max {
                return false;
            }
        }
        true
    }
}
