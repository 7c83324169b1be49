// File: soundcoin-core/src/services/catalog_service.rs

use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use soundcoin_common::models::{NewTrack, Track, TrackFilter};
use soundcoin_common::traits::repository_traits::TrackRepository;
use crate::Error;

pub const DEFAULT_ADMIN_TRACK_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogFilters {
    pub genres: Vec<String>,
    pub moods: Vec<String>,
}

pub struct TrackCatalogService {
    tracks: Arc<dyn TrackRepository>,
}

impl TrackCatalogService {
    pub fn new(tracks: Arc<dyn TrackRepository>) -> Self {
        Self { tracks }
    }

    pub async fn search(&self, filter: TrackFilter) -> Result<Vec<Track>, Error> {
        let filter = filter.normalized();
        if let (Some(min), Some(max)) = (filter.bpm_min, filter.bpm_max) {
            if min > max {
                return Err(Error::Validation("bpm_min is greater than bpm_max".into()));
            }
        }
        if let (Some(min), Some(max)) = (filter.duration_min, filter.duration_max) {
            if min > max {
                return Err(Error::Validation("duration_min is greater than duration_max".into()));
            }
        }
        self.tracks.search_tracks(&filter).await
    }

    pub async fn get(&self, track_id: Uuid) -> Result<Option<Track>, Error> {
        self.tracks.get_track(track_id).await
    }

    pub async fn filters(&self) -> Result<CatalogFilters, Error> {
        Ok(CatalogFilters {
            genres: self.tracks.list_genres().await?,
            moods: self.tracks.list_moods().await?,
        })
    }

    pub async fn record_play(&self, track_id: Uuid) -> Result<(), Error> {
        self.tracks.increment_plays(track_id).await
    }

    /// Same as `record_play` but only logs failures.
    pub async fn record_play_quietly(&self, track_id: Uuid) {
        if let Err(e) = self.tracks.increment_plays(track_id).await {
            warn!("could not count play for track {}: {}", track_id, e);
        }
    }

    pub async fn create_track(&self, new: NewTrack) -> Result<Track, Error> {
        if new.title.trim().is_empty() || new.artist.trim().is_empty() {
            return Err(Error::Validation("title and artist are required".into()));
        }
        if new.audio_url.trim().is_empty() {
            return Err(Error::Validation("audio_url is required".into()));
        }
        if new.duration.is_some_and(|d| d <= 0) {
            return Err(Error::Validation("duration must be positive".into()));
        }
        let track = Track::from_new(new);
        self.tracks.create_track(&track).await?;
        info!("registered track '{}' by {} ({})", track.title, track.artist, track.id);
        Ok(track)
    }

    pub async fn list_recent(&self) -> Result<Vec<Track>, Error> {
        self.tracks.list_recent_tracks(DEFAULT_ADMIN_TRACK_LIMIT).await
    }

    pub async fn deactivate(&self, track_id: Uuid) -> Result<(), Error> {
        if self.tracks.set_track_active(track_id, false).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("track {}", track_id)))
        }
    }
}
