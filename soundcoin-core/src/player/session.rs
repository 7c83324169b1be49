// File: soundcoin-core/src/player/session.rs
//
// Playback state machine for one listener. No I/O happens here; the
// playback service turns `Decision`s into store side effects.

use std::fmt;
use std::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use soundcoin_common::models::{Ad, AdKind};
use crate::economy::DEFAULT_AD_INTERVAL;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    None,
    All,
    One,
}

impl RepeatMode {
    /// none -> all -> one -> none
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatMode::None => write!(f, "none"),
            RepeatMode::All => write!(f, "all"),
            RepeatMode::One => write!(f, "one"),
        }
    }
}

impl FromStr for RepeatMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RepeatMode::None),
            "all" => Ok(RepeatMode::All),
            "one" => Ok(RepeatMode::One),
            _ => Err(format!("Unknown repeat mode: {}", s)),
        }
    }
}

/// What the session wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    PlayTrack(usize),
    /// An ad is owed before `resume_index` may start.
    AdDue { resume_index: usize },
    Stop,
    /// Nothing changes (e.g. skipping past the end without repeat).
    Unchanged,
}

/// What the client should be playing, as reported over the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Track { index: usize, track_id: Uuid },
    Ad { ad: Ad, resume_index: usize },
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
struct AdSlot {
    ad: Ad,
    resume_index: usize,
}

#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub id: Uuid,
    pub user_id: Uuid,
    queue: Vec<Uuid>,
    current: Option<usize>,
    stopped: bool,
    shuffle: bool,
    repeat: RepeatMode,
    ad_mode: AdKind,
    tracks_since_ad: u32,
    ad_interval: u32,
    ad_slot: Option<AdSlot>,
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub queue: Vec<Uuid>,
    pub current_index: Option<usize>,
    pub stopped: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub ad_mode: AdKind,
    pub tracks_since_ad: u32,
    pub ad_interval: u32,
    pub playing_ad: Option<Ad>,
    pub resume_index: Option<usize>,
}

impl PlayerSession {
    pub fn new(user_id: Uuid, queue: Vec<Uuid>, ad_interval: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            queue,
            current: None,
            stopped: true,
            shuffle: false,
            repeat: RepeatMode::None,
            ad_mode: AdKind::Audio,
            tracks_since_ad: 0,
            ad_interval: if ad_interval == 0 { DEFAULT_AD_INTERVAL } else { ad_interval },
            ad_slot: None,
        }
    }

    pub fn queue(&self) -> &[Uuid] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn tracks_since_ad(&self) -> u32 {
        self.tracks_since_ad
    }

    pub fn ad_mode(&self) -> AdKind {
        self.ad_mode
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_playing_ad(&self) -> bool {
        self.ad_slot.is_some()
    }

    pub fn playing_ad(&self) -> Option<&Ad> {
        self.ad_slot.as_ref().map(|s| &s.ad)
    }

    pub fn track_at(&self, index: usize) -> Option<Uuid> {
        self.queue.get(index).copied()
    }

    /// Inserts an ad in front of `index` when one is owed.
    fn gate(&self, index: usize) -> Decision {
        if self.tracks_since_ad >= self.ad_interval && self.ad_slot.is_none() {
            Decision::AdDue { resume_index: index }
        } else {
            Decision::PlayTrack(index)
        }
    }

    /// Listener picked a queue position. Ignored while an ad plays.
    pub fn request_play(&self, index: usize) -> Decision {
        if self.ad_slot.is_some() || index >= self.queue.len() {
            return Decision::Unchanged;
        }
        self.gate(index)
    }

    /// Commits a track start.
    pub fn start_track(&mut self, index: usize) -> Option<Step> {
        let track_id = self.track_at(index)?;
        self.current = Some(index);
        self.stopped = false;
        Some(Step::Track { index, track_id })
    }

    pub fn begin_ad(&mut self, ad: Ad, resume_index: usize) -> Step {
        self.stopped = false;
        self.ad_slot = Some(AdSlot { ad: ad.clone(), resume_index });
        Step::Ad { ad, resume_index }
    }

    /// No ad was available: forgive the debt so the music keeps going.
    pub fn skip_ad_insertion(&mut self) {
        self.tracks_since_ad = 0;
    }

    pub fn stop(&mut self) -> Step {
        self.stopped = true;
        Step::Stopped
    }

    /// The media element reported `ended`.
    pub fn on_media_ended<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Decision {
        if let Some(slot) = self.ad_slot.take() {
            self.tracks_since_ad = 0;
            return Decision::PlayTrack(slot.resume_index);
        }
        if self.stopped {
            return Decision::Unchanged;
        }

        self.tracks_since_ad += 1;
        let Some(current) = self.current else {
            return Decision::Stop;
        };
        if self.repeat == RepeatMode::One {
            return self.gate(current);
        }
        match self.advance(current, rng) {
            Some(next) => self.gate(next),
            None => Decision::Stop,
        }
    }

    /// Next button. Repeat-one does not pin the skip.
    pub fn skip_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Decision {
        if self.ad_slot.is_some() || self.queue.is_empty() {
            return Decision::Unchanged;
        }
        let next = match self.current {
            Some(current) => self.advance(current, rng),
            None => Some(0),
        };
        match next {
            Some(i) => self.gate(i),
            None => Decision::Unchanged,
        }
    }

    pub fn skip_previous(&mut self) -> Decision {
        if self.ad_slot.is_some() || self.queue.is_empty() {
            return Decision::Unchanged;
        }
        let current = self.current.unwrap_or(0);
        let prev = if current == 0 {
            if self.repeat == RepeatMode::All {
                Some(self.queue.len() - 1)
            } else {
                None
            }
        } else {
            Some(current - 1)
        };
        match prev {
            Some(i) => self.gate(i),
            None => Decision::Unchanged,
        }
    }

    fn advance<R: Rng + ?Sized>(&self, current: usize, rng: &mut R) -> Option<usize> {
        let len = self.queue.len();
        if len == 0 {
            return None;
        }
        if self.shuffle {
            return Some(rng.random_range(0..len));
        }
        let next = current + 1;
        if next < len {
            Some(next)
        } else if self.repeat == RepeatMode::All {
            Some(0)
        } else {
            None
        }
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    pub fn set_ad_mode(&mut self, mode: AdKind) {
        self.ad_mode = mode;
    }

    pub fn enqueue(&mut self, track_id: Uuid) {
        self.queue.push(track_id);
    }

    /// Empties the queue; an ad already playing keeps playing but resumes nowhere.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.current = None;
        self.stopped = true;
    }

    pub fn current_step(&self) -> Step {
        if let Some(slot) = &self.ad_slot {
            return Step::Ad { ad: slot.ad.clone(), resume_index: slot.resume_index };
        }
        match self.current.and_then(|i| self.track_at(i).map(|id| (i, id))) {
            Some((index, track_id)) if !self.stopped => Step::Track { index, track_id },
            _ => Step::Stopped,
        }
    }

    pub fn state(&self) -> PlayerState {
        PlayerState {
            session_id: self.id,
            user_id: self.user_id,
            queue: self.queue.clone(),
            current_index: self.current,
            stopped: self.stopped,
            shuffle: self.shuffle,
            repeat: self.repeat,
            ad_mode: self.ad_mode,
            tracks_since_ad: self.tracks_since_ad,
            ad_interval: self.ad_interval,
            playing_ad: self.ad_slot.as_ref().map(|s| s.ad.clone()),
            resume_index: self.ad_slot.as_ref().map(|s| s.resume_index),
        }
    }
}
