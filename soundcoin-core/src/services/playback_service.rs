// File: soundcoin-core/src/services/playback_service.rs
//
// Drives `PlayerSession`s: keeps them in memory, picks ads, counts plays and
// impressions, and arms the per-ad reward timers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use soundcoin_common::models::AdKind;
use crate::player::{Decision, PlayerSession, PlayerState, RepeatMode, Step};
use crate::services::{AdService, TrackCatalogService};
use crate::tasks::spawn_ad_reward_task;
use crate::Error;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub ad_mode: Option<AdKind>,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub repeat: Option<RepeatMode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub state: PlayerState,
}

struct SessionEntry {
    session: Mutex<PlayerSession>,
    /// Parent of every reward timer this session arms.
    cancel: CancellationToken,
    /// Milliseconds since the service epoch.
    last_active_ms: AtomicU64,
}

pub struct PlaybackService {
    sessions: DashMap<Uuid, Arc<SessionEntry>>,
    catalog: Arc<TrackCatalogService>,
    ads: Arc<AdService>,
    ad_interval: u32,
    epoch: Instant,
}

impl PlaybackService {
    pub fn new(catalog: Arc<TrackCatalogService>, ads: Arc<AdService>, ad_interval: u32) -> Self {
        Self {
            sessions: DashMap::new(),
            catalog,
            ads,
            ad_interval,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn entry(&self, session_id: Uuid) -> Result<Arc<SessionEntry>, Error> {
        let entry = self
            .sessions
            .get(&session_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::NotFound(format!("player session {}", session_id)))?;
        entry.last_active_ms.store(self.now_ms(), Ordering::Relaxed);
        Ok(entry)
    }

    pub async fn open_session(
        &self,
        user_id: Uuid,
        queue: Vec<Uuid>,
        settings: SessionSettings,
    ) -> Result<PlayerState, Error> {
        for track_id in &queue {
            match self.catalog.get(*track_id).await? {
                Some(t) if t.active => {}
                _ => return Err(Error::Validation(format!("track {} is not playable", track_id))),
            }
        }

        let mut session = PlayerSession::new(user_id, queue, self.ad_interval);
        apply_settings(&mut session, &settings);
        let state = session.state();

        self.sessions.insert(
            session.id,
            Arc::new(SessionEntry {
                session: Mutex::new(session),
                cancel: CancellationToken::new(),
                last_active_ms: AtomicU64::new(self.now_ms()),
            }),
        );
        info!("player session {} opened for {}", state.session_id, user_id);
        Ok(state)
    }

    pub async fn state(&self, session_id: Uuid) -> Result<PlayerState, Error> {
        let entry = self.entry(session_id)?;
        let session = entry.session.lock().await;
        Ok(session.state())
    }

    pub async fn play(&self, session_id: Uuid, index: usize) -> Result<StepOutcome, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        if index >= session.queue().len() {
            return Err(Error::Validation(format!("index {} is outside the queue", index)));
        }
        let decision = session.request_play(index);
        self.carry_out(&entry, &mut session, decision).await
    }

    pub async fn media_ended(&self, session_id: Uuid) -> Result<StepOutcome, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        let decision = {
            let mut rng = rand::rng();
            session.on_media_ended(&mut rng)
        };
        self.carry_out(&entry, &mut session, decision).await
    }

    pub async fn skip_next(&self, session_id: Uuid) -> Result<StepOutcome, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        let decision = {
            let mut rng = rand::rng();
            session.skip_next(&mut rng)
        };
        self.carry_out(&entry, &mut session, decision).await
    }

    pub async fn skip_previous(&self, session_id: Uuid) -> Result<StepOutcome, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        let decision = session.skip_previous();
        self.carry_out(&entry, &mut session, decision).await
    }

    pub async fn update_settings(
        &self,
        session_id: Uuid,
        settings: SessionSettings,
    ) -> Result<PlayerState, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        apply_settings(&mut session, &settings);
        Ok(session.state())
    }

    pub async fn enqueue(&self, session_id: Uuid, track_id: Uuid) -> Result<PlayerState, Error> {
        match self.catalog.get(track_id).await? {
            Some(t) if t.active => {}
            _ => return Err(Error::Validation(format!("track {} is not playable", track_id))),
        }
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        session.enqueue(track_id);
        Ok(session.state())
    }

    pub async fn clear_queue(&self, session_id: Uuid) -> Result<PlayerState, Error> {
        let entry = self.entry(session_id)?;
        let mut session = entry.session.lock().await;
        session.clear_queue();
        Ok(session.state())
    }

    /// Drops the session and cancels any reward timer it still has armed.
    pub fn close_session(&self, session_id: Uuid) -> Result<(), Error> {
        let (_, entry) = self
            .sessions
            .remove(&session_id)
            .ok_or_else(|| Error::NotFound(format!("player session {}", session_id)))?;
        entry.cancel.cancel();
        info!("player session {} closed", session_id);
        Ok(())
    }

    /// Closes every session nobody has touched for `max_idle`. Returns how
    /// many were closed.
    pub fn close_idle_sessions(&self, max_idle: Duration) -> usize {
        let cutoff = self.now_ms().saturating_sub(max_idle.as_millis() as u64);
        let idle: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|e| e.value().last_active_ms.load(Ordering::Relaxed) < cutoff)
            .map(|e| *e.key())
            .collect();

        idle.into_iter()
            .filter(|id| self.close_session(*id).is_ok())
            .count()
    }

    async fn carry_out(
        &self,
        entry: &SessionEntry,
        session: &mut PlayerSession,
        decision: Decision,
    ) -> Result<StepOutcome, Error> {
        let step = match decision {
            Decision::PlayTrack(index) => self.start_track(session, index).await,
            Decision::AdDue { resume_index } => {
                match self.ads.next_ad(session.ad_mode()).await {
                    Ok(Some(ad)) => {
                        let played_track = session.current_index().and_then(|i| session.track_at(i));
                        self.ads.register_impression(ad.id).await;
                        spawn_ad_reward_task(
                            self.ads.clone(),
                            session.user_id,
                            ad.clone(),
                            played_track,
                            entry.cancel.child_token(),
                        );
                        debug!("session {}: ad {} before index {}", session.id, ad.id, resume_index);
                        session.begin_ad(ad, resume_index)
                    }
                    Ok(None) => {
                        debug!("session {}: no {} ad available", session.id, session.ad_mode());
                        session.skip_ad_insertion();
                        self.start_track(session, resume_index).await
                    }
                    Err(e) => {
                        warn!("session {}: ad lookup failed: {}", session.id, e);
                        session.skip_ad_insertion();
                        self.start_track(session, resume_index).await
                    }
                }
            }
            Decision::Stop => session.stop(),
            Decision::Unchanged => session.current_step(),
        };
        Ok(StepOutcome { step, state: session.state() })
    }

    async fn start_track(&self, session: &mut PlayerSession, index: usize) -> Step {
        match session.start_track(index) {
            Some(step) => {
                if let Step::Track { track_id, .. } = &step {
                    self.catalog.record_play_quietly(*track_id).await;
                }
                step
            }
            None => session.stop(),
        }
    }
}

fn apply_settings(session: &mut PlayerSession, settings: &SessionSettings) {
    if let Some(mode) = settings.ad_mode {
        session.set_ad_mode(mode);
    }
    if let Some(shuffle) = settings.shuffle {
        session.set_shuffle(shuffle);
    }
    if let Some(repeat) = settings.repeat {
        session.set_repeat(repeat);
    }
}
