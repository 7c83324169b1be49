//! src/eventbus/mod.rs
//!
//! In-process event bus. Each subscriber owns a bounded MPSC queue. Balance
//! changes additionally go to per-user watch channels, which hold only the
//! newest snapshot and therefore never overflow.

use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;
use soundcoin_common::models::{BalanceSnapshot, Redemption};

#[derive(Debug, Clone)]
pub enum CoinEvent {
    /// A committed balance mutation.
    BalanceChanged(BalanceSnapshot),

    RedemptionCreated(Redemption),
    RedemptionResolved(Redemption),
}

impl CoinEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CoinEvent::BalanceChanged(_) => "balance_changed",
            CoinEvent::RedemptionCreated(_) => "redemption_created",
            CoinEvent::RedemptionResolved(_) => "redemption_resolved",
        }
    }
}

type BalanceWatch = watch::Sender<Option<BalanceSnapshot>>;

/// Publishing never waits on a slow subscriber: a full queue drops the
/// event for that subscriber only, and closed queues are pruned.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<CoinEvent>>>>,
    balances: Arc<DashMap<Uuid, BalanceWatch>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

const DEFAULT_BUFFER_SIZE: usize = 256;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            balances: Arc::new(DashMap::new()),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<CoinEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Follows one user's balance. The receiver starts at `None` unless a
    /// change was already published while someone else was watching.
    /// Intermediate versions may be skipped; the newest one never is.
    pub fn watch_balance(&self, user_id: Uuid) -> watch::Receiver<Option<BalanceSnapshot>> {
        self.balances.retain(|_, tx| tx.receiver_count() > 0);
        self.balances
            .entry(user_id)
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    pub fn balance_watch_count(&self) -> usize {
        self.balances.len()
    }

    pub async fn publish(&self, event: CoinEvent) {
        if self.is_shutdown() {
            debug!("event bus shut down; dropping {}", event.event_type());
            return;
        }
        let mut subs = self.subscribers.lock().await;
        subs.retain(|s| !s.is_closed());
        for s in subs.iter() {
            if let Err(mpsc::error::TrySendError::Full(_)) = s.try_send(event.clone()) {
                warn!("subscriber queue full; dropped {}", event.event_type());
            }
        }
    }

    pub async fn publish_balance(&self, snapshot: BalanceSnapshot) {
        if self.is_shutdown() {
            debug!("event bus shut down; dropping balance for {}", snapshot.user_id);
            return;
        }
        if let Some(tx) = self.balances.get(&snapshot.user_id) {
            tx.send_if_modified(|latest| match latest {
                Some(prev) if prev.version >= snapshot.version => false,
                _ => {
                    *latest = Some(snapshot);
                    true
                }
            });
        }
        self.balances
            .remove_if(&snapshot.user_id, |_, tx| tx.receiver_count() == 0);
        self.publish(CoinEvent::BalanceChanged(snapshot)).await;
    }
}
