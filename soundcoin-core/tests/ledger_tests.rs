// tests/ledger_tests.rs

use std::sync::Arc;
use uuid::Uuid;

use soundcoin_common::models::{AdKind, LedgerEntry, TransactionKind};
use soundcoin_core::{
    eventbus::{CoinEvent, EventBus},
    services::{AdService, CoinLedgerService},
    test_utils::MemoryStore,
    Error,
};

fn ledger(store: &Arc<MemoryStore>, bus: &Arc<EventBus>) -> CoinLedgerService {
    CoinLedgerService::new(store.clone(), store.clone(), bus.clone())
}

fn ad_service(store: &Arc<MemoryStore>, bus: &Arc<EventBus>) -> AdService {
    AdService::new(store.clone(), store.clone(), store.clone(), bus.clone())
}

#[tokio::test]
async fn audio_and_video_session_ads_credit_by_reward_table() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ads = ad_service(&store, &bus);
    let ledger = ledger(&store, &bus);

    let user = store.seed_profile(0).await;
    let audio = store.seed_ad(AdKind::Audio, 15, None);
    let video = store.seed_ad(AdKind::Video, 30, None);

    for _ in 0..4 {
        ads.record_session_completion(user, &audio, None).await?;
    }
    assert_eq!(ledger.get_balance(user).await?.coins, 4);

    for _ in 0..2 {
        ads.record_session_completion(user, &video, None).await?;
    }
    assert_eq!(ledger.get_balance(user).await?.coins, 4 + 6);
    assert!(ledger.verify_balance(user).await?);
    Ok(())
}

#[tokio::test]
async fn concurrent_credits_are_never_lost() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = Arc::new(ledger(&store, &bus));
    let user = store.seed_profile(0).await;
    let ad_id = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.apply(&LedgerEntry::ad_reward(user, 1, ad_id)).await
        }));
    }
    for h in handles {
        h.await.expect("task panicked")?;
    }

    let balance = ledger.get_balance(user).await?;
    assert_eq!(balance.coins, 50);
    assert_eq!(balance.version, 50);
    assert!(ledger.verify_balance(user).await?);
    Ok(())
}

#[tokio::test]
async fn overdraft_is_rejected_without_side_effects() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = ledger(&store, &bus);
    let user = store.seed_profile(500).await;

    let debit = LedgerEntry {
        user_id: user,
        amount: -1000,
        kind: TransactionKind::Redeemed,
        description: "Redemption: $0.1".into(),
        related_ad_id: None,
    };
    match ledger.apply(&debit).await {
        Err(Error::InsufficientFunds { balance, requested }) => {
            assert_eq!(balance, 500);
            assert_eq!(requested, 1000);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }

    assert_eq!(ledger.get_balance(user).await?.coins, 500);
    assert_eq!(ledger.list_transactions(user, None).await?.len(), 1, "only the seed credit");
    Ok(())
}

#[tokio::test]
async fn credit_to_unknown_profile_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = ledger(&store, &bus);

    let res = ledger.apply(&LedgerEntry::ad_reward(Uuid::new_v4(), 5, Uuid::new_v4())).await;
    assert!(matches!(res, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn zero_delta_is_a_validation_error() {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = ledger(&store, &bus);
    let user = store.seed_profile(0).await;

    let res = ledger.apply(&LedgerEntry::ad_reward(user, 0, Uuid::new_v4())).await;
    assert!(matches!(res, Err(Error::Validation(_))));
}

#[tokio::test]
async fn balance_changes_are_published() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = ledger(&store, &bus);
    let user = store.seed_profile(0).await;
    let mut rx = bus.subscribe(Some(8)).await;

    ledger.apply(&LedgerEntry::ad_reward(user, 3, Uuid::new_v4())).await?;

    match rx.recv().await {
        Some(CoinEvent::BalanceChanged(snap)) => {
            assert_eq!(snap.user_id, user);
            assert_eq!(snap.coins, 3);
        }
        other => panic!("expected BalanceChanged, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn transactions_are_listed_newest_first() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let ledger = ledger(&store, &bus);
    let user = store.seed_profile(0).await;

    for coins in 1..=3 {
        ledger.apply(&LedgerEntry::ad_reward(user, coins, Uuid::new_v4())).await?;
    }
    let txs = ledger.list_transactions(user, Some(2)).await?;
    let amounts: Vec<i64> = txs.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![3, 2]);
    assert!(txs.iter().all(|t| t.kind == TransactionKind::Earned && t.description == "Ad view reward"));
    Ok(())
}
