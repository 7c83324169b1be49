// tests/repository_tests.rs
//
// Exercises the Postgres repositories against a live database. Each test works
// on its own fresh rows so they can share one database without truncating.

use rust_decimal::Decimal;
use uuid::Uuid;

use soundcoin_common::models::{
    Ad, AdKind, AdView, LedgerEntry, NewAd, NewTrack, PayoutMethod, Profile, Redemption,
    RedemptionResolution, RedemptionStatus, Track, TrackFilter, TrackSort,
};
use soundcoin_core::{
    db::Database,
    repositories::{
        AdRepository, AdViewRepository, CoinLedgerRepository, PostgresAdRepository,
        PostgresAdViewRepository, PostgresCoinLedgerRepository, PostgresProfileRepository,
        PostgresRedemptionRepository, PostgresTrackRepository, ProfileRepository,
        RedemptionRepository, TrackRepository,
    },
    Error,
};
use soundcoin_core::test_utils::helpers::{create_test_db_pool, ensure_test_database_exists};

async fn migrated_db() -> Result<Database, Error> {
    ensure_test_database_exists().await?;
    let db = Database::from_pool(create_test_db_pool().await?);
    db.migrate().await?;
    Ok(db)
}

async fn new_profile(db: &Database) -> Result<Uuid, Error> {
    let repo = PostgresProfileRepository::new(db.pool().clone());
    let id = Uuid::new_v4();
    repo.create_profile(&Profile::new(id, &format!("{}@listener.test", id.simple()), "listener"))
        .await?;
    Ok(id)
}

fn genre_tag() -> String {
    format!("genre-{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn guarded_update_keeps_balance_and_ledger_in_step() -> Result<(), Error> {
    let db = migrated_db().await?;
    let ledger = PostgresCoinLedgerRepository::new(db.pool().clone());
    let profiles = PostgresProfileRepository::new(db.pool().clone());
    let user = new_profile(&db).await?;

    let ad_id = Uuid::new_v4();
    for _ in 0..3 {
        ledger.apply_entry(&LedgerEntry::ad_reward(user, 5, ad_id)).await?;
    }
    let overdraft = ledger
        .apply_entry(&LedgerEntry::redemption(user, 1000, Decimal::new(1, 1)))
        .await;
    assert!(matches!(overdraft, Err(Error::InsufficientFunds { balance: 15, requested: 1000 })));

    let balance = profiles.get_balance(user).await?.expect("profile exists");
    assert_eq!(balance.coins, 15);
    assert_eq!(balance.version, 3);
    assert_eq!(ledger.ledger_sum(user).await?, 15);
    assert_eq!(ledger.list_transactions(user, 10).await?.len(), 3);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn concurrent_credits_serialize_on_the_row() -> Result<(), Error> {
    let db = migrated_db().await?;
    let user = new_profile(&db).await?;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = PostgresCoinLedgerRepository::new(db.pool().clone());
        handles.push(tokio::spawn(async move {
            ledger.apply_entry(&LedgerEntry::ad_reward(user, 1, Uuid::new_v4())).await
        }));
    }
    for h in handles {
        h.await.expect("task panicked")?;
    }

    let profiles = PostgresProfileRepository::new(db.pool().clone());
    let balance = profiles.get_balance(user).await?.expect("profile exists");
    assert_eq!(balance.coins, 20);
    assert_eq!(balance.version, 20);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn ad_view_and_reward_commit_together() -> Result<(), Error> {
    let db = migrated_db().await?;
    let ads = PostgresAdRepository::new(db.pool().clone());
    let views = PostgresAdViewRepository::new(db.pool().clone());
    let user = new_profile(&db).await?;

    let ad = Ad::from_new(NewAd {
        title: "Sponsor".into(),
        kind: AdKind::Audio,
        content_url: "https://cdn.test/ad.mp3".into(),
        duration: Some(15),
        subtitle_text: None,
        coin_reward: None,
    });
    ads.create_ad(&ad).await?;
    ads.increment_impressions(ad.id).await?;
    assert_eq!(ads.get_ad(ad.id).await?.map(|a| a.impressions), Some(1));

    let view = AdView::new(user, ad.id, Some(Uuid::new_v4()), true, 1);
    let receipt = views
        .record_view(&view, Some(&LedgerEntry::ad_reward(user, 1, ad.id)))
        .await?
        .expect("a reward was applied");
    assert_eq!(receipt.balance.coins, 1);
    assert_eq!(receipt.transaction.related_ad_id, Some(ad.id));

    let stored = views.list_views_for_user(user, 5).await?;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].verified);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn redemption_debit_and_guarded_transition() -> Result<(), Error> {
    let db = migrated_db().await?;
    let ledger = PostgresCoinLedgerRepository::new(db.pool().clone());
    let redemptions = PostgresRedemptionRepository::new(db.pool().clone());
    let user = new_profile(&db).await?;
    ledger.apply_entry(&LedgerEntry::ad_reward(user, 1200, Uuid::new_v4())).await?;

    let amount = Decimal::new(1, 1);
    let pending = Redemption::pending(user, amount, 1000, PayoutMethod::Paypal, Some("p@example.com".into()));
    let receipt = redemptions
        .create_with_debit(&pending, &LedgerEntry::redemption(user, 1000, amount))
        .await?;
    assert_eq!(receipt.balance.coins, 200);

    let again = Redemption::pending(user, amount, 1000, PayoutMethod::Paypal, Some("p@example.com".into()));
    let refused = redemptions
        .create_with_debit(&again, &LedgerEntry::redemption(user, 1000, amount))
        .await;
    assert!(matches!(refused, Err(Error::InsufficientFunds { .. })));
    assert!(redemptions.get_redemption(again.id).await?.is_none(), "no row without a debit");

    let admin = Uuid::new_v4();
    let resolution = RedemptionResolution {
        status: RedemptionStatus::Approved,
        processed_by: admin,
        processed_at: chrono::Utc::now(),
        notes: Some("ok".into()),
    };
    let approved = redemptions
        .transition(pending.id, RedemptionStatus::Pending, &resolution)
        .await?
        .expect("pending row transitions");
    assert_eq!(approved.status, RedemptionStatus::Approved);
    assert_eq!(approved.amount, amount);

    let stale = redemptions
        .transition(pending.id, RedemptionStatus::Pending, &resolution)
        .await?;
    assert!(stale.is_none(), "a second approval finds no pending row");
    assert_eq!(redemptions.list_for_user(user).await?.len(), 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn track_search_filters_in_sql() -> Result<(), Error> {
    let db = migrated_db().await?;
    let repo = PostgresTrackRepository::new(db.pool().clone());
    let genre = genre_tag();

    let mk = |title: &str, duration: i32, bpm: i32, tags: Vec<String>| {
        Track::from_new(NewTrack {
            title: title.into(),
            artist: "Repo Artist".into(),
            album: None,
            duration: Some(duration),
            cover_url: None,
            audio_url: "https://cdn.test/a.mp3".into(),
            genre: genre.clone(),
            mood: "focus".into(),
            bpm: Some(bpm),
            tags,
            source: None,
            is_ai_generated: true,
        })
    };
    let slow = mk("Slow River", 300, 70, vec!["calm".into()]);
    let fast = mk("Fast Lane", 150, 160, vec!["drive".into()]);
    let hidden = mk("Hidden", 100, 100, vec![]);
    for t in [&slow, &fast, &hidden] {
        repo.create_track(t).await?;
    }
    repo.increment_plays(fast.id).await?;
    assert!(repo.set_track_active(hidden.id, false).await?);

    let by_genre = repo
        .search_tracks(&TrackFilter { genre: Some(genre.clone()), sort_by: TrackSort::Duration, ..Default::default() })
        .await?;
    let ids: Vec<_> = by_genre.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![fast.id, slow.id]);

    let by_tag = repo
        .search_tracks(&TrackFilter { genre: Some(genre.clone()), search: Some("calm".into()), ..Default::default() })
        .await?;
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, slow.id);

    let by_bpm = repo
        .search_tracks(&TrackFilter { genre: Some(genre.clone()), bpm_min: Some(120), ..Default::default() })
        .await?;
    assert_eq!(by_bpm.len(), 1);
    assert_eq!(by_bpm[0].plays, 1);

    assert!(repo.list_genres().await?.contains(&genre));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres instance (TEST_DATABASE_URL)"]
async fn track_search_treats_wildcards_literally() -> Result<(), Error> {
    let db = migrated_db().await?;
    let repo = PostgresTrackRepository::new(db.pool().clone());
    let genre = genre_tag();

    for title in ["100% Chill", "1000 Chill", "Lo_Fi Dawn", "LoXFi Dusk"] {
        let track = Track::from_new(NewTrack {
            title: title.into(),
            artist: "Literal".into(),
            album: None,
            duration: Some(200),
            cover_url: None,
            audio_url: "https://cdn.test/l.mp3".into(),
            genre: genre.clone(),
            mood: "focus".into(),
            bpm: None,
            tags: vec![],
            source: None,
            is_ai_generated: false,
        });
        repo.create_track(&track).await?;
    }

    let search = |q: &str| TrackFilter { genre: Some(genre.clone()), search: Some(q.into()), ..Default::default() };

    let percent = repo.search_tracks(&search("100%")).await?;
    assert_eq!(percent.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), vec!["100% Chill"]);

    let underscore = repo.search_tracks(&search("lo_fi")).await?;
    assert_eq!(underscore.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), vec!["Lo_Fi Dawn"]);
    Ok(())
}
