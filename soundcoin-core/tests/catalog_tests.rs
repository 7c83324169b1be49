// tests/catalog_tests.rs

use std::sync::Arc;

use soundcoin_common::models::{NewTrack, TrackFilter, TrackSort};
use soundcoin_core::{
    eventbus::EventBus,
    services::{AdminService, RedemptionRequest, RedemptionService, TrackCatalogService},
    economy::EconomyConfig,
    test_utils::MemoryStore,
    Error,
};
use soundcoin_common::models::{AdKind, PayoutMethod};

#[tokio::test]
async fn search_filters_and_sorts_active_tracks() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let catalog = TrackCatalogService::new(store.clone());

    let long = store.seed_track("Zephyr", "ambient", 400);
    let short = store.seed_track("Aurora", "ambient", 90);
    let other = store.seed_track("Breakbeat", "dnb", 200);
    catalog.record_play(other.id).await?;
    catalog.record_play(other.id).await?;
    catalog.record_play(short.id).await?;

    let ambient = catalog
        .search(TrackFilter { genre: Some("ambient".into()), sort_by: TrackSort::Duration, ..Default::default() })
        .await?;
    let ids: Vec<_> = ambient.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![short.id, long.id]);

    let popular = catalog
        .search(TrackFilter { sort_by: TrackSort::Popular, ..Default::default() })
        .await?;
    assert_eq!(popular[0].id, other.id);

    let alpha = catalog
        .search(TrackFilter { sort_by: TrackSort::Alphabetical, limit: 2, ..Default::default() })
        .await?;
    let titles: Vec<_> = alpha.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Aurora", "Breakbeat"]);

    catalog.deactivate(long.id).await?;
    let after = catalog.search(TrackFilter::default()).await?;
    assert!(after.iter().all(|t| t.id != long.id));
    assert!(catalog.get(long.id).await?.is_some(), "deactivated tracks still resolve by id");
    Ok(())
}

#[tokio::test]
async fn inverted_ranges_are_rejected() {
    let store = Arc::new(MemoryStore::new());
    let catalog = TrackCatalogService::new(store.clone());
    let res = catalog
        .search(TrackFilter { bpm_min: Some(140), bpm_max: Some(90), ..Default::default() })
        .await;
    assert!(matches!(res, Err(Error::Validation(_))));
}

#[tokio::test]
async fn filters_list_distinct_genres_and_moods() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let catalog = TrackCatalogService::new(store.clone());
    store.seed_track("A", "jazz", 100);
    store.seed_track("B", "jazz", 100);
    store.seed_track("C", "ambient", 100);

    let filters = catalog.filters().await?;
    assert_eq!(filters.genres, vec!["ambient".to_string(), "jazz".to_string()]);
    assert_eq!(filters.moods, vec!["chill".to_string()]);
    Ok(())
}

#[tokio::test]
async fn create_track_defaults_duration_and_source() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let catalog = TrackCatalogService::new(store.clone());

    let track = catalog
        .create_track(NewTrack {
            title: "Glass".into(),
            artist: "Mira".into(),
            album: None,
            duration: None,
            cover_url: None,
            audio_url: "https://cdn.test/glass.mp3".into(),
            genre: "pop".into(),
            mood: "happy".into(),
            bpm: Some(120),
            tags: vec!["upbeat".into()],
            source: None,
            is_ai_generated: false,
        })
        .await?;
    assert_eq!(track.duration, 180);
    assert_eq!(track.source, "uploaded");
    assert_eq!(catalog.list_recent().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn admin_stats_count_everything() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let admin = AdminService::new(store.clone(), store.clone(), store.clone(), store.clone());
    let redemptions = RedemptionService::new(store.clone(), EconomyConfig::default(), Arc::new(EventBus::new()));

    let user = store.seed_profile(5000).await;
    store.seed_profile(0).await;
    store.seed_track("A", "jazz", 100);
    store.seed_ad(AdKind::Audio, 30, None);
    redemptions
        .request(RedemptionRequest {
            user_id: user,
            coins_used: 1000,
            amount: None,
            method: PayoutMethod::Giftcard,
            paypal_email: None,
        })
        .await?;

    let stats = admin.stats().await?;
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_tracks, 1);
    assert_eq!(stats.total_ads, 1);
    assert_eq!(stats.pending_redemptions, 1);
    Ok(())
}

#[tokio::test]
async fn search_text_is_a_literal_substring() -> Result<(), Error> {
    let store = Arc::new(MemoryStore::new());
    let catalog = TrackCatalogService::new(store.clone());
    store.seed_track("100% Chill", "ambient", 200);
    store.seed_track("1000 Chill", "ambient", 200);
    store.seed_track("Lo_Fi Dawn", "ambient", 200);
    store.seed_track("LoXFi Dusk", "ambient", 200);

    let percent = catalog
        .search(TrackFilter { search: Some("100%".into()), ..Default::default() })
        .await?;
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].title, "100% Chill");

    let underscore = catalog
        .search(TrackFilter { search: Some("lo_fi".into()), ..Default::default() })
        .await?;
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].title, "Lo_Fi Dawn");
    Ok(())
}
