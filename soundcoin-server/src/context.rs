//! soundcoin-server/src/context.rs
//!
//! Defines the global context (ServerContext) shared by every HTTP handler.

use std::sync::Arc;
use tracing::info;
use soundcoin_core::auth::{AuthProvider, AuthProviderConfig};
use soundcoin_core::db::Database;
use soundcoin_core::economy::EconomyConfig;
use soundcoin_core::eventbus::EventBus;
use soundcoin_core::http::{DefaultHttpClient, HttpClient};
use soundcoin_core::repositories::{
    AdRepository, AdViewRepository, CoinLedgerRepository, PostgresAdRepository,
    PostgresAdViewRepository, PostgresCoinLedgerRepository, PostgresProfileRepository,
    PostgresRedemptionRepository, PostgresTrackRepository, ProfileRepository,
    RedemptionRepository, TrackRepository,
};
use soundcoin_core::services::{
    AdService, AdminService, CoinLedgerService, PlaybackService, RedemptionService,
    TrackCatalogService,
};
use soundcoin_core::Error;

use crate::config::Args;

/// One handle per repository trait.
#[derive(Clone)]
pub struct Repositories {
    pub profiles: Arc<dyn ProfileRepository>,
    pub ledger: Arc<dyn CoinLedgerRepository>,
    pub tracks: Arc<dyn TrackRepository>,
    pub ads: Arc<dyn AdRepository>,
    pub ad_views: Arc<dyn AdViewRepository>,
    pub redemptions: Arc<dyn RedemptionRepository>,
}

impl Repositories {
    pub fn postgres(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            profiles: Arc::new(PostgresProfileRepository::new(pool.clone())),
            ledger: Arc::new(PostgresCoinLedgerRepository::new(pool.clone())),
            tracks: Arc::new(PostgresTrackRepository::new(pool.clone())),
            ads: Arc::new(PostgresAdRepository::new(pool.clone())),
            ad_views: Arc::new(PostgresAdViewRepository::new(pool.clone())),
            redemptions: Arc::new(PostgresRedemptionRepository::new(pool)),
        }
    }
}

/// The global server context (a bag of references to the DB, event bus and services).
pub struct ServerContext {
    /// `None` when assembled over repositories that are not Postgres-backed.
    pub db: Option<Database>,
    pub event_bus: Arc<EventBus>,
    pub ledger: Arc<CoinLedgerService>,
    pub ads: Arc<AdService>,
    pub catalog: Arc<TrackCatalogService>,
    pub redemptions: Arc<RedemptionService>,
    pub admin: Arc<AdminService>,
    pub playback: Arc<PlaybackService>,
    pub auth: Arc<AuthProvider>,
}

impl ServerContext {
    /// Connects to Postgres, runs migrations (unless skipped) and wires every service.
    pub async fn new(args: &Args) -> Result<Self, Error> {
        info!("Using Postgres DB URL: {}", redact_url(&args.db_url));
        let db = Database::connect(&args.db_url, args.max_db_connections).await?;
        if args.skip_migrations {
            info!("--skip-migrations given; not touching the schema.");
        } else {
            db.migrate().await?;
        }

        let repos = Repositories::postgres(&db);
        let http: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::new());
        let mut ctx = Self::assemble(repos, args.economy(), args.auth_provider(), http);
        ctx.db = Some(db);
        Ok(ctx)
    }

    pub fn assemble(
        repos: Repositories,
        economy: EconomyConfig,
        auth_config: AuthProviderConfig,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());

        let ledger = Arc::new(CoinLedgerService::new(
            repos.ledger.clone(),
            repos.profiles.clone(),
            event_bus.clone(),
        ));
        let ads = Arc::new(AdService::new(
            repos.ads.clone(),
            repos.ad_views.clone(),
            repos.profiles.clone(),
            event_bus.clone(),
        ));
        let catalog = Arc::new(TrackCatalogService::new(repos.tracks.clone()));
        let redemptions = Arc::new(RedemptionService::new(
            repos.redemptions.clone(),
            economy.clone(),
            event_bus.clone(),
        ));
        let admin = Arc::new(AdminService::new(
            repos.profiles.clone(),
            repos.tracks.clone(),
            repos.ads.clone(),
            repos.redemptions.clone(),
        ));
        let playback = Arc::new(PlaybackService::new(
            catalog.clone(),
            ads.clone(),
            economy.ad_interval,
        ));
        let auth = Arc::new(AuthProvider::new(auth_config, http, repos.profiles.clone()));

        Self {
            db: None,
            event_bus,
            ledger,
            ads,
            catalog,
            redemptions,
            admin,
            playback,
            auth,
        }
    }
}

/// Hides the password part of a connection URL for logging.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            match creds.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact_url;

    #[test]
    fn passwords_are_not_logged() {
        assert_eq!(
            redact_url("postgres://app:s3cret@db:5432/soundcoin"),
            "postgres://app:***@db:5432/soundcoin"
        );
        assert_eq!(redact_url("postgres://app@db/soundcoin"), "postgres://app@db/soundcoin");
    }
}
