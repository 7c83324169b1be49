//! soundcoin-server/src/config.rs
//!
//! Command-line / environment configuration.

use std::time::Duration;
use clap::Parser;
use rust_decimal::Decimal;
use soundcoin_core::auth::AuthProviderConfig;
use soundcoin_core::db::DEFAULT_MAX_CONNECTIONS;
use soundcoin_core::economy::{DEFAULT_AD_INTERVAL, EconomyConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "soundcoin")]
#[command(author, version, about = "SoundCoin - ad-supported music streaming with a coin economy")]
pub struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, env = "SOUNDCOIN_ADDR", default_value = "0.0.0.0:8787")]
    pub server_addr: String,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "postgres://soundcoin@localhost:5432/soundcoin")]
    pub db_url: String,

    /// Base URL of the hosted auth provider
    #[arg(long, env = "AUTH_URL", default_value = "http://localhost:54321")]
    pub auth_url: String,

    #[arg(long, env = "AUTH_API_KEY", default_value = "")]
    pub auth_api_key: String,

    /// USD value of a single coin
    #[arg(long, env = "SOUNDCOIN_COIN_VALUE_USD", default_value = "0.0001")]
    pub coin_value_usd: Decimal,

    /// Naturally completed tracks between session ads
    #[arg(long, env = "SOUNDCOIN_AD_INTERVAL", default_value_t = DEFAULT_AD_INTERVAL)]
    pub ad_interval: u32,

    #[arg(long, env = "SOUNDCOIN_MIN_REDEMPTION_COINS")]
    pub min_redemption_coins: Option<i64>,

    #[arg(long, env = "SOUNDCOIN_MAX_DB_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_db_connections: u32,

    /// Player sessions untouched for this many seconds are closed
    #[arg(long, env = "SOUNDCOIN_SESSION_IDLE_SECS", default_value_t = 1800)]
    pub session_idle_secs: u64,

    /// Do not run embedded migrations at startup
    #[arg(long, default_value = "false")]
    pub skip_migrations: bool,
}

impl Args {
    pub fn economy(&self) -> EconomyConfig {
        EconomyConfig {
            coin_value_usd: self.coin_value_usd,
            ad_interval: self.ad_interval,
            min_redemption_coins: self.min_redemption_coins,
        }
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn auth_provider(&self) -> AuthProviderConfig {
        AuthProviderConfig {
            base_url: self.auth_url.clone(),
            api_key: self.auth_api_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_economy() {
        let args = Args::parse_from(["soundcoin"]);
        assert_eq!(args.server_addr, "0.0.0.0:8787");
        assert_eq!(args.economy().coin_value_usd, Decimal::new(1, 4));
        assert_eq!(args.economy().ad_interval, 3);
        assert!(args.economy().min_redemption_coins.is_none());
        assert!(!args.skip_migrations);
        assert_eq!(args.session_idle(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "soundcoin",
            "--coin-value-usd",
            "0.001",
            "--ad-interval",
            "5",
            "--min-redemption-coins",
            "1000",
            "--skip-migrations",
            "--session-idle-secs",
            "120",
        ]);
        let economy = args.economy();
        assert_eq!(economy.coin_value_usd, Decimal::new(1, 3));
        assert_eq!(economy.ad_interval, 5);
        assert_eq!(economy.min_redemption_coins, Some(1000));
        assert!(args.skip_migrations);
        assert_eq!(args.session_idle(), Duration::from_secs(120));
    }
}
