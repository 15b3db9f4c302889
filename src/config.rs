//! Runtime configuration for the Deathwatch server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Access-token lifetime (minutes).
    pub token_ttl_minutes: i64,
    /// Catalog cache entry TTL (seconds).
    pub cache_ttl: u64,
    /// Leaderboard cache entry TTL (seconds); short, balances move often.
    pub leaderboard_cache_ttl: u64,
    /// Seed demo data at startup when the database is empty.
    pub seed_on_start: bool,
}

impl Settings {
    fn from_env() -> Self {
        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);

        let cache_ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        let leaderboard_cache_ttl = env::var("LEADERBOARD_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let seed_on_start = env::var("SEED_ON_START")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Settings {
            token_ttl_minutes,
            cache_ttl,
            leaderboard_cache_ttl,
            seed_on_start,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
