//! Best-effort Redis read-through cache for catalog lookups.
//!
//! Every entry is a JSON string with a TTL. The relational store is always
//! authoritative: any Redis error (connection refused, timeout, bad payload)
//! degrades to a cache miss and the caller falls through to Postgres.

use redis::{AsyncCommands, Client as RedisClient};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key builders for the catalog cache namespace.
pub mod keys {
    pub fn shows_list() -> String {
        "show:list".into()
    }

    pub fn show(show_id: i32) -> String {
        format!("show:{show_id}")
    }

    pub fn characters_by_show(show_id: i32, alive_only: bool) -> String {
        format!("character:show:{show_id}:{}", if alive_only { "alive" } else { "all" })
    }

    pub fn episode(episode_id: i32) -> String {
        format!("episode:{episode_id}")
    }

    pub fn season_episodes(season_id: i32) -> String {
        format!("season:{season_id}:episodes")
    }

    pub fn leaderboard(show_id: i32, limit: i64) -> String {
        format!("leaderboard:{show_id}:{limit}")
    }
}

/// Look up `key`, returning the deserialized value on a hit.
pub async fn fetch<T: DeserializeOwned>(redis: &RedisClient, key: &str) -> Option<T> {
    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            log::debug!("cache unavailable for {key}: {e}");
            return None;
        }
    };
    match conn.get::<_, Option<String>>(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
        Ok(None) => None,
        Err(e) => {
            log::debug!("cache get failed for {key}: {e}");
            None
        }
    }
}

/// Store `value` under `key` with `ttl_secs`. Failures are logged and dropped.
pub async fn store<T: Serialize>(redis: &RedisClient, key: &str, value: &T, ttl_secs: u64) {
    let raw = match serde_json::to_string(value) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("cache serialize failed for {key}: {e}");
            return;
        }
    };
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let _: () = conn.set_ex(key, raw, ttl_secs).await.unwrap_or(());
    }
}

/// Drop `key` from the cache, if reachable.
pub async fn invalidate(redis: &RedisClient, key: &str) {
    if let Ok(mut conn) = redis.get_multiplexed_async_connection().await {
        let _: () = conn.del(key).await.unwrap_or(());
    }
}
