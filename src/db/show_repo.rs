use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::{Character, Episode, Season, Show};

const SHOW_COLS: &str =
    "id, name, description, image_url, currency_name, currency_symbol, initial_balance, is_active";
const EPISODE_COLS: &str = "id, season_id, episode_number, title, air_date, betting_open";
const CHARACTER_COLS: &str = "id, show_id, name, actor, image_url, status, is_active";

pub async fn list_active(db: &PgPool) -> Result<Vec<Show>> {
    sqlx::query_as::<_, Show>(&format!(
        "SELECT {SHOW_COLS} FROM shows WHERE is_active ORDER BY id"
    ))
    .fetch_all(db)
    .await
    .context("listing active shows")
}

pub async fn find(db: &PgPool, show_id: i32) -> Result<Option<Show>> {
    sqlx::query_as::<_, Show>(&format!("SELECT {SHOW_COLS} FROM shows WHERE id = $1"))
        .bind(show_id)
        .fetch_optional(db)
        .await
        .context("fetching show")
}

pub async fn seasons_of(db: &PgPool, show_id: i32) -> Result<Vec<Season>> {
    sqlx::query_as::<_, Season>(
        "SELECT id, show_id, season_number, name
           FROM seasons WHERE show_id = $1 ORDER BY season_number",
    )
    .bind(show_id)
    .fetch_all(db)
    .await
    .context("listing seasons")
}

/// Every episode of a show, joined through its seasons.
pub async fn episodes_of_show(db: &PgPool, show_id: i32) -> Result<Vec<Episode>> {
    sqlx::query_as::<_, Episode>(
        "SELECT e.id, e.season_id, e.episode_number, e.title, e.air_date, e.betting_open
           FROM episodes e
           JOIN seasons s ON s.id = e.season_id
          WHERE s.show_id = $1
          ORDER BY s.season_number, e.episode_number",
    )
    .bind(show_id)
    .fetch_all(db)
    .await
    .context("listing show episodes")
}

pub async fn characters_of(db: &PgPool, show_id: i32, alive_only: bool) -> Result<Vec<Character>> {
    let mut sql = format!("SELECT {CHARACTER_COLS} FROM characters WHERE show_id = $1");
    if alive_only {
        sql.push_str(" AND status = 'alive'");
    }
    sql.push_str(" ORDER BY id");

    sqlx::query_as::<_, Character>(&sql)
        .bind(show_id)
        .fetch_all(db)
        .await
        .context("listing characters")
}

pub async fn season_episodes(db: &PgPool, season_id: i32) -> Result<Vec<Episode>> {
    sqlx::query_as::<_, Episode>(&format!(
        "SELECT {EPISODE_COLS} FROM episodes WHERE season_id = $1 ORDER BY episode_number"
    ))
    .bind(season_id)
    .fetch_all(db)
    .await
    .context("listing season episodes")
}

pub async fn find_episode(db: &PgPool, episode_id: i32) -> Result<Option<Episode>> {
    sqlx::query_as::<_, Episode>(&format!(
        "SELECT {EPISODE_COLS} FROM episodes WHERE id = $1"
    ))
    .bind(episode_id)
    .fetch_optional(db)
    .await
    .context("fetching episode")
}
