use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{CharacterStatus, Prediction};

/// Successful placement: the new wager and the post-debit balance.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBet {
    pub bet_id: i64,
    pub new_balance: i64,
}

/// A caller-facing view of one wager, joined with catalog names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BetView {
    pub id: i64,
    pub character_id: i32,
    pub character_name: String,
    pub episode_id: i32,
    pub episode_title: String,
    pub amount: i64,
    pub prediction: String,
    pub status: String,
    pub placed_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Place a wager. All preconditions are re-checked inside one transaction and
/// any failure rolls the whole thing back: `Ok(None)` is the uniform
/// rejection with no partial effects.
///
/// Preconditions: the episode exists with betting open, the character exists
/// and is alive, the amount is positive, and the caller holds a membership in
/// the episode's show with sufficient balance. The debit itself is guarded by
/// `balance >= amount` so a concurrent placement can never overdraw.
pub async fn place_bet(
    db: &PgPool,
    user_id: Uuid,
    character_id: i32,
    episode_id: i32,
    amount: i64,
    prediction: Prediction,
) -> Result<Option<PlacedBet>> {
    if amount <= 0 {
        return Ok(None);
    }

    let mut tx = db.begin().await.context("starting placement")?;

    // Episode must exist and accept wagers.
    let episode = sqlx::query_as::<_, (i32, bool)>(
        "SELECT season_id, betting_open FROM episodes WHERE id = $1",
    )
    .bind(episode_id)
    .fetch_optional(&mut *tx)
    .await
    .context("fetching episode")?;

    let Some((season_id, betting_open)) = episode else {
        return Ok(None);
    };
    if !betting_open {
        return Ok(None);
    }

    // Character must exist and still be alive.
    let status = sqlx::query_scalar::<_, String>("SELECT status FROM characters WHERE id = $1")
        .bind(character_id)
        .fetch_optional(&mut *tx)
        .await
        .context("fetching character")?;

    if status.as_deref() != Some(CharacterStatus::Alive.as_str()) {
        return Ok(None);
    }

    // The stake comes out of the membership for the episode's show.
    let show_id = sqlx::query_scalar::<_, i32>("SELECT show_id FROM seasons WHERE id = $1")
        .bind(season_id)
        .fetch_one(&mut *tx)
        .await
        .context("resolving owning show")?;

    let new_balance = sqlx::query_scalar::<_, i64>(
        r#"UPDATE memberships
              SET balance = balance - $3
            WHERE user_id = $1 AND show_id = $2 AND balance >= $3
        RETURNING balance"#,
    )
    .bind(user_id)
    .bind(show_id)
    .bind(amount)
    .fetch_optional(&mut *tx)
    .await
    .context("debiting stake")?;

    let Some(new_balance) = new_balance else {
        // No membership, or not enough currency.
        return Ok(None);
    };

    let bet_id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO bets (user_id, character_id, episode_id, amount, prediction, status)
           VALUES ($1, $2, $3, $4, $5, 'pending')
           RETURNING id"#,
    )
    .bind(user_id)
    .bind(character_id)
    .bind(episode_id)
    .bind(amount)
    .bind(prediction.as_str())
    .fetch_one(&mut *tx)
    .await
    .context("inserting bet")?;

    tx.commit().await.context("committing placement")?;
    Ok(Some(PlacedBet { bet_id, new_balance }))
}

/// The caller's wagers, newest first, optionally narrowed to one episode.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    episode_id: Option<i32>,
) -> Result<Vec<BetView>> {
    let mut sql = String::from(
        r#"SELECT b.id, b.character_id, c.name AS character_name,
                  b.episode_id, e.title AS episode_title,
                  b.amount, b.prediction, b.status, b.placed_at, b.resolved_at
             FROM bets b
             JOIN characters c ON c.id = b.character_id
             JOIN episodes e ON e.id = b.episode_id
            WHERE b.user_id = $1"#,
    );
    if episode_id.is_some() {
        sql.push_str(" AND b.episode_id = $2");
    }
    sql.push_str(" ORDER BY b.placed_at DESC, b.id DESC");

    let mut query = sqlx::query_as::<_, BetView>(&sql).bind(user_id);
    if let Some(eid) = episode_id {
        query = query.bind(eid);
    }

    query.fetch_all(db).await.context("listing user bets")
}
