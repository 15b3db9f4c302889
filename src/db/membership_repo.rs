use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One row of a show's leaderboard. Rank is positional, assigned at
/// serialization time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub username: String,
    pub balance: i64,
    #[sqlx(default)]
    pub rank: i64,
}

/// Enroll a user in a show with the show's starting balance.
///
/// Returns `Ok(false)` when the show does not exist or the user already
/// holds a membership; a repeated join is a rejection, not a no-op success.
pub async fn join_show(db: &PgPool, user_id: Uuid, show_id: i32) -> Result<bool> {
    let initial: Option<i64> =
        sqlx::query_scalar::<_, i64>("SELECT initial_balance FROM shows WHERE id = $1")
            .bind(show_id)
            .fetch_optional(db)
            .await
            .context("fetching show for join")?;

    let Some(initial_balance) = initial else {
        return Ok(false);
    };

    let inserted = sqlx::query(
        r#"INSERT INTO memberships (user_id, show_id, balance)
           VALUES ($1, $2, $3)
           ON CONFLICT (user_id, show_id) DO NOTHING"#,
    )
    .bind(user_id)
    .bind(show_id)
    .bind(initial_balance)
    .execute(db)
    .await
    .context("inserting membership")?
    .rows_affected();

    Ok(inserted == 1)
}

/// Current balance, or None when the user never joined the show.
pub async fn balance(db: &PgPool, user_id: Uuid, show_id: i32) -> Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>(
        "SELECT balance FROM memberships WHERE user_id = $1 AND show_id = $2",
    )
    .bind(user_id)
    .bind(show_id)
    .fetch_optional(db)
    .await
    .context("fetching membership balance")
}

/// Top balances for a show, richest first; ties break by join order.
pub async fn leaderboard(db: &PgPool, show_id: i32, limit: i64) -> Result<Vec<LeaderboardEntry>> {
    let mut rows = sqlx::query_as::<_, LeaderboardEntry>(
        r#"SELECT m.user_id, u.username, m.balance, 0::BIGINT AS rank
             FROM memberships m
             JOIN users u ON u.id = m.user_id
            WHERE m.show_id = $1
            ORDER BY m.balance DESC, m.id
            LIMIT $2"#,
    )
    .bind(show_id)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("querying leaderboard")?;

    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as i64 + 1;
    }
    Ok(rows)
}
