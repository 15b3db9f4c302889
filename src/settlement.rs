//! Settlement: resolving every pending wager on a (episode, character) pair
//! against a recorded outcome, and refunding wagers on cancelled episodes.
//!
//! Both entry points run as one transaction; the `status = 'pending'`
//! predicate on every statement is the exactly-once guard, so a concurrent
//! or repeated run finds nothing left to touch.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::db::models::{BetStatus, Prediction};

/// Even-money payout: stake returned plus equal winnings.
pub const WIN_MULTIPLIER: i64 = 2;

/// Resolve every pending bet on the (episode, character) pair.
///
/// Winners are credited `amount * WIN_MULTIPLIER` on their membership in the
/// episode's show; losers get nothing further (the stake was debited at
/// placement). Returns the number of bets resolved.
pub async fn resolve_outcome(
    db: &PgPool,
    episode_id: i32,
    character_id: i32,
    died: bool,
) -> Result<u64> {
    let winning = if died {
        Prediction::Dies
    } else {
        Prediction::Survives
    };

    let mut tx = db.begin().await.context("starting settlement")?;

    let show_id = sqlx::query_scalar::<_, i32>(
        "SELECT s.show_id FROM episodes e JOIN seasons s ON s.id = e.season_id WHERE e.id = $1",
    )
    .bind(episode_id)
    .fetch_one(&mut *tx)
    .await
    .context("resolving owning show")?;

    // Credit winners first, while their bets are still pending.
    sqlx::query(
        r#"UPDATE memberships m
              SET balance = m.balance + b.amount * $5
             FROM bets b
            WHERE b.episode_id = $1
              AND b.character_id = $2
              AND b.status = 'pending'
              AND b.prediction = $3
              AND m.user_id = b.user_id
              AND m.show_id = $4"#,
    )
    .bind(episode_id)
    .bind(character_id)
    .bind(winning.as_str())
    .bind(show_id)
    .bind(WIN_MULTIPLIER)
    .execute(&mut *tx)
    .await
    .context("crediting winners")?;

    let resolved = sqlx::query(
        r#"UPDATE bets
              SET status = CASE WHEN prediction = $3 THEN 'won' ELSE 'lost' END,
                  resolved_at = NOW()
            WHERE episode_id = $1
              AND character_id = $2
              AND status = 'pending'"#,
    )
    .bind(episode_id)
    .bind(character_id)
    .bind(winning.as_str())
    .execute(&mut *tx)
    .await
    .context("flipping bet statuses")?
    .rows_affected();

    tx.commit().await.context("committing settlement")?;

    log::info!(
        "settled {resolved} bet(s) for episode {episode_id} / character {character_id} (died={died})"
    );
    Ok(resolved)
}

/// Cancel an episode: every pending bet on it is refunded at exactly the
/// stake, marked `refunded`, and betting is closed. Returns the refund count.
pub async fn cancel_episode(db: &PgPool, episode_id: i32) -> Result<u64> {
    let mut tx = db.begin().await.context("starting cancellation")?;

    let show_id = sqlx::query_scalar::<_, i32>(
        "SELECT s.show_id FROM episodes e JOIN seasons s ON s.id = e.season_id WHERE e.id = $1",
    )
    .bind(episode_id)
    .fetch_one(&mut *tx)
    .await
    .context("resolving owning show")?;

    sqlx::query(
        r#"UPDATE memberships m
              SET balance = m.balance + b.amount
             FROM bets b
            WHERE b.episode_id = $1
              AND b.status = 'pending'
              AND m.user_id = b.user_id
              AND m.show_id = $2"#,
    )
    .bind(episode_id)
    .bind(show_id)
    .execute(&mut *tx)
    .await
    .context("returning stakes")?;

    let refunded = sqlx::query(
        r#"UPDATE bets
              SET status = $2, resolved_at = NOW()
            WHERE episode_id = $1 AND status = 'pending'"#,
    )
    .bind(episode_id)
    .bind(BetStatus::Refunded.as_str())
    .execute(&mut *tx)
    .await
    .context("marking bets refunded")?
    .rows_affected();

    sqlx::query("UPDATE episodes SET betting_open = FALSE WHERE id = $1")
        .bind(episode_id)
        .execute(&mut *tx)
        .await
        .context("closing betting")?;

    tx.commit().await.context("committing cancellation")?;

    log::info!("refunded {refunded} bet(s) for cancelled episode {episode_id}");
    Ok(refunded)
}

/// Record a character's on-screen death in the catalog. Kept separate from
/// [`resolve_outcome`] so a "survived" outcome leaves the roster untouched.
pub async fn mark_character_dead(db: &PgPool, character_id: i32) -> Result<()> {
    sqlx::query("UPDATE characters SET status = 'dead', is_active = FALSE WHERE id = $1")
        .bind(character_id)
        .execute(db)
        .await
        .context("marking character dead")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::models::Prediction;

    #[test]
    fn win_table() {
        assert!(Prediction::Dies.wins(true));
        assert!(!Prediction::Dies.wins(false));
        assert!(Prediction::Survives.wins(false));
        assert!(!Prediction::Survives.wins(true));
    }
}
