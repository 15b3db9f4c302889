//! Demo-data seeding for development environments.
//!
//! No-op when any show already exists, so it is safe to run at every startup.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::http::auth::hash_password;

pub async fn seed(db: &PgPool) -> Result<()> {
    let populated = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shows)")
        .fetch_one(db)
        .await
        .context("checking for existing data")?;
    if populated {
        return Ok(());
    }

    let mut tx = db.begin().await.context("starting seed")?;

    let shows = [
        (
            "Game of Thrones",
            "Nine noble families fight for control over the lands of Westeros, while an ancient enemy returns after being dormant for millennia.",
            "Dragons",
            "🐉",
        ),
        (
            "The Walking Dead",
            "Sheriff Deputy Rick Grimes wakes up from a coma to learn the world is in ruins and must lead a group of survivors to stay alive.",
            "Bullets",
            "🔫",
        ),
        (
            "Breaking Bad",
            "A high school chemistry teacher diagnosed with cancer turns to producing and selling methamphetamine in order to secure his family's future.",
            "Blue Crystals",
            "💎",
        ),
    ];

    let mut show_ids = Vec::with_capacity(shows.len());
    for (name, description, currency_name, currency_symbol) in shows {
        let id = sqlx::query_scalar::<_, i32>(
            r#"INSERT INTO shows (name, description, currency_name, currency_symbol)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(name)
        .bind(description)
        .bind(currency_name)
        .bind(currency_symbol)
        .fetch_one(&mut *tx)
        .await
        .context("seeding show")?;
        show_ids.push(id);
    }
    let got = show_ids[0];

    let season = sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO seasons (show_id, season_number, name)
           VALUES ($1, 1, 'Season 1')
           RETURNING id"#,
    )
    .bind(got)
    .fetch_one(&mut *tx)
    .await
    .context("seeding season")?;

    let episodes = [
        (1, "Winter Is Coming", true, Utc.with_ymd_and_hms(2011, 4, 17, 0, 0, 0).unwrap()),
        (2, "The Kingsroad", false, Utc.with_ymd_and_hms(2011, 4, 24, 0, 0, 0).unwrap()),
        (3, "Lord Snow", false, Utc.with_ymd_and_hms(2011, 5, 1, 0, 0, 0).unwrap()),
        (
            4,
            "Cripples, Bastards, and Broken Things",
            false,
            Utc.with_ymd_and_hms(2011, 5, 8, 0, 0, 0).unwrap(),
        ),
        (5, "The Wolf and the Lion", false, Utc.with_ymd_and_hms(2011, 5, 15, 0, 0, 0).unwrap()),
    ];
    for (number, title, open, air_date) in episodes {
        sqlx::query(
            r#"INSERT INTO episodes (season_id, episode_number, title, betting_open, air_date)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(season)
        .bind(number)
        .bind(title)
        .bind(open)
        .bind(air_date)
        .execute(&mut *tx)
        .await
        .context("seeding episode")?;
    }

    let characters = [
        ("Jon Snow", "Kit Harington", "alive", true),
        ("Daenerys Targaryen", "Emilia Clarke", "alive", true),
        ("Tyrion Lannister", "Peter Dinklage", "alive", true),
        ("Arya Stark", "Maisie Williams", "alive", true),
        ("Ned Stark", "Sean Bean", "dead", false),
        ("Cersei Lannister", "Lena Headey", "alive", true),
    ];
    for (name, actor, status, active) in characters {
        sqlx::query(
            r#"INSERT INTO characters (show_id, name, actor, status, is_active)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(got)
        .bind(name)
        .bind(actor)
        .bind(status)
        .bind(active)
        .execute(&mut *tx)
        .await
        .context("seeding character")?;
    }

    let password_hash = hash_password("password123")
        .map_err(|e| anyhow::anyhow!("hashing seed password: {e}"))?;
    let mut user_ids = Vec::with_capacity(2);
    for (username, email) in [
        ("testuser1", "testuser1@example.com"),
        ("testuser2", "testuser2@example.com"),
    ] {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO users (username, email, password_hash)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .context("seeding user")?;
        user_ids.push(id);
    }

    for (user_id, balance) in [(user_ids[0], 5000_i64), (user_ids[1], 4500_i64)] {
        sqlx::query(
            r#"INSERT INTO memberships (user_id, show_id, balance)
               VALUES ($1, $2, $3)"#,
        )
        .bind(user_id)
        .bind(got)
        .bind(balance)
        .execute(&mut *tx)
        .await
        .context("seeding membership")?;
    }

    tx.commit().await.context("committing seed")?;
    log::info!("seeded demo shows, episodes, characters and users");
    Ok(())
}
