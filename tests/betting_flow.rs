// End-to-end wager lifecycle against a real Postgres.
//
// These tests need DATABASE_URL pointing at a migrated database and are
// ignored by default:  cargo test -- --ignored

use deathwatch_server::db::models::Prediction;
use deathwatch_server::db::{bet_repo, membership_repo};
use deathwatch_server::settlement;
use dotenvy::dotenv;
use sqlx::PgPool;
use uuid::Uuid;

struct Fixture {
    user_id: Uuid,
    show_id: i32,
    episode_id: i32,
    character_id: i32,
}

async fn connect() -> PgPool {
    dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
    PgPool::connect(&url).await.expect("DB connection failed")
}

/// Fresh show/season/episode/character/user with a 1000-balance membership.
async fn fixture(pool: &PgPool, balance: i64) -> Fixture {
    let tag = Uuid::new_v4().simple().to_string();

    let show_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO shows (name, initial_balance) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("test show {tag}"))
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("insert show");

    let season_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO seasons (show_id, season_number, name) VALUES ($1, 1, 'S1') RETURNING id",
    )
    .bind(show_id)
    .fetch_one(pool)
    .await
    .expect("insert season");

    let episode_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO episodes (season_id, episode_number, title, betting_open)
         VALUES ($1, 1, 'E1', TRUE) RETURNING id",
    )
    .bind(season_id)
    .fetch_one(pool)
    .await
    .expect("insert episode");

    let character_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO characters (show_id, name, status) VALUES ($1, $2, 'alive') RETURNING id",
    )
    .bind(show_id)
    .bind(format!("character {tag}"))
    .fetch_one(pool)
    .await
    .expect("insert character");

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(format!("user-{tag}"))
    .bind(format!("user-{tag}@example.com"))
    .fetch_one(pool)
    .await
    .expect("insert user");

    assert!(membership_repo::join_show(pool, user_id, show_id)
        .await
        .expect("join show"));

    Fixture {
        user_id,
        show_id,
        episode_id,
        character_id,
    }
}

async fn bet_status(pool: &PgPool, bet_id: i64) -> String {
    sqlx::query_scalar::<_, String>("SELECT status FROM bets WHERE id = $1")
        .bind(bet_id)
        .fetch_one(pool)
        .await
        .expect("fetch bet status")
}

#[tokio::test]
#[ignore]
async fn winning_bet_pays_double() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    // 1000 - 300 = 700, bet pending
    let placed = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        300,
        Prediction::Dies,
    )
    .await
    .expect("placement")
    .expect("preconditions hold");
    assert_eq!(placed.new_balance, 700);
    assert_eq!(bet_status(&pool, placed.bet_id).await, "pending");

    // character dies -> bet won, 700 + 600 = 1300
    let resolved = settlement::resolve_outcome(&pool, fx.episode_id, fx.character_id, true)
        .await
        .expect("settlement");
    assert_eq!(resolved, 1);
    assert_eq!(bet_status(&pool, placed.bet_id).await, "won");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1300)
    );
}

#[tokio::test]
#[ignore]
async fn losing_bet_keeps_the_stake_gone() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    let placed = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        300,
        Prediction::Survives,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(placed.new_balance, 700);

    let resolved = settlement::resolve_outcome(&pool, fx.episode_id, fx.character_id, true)
        .await
        .unwrap();
    assert_eq!(resolved, 1);
    assert_eq!(bet_status(&pool, placed.bet_id).await, "lost");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(700)
    );
}

#[tokio::test]
#[ignore]
async fn settlement_never_touches_a_bet_twice() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        300,
        Prediction::Dies,
    )
    .await
    .unwrap()
    .unwrap();

    let first = settlement::resolve_outcome(&pool, fx.episode_id, fx.character_id, true)
        .await
        .unwrap();
    let second = settlement::resolve_outcome(&pool, fx.episode_id, fx.character_id, true)
        .await
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 0, "a settled bet must not resolve again");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1300),
        "no double credit"
    );
}

#[tokio::test]
#[ignore]
async fn placement_rejections_leave_no_trace() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    // insufficient balance
    let r = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        5000,
        Prediction::Dies,
    )
    .await
    .unwrap();
    assert!(r.is_none());

    // non-positive amount
    let r = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        0,
        Prediction::Dies,
    )
    .await
    .unwrap();
    assert!(r.is_none());

    // betting closed
    sqlx::query("UPDATE episodes SET betting_open = FALSE WHERE id = $1")
        .bind(fx.episode_id)
        .execute(&pool)
        .await
        .unwrap();
    let r = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        100,
        Prediction::Dies,
    )
    .await
    .unwrap();
    assert!(r.is_none());
    sqlx::query("UPDATE episodes SET betting_open = TRUE WHERE id = $1")
        .bind(fx.episode_id)
        .execute(&pool)
        .await
        .unwrap();

    // dead character
    sqlx::query("UPDATE characters SET status = 'dead' WHERE id = $1")
        .bind(fx.character_id)
        .execute(&pool)
        .await
        .unwrap();
    let r = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        100,
        Prediction::Dies,
    )
    .await
    .unwrap();
    assert!(r.is_none());

    // balance untouched, no bets written
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1000)
    );
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bets WHERE user_id = $1")
        .bind(fx.user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore]
async fn cancellation_refunds_the_stake_once() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    let placed = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        250,
        Prediction::Survives,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(placed.new_balance, 750);

    let refunded = settlement::cancel_episode(&pool, fx.episode_id).await.unwrap();
    assert_eq!(refunded, 1);
    assert_eq!(bet_status(&pool, placed.bet_id).await, "refunded");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1000),
        "stake returned exactly once"
    );

    // cancel again: nothing pending, nothing credited
    let again = settlement::cancel_episode(&pool, fx.episode_id).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1000)
    );
}

#[tokio::test]
#[ignore]
async fn settlement_covers_the_whole_pending_set() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    // A second member betting the other way on the same pair.
    let tag = Uuid::new_v4().simple().to_string();
    let rival = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(format!("rival-{tag}"))
    .bind(format!("rival-{tag}@example.com"))
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(membership_repo::join_show(&pool, rival, fx.show_id).await.unwrap());

    let optimist = bet_repo::place_bet(
        &pool,
        fx.user_id,
        fx.character_id,
        fx.episode_id,
        100,
        Prediction::Survives,
    )
    .await
    .unwrap()
    .unwrap();
    let pessimist = bet_repo::place_bet(
        &pool,
        rival,
        fx.character_id,
        fx.episode_id,
        100,
        Prediction::Dies,
    )
    .await
    .unwrap()
    .unwrap();

    let resolved = settlement::resolve_outcome(&pool, fx.episode_id, fx.character_id, false)
        .await
        .unwrap();
    assert_eq!(resolved, 2, "every pending bet on the pair resolves");
    assert_eq!(bet_status(&pool, optimist.bet_id).await, "won");
    assert_eq!(bet_status(&pool, pessimist.bet_id).await, "lost");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id).await.unwrap(),
        Some(1100)
    );
    assert_eq!(
        membership_repo::balance(&pool, rival, fx.show_id).await.unwrap(),
        Some(900)
    );
}

#[tokio::test]
#[ignore]
async fn second_join_is_rejected() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    // fixture already joined once
    let rejoined = membership_repo::join_show(&pool, fx.user_id, fx.show_id)
        .await
        .unwrap();
    assert!(!rejoined, "duplicate join must be rejected");
    assert_eq!(
        membership_repo::balance(&pool, fx.user_id, fx.show_id)
            .await
            .unwrap(),
        Some(1000),
        "balance unchanged by the rejected join"
    );

    // joining a show that does not exist is the same rejection
    let missing = membership_repo::join_show(&pool, fx.user_id, -1).await.unwrap();
    assert!(!missing);
}

#[tokio::test]
#[ignore]
async fn leaderboard_orders_and_truncates() {
    let pool = connect().await;
    let fx = fixture(&pool, 1000).await;

    // Two more members with distinct balances, one tying the fixture user.
    for (i, balance) in [(1, 2000_i64), (2, 1000_i64)] {
        let tag = Uuid::new_v4().simple().to_string();
        let uid = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, 'x') RETURNING id",
        )
        .bind(format!("lb{i}-{tag}"))
        .bind(format!("lb{i}-{tag}@example.com"))
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO memberships (user_id, show_id, balance) VALUES ($1, $2, $3)")
            .bind(uid)
            .bind(fx.show_id)
            .bind(balance)
            .execute(&pool)
            .await
            .unwrap();
    }

    let board = membership_repo::leaderboard(&pool, fx.show_id, 2).await.unwrap();
    assert_eq!(board.len(), 2, "truncated to limit");
    assert_eq!(board[0].balance, 2000);
    assert_eq!(board[0].rank, 1);
    // The 1000/1000 tie breaks by join order: the fixture user came first.
    assert_eq!(board[1].user_id, fx.user_id);
    assert_eq!(board[1].rank, 2);

    let full = membership_repo::leaderboard(&pool, fx.show_id, 10).await.unwrap();
    assert_eq!(full.len(), 3);
    assert!(full.windows(2).all(|w| w[0].balance >= w[1].balance));
}
