//! Episode reads plus the out-of-band outcome and cancellation triggers.

use actix_web::{error, get, post, web, HttpResponse};
use redis::Client as RedisClient;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::cache;
use crate::config::settings;
use crate::db::models::Episode;
use crate::db::show_repo;
use crate::http::auth::JwtAuth;
use crate::settlement;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRequest {
    pub character_id: i32,
    pub died: bool,
}

/// GET /api/seasons/{id}/episodes
#[get("/seasons/{id}/episodes")]
pub async fn season_episodes(
    path: web::Path<i32>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let season_id = path.into_inner();

    let key = cache::keys::season_episodes(season_id);
    if let Some(cached) = cache::fetch::<Vec<Episode>>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let episodes = show_repo::season_episodes(&db, season_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    cache::store(&redis, &key, &episodes, settings().cache_ttl).await;
    Ok(HttpResponse::Ok().json(episodes))
}

/// GET /api/episodes/{id}
#[get("/episodes/{id}")]
pub async fn episode_detail(
    path: web::Path<i32>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let episode_id = path.into_inner();

    let key = cache::keys::episode(episode_id);
    if let Some(cached) = cache::fetch::<Episode>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let episode = show_repo::find_episode(&db, episode_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match episode {
        Some(ep) => {
            cache::store(&redis, &key, &ep, settings().cache_ttl).await;
            Ok(HttpResponse::Ok().json(ep))
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// POST /api/episodes/{id}/outcome
///
/// Records whether the character died in the episode and settles every
/// pending wager on the pair. The roster update lands before settlement so
/// no new bet can slip in on a character already known dead.
#[post("/episodes/{id}/outcome")]
pub async fn record_outcome(
    path: web::Path<i32>,
    info: web::Json<OutcomeRequest>,
    _auth: JwtAuth,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let episode_id = path.into_inner();

    let Some(episode) = show_repo::find_episode(&db, episode_id)
        .await
        .map_err(error::ErrorInternalServerError)?
    else {
        return Ok(HttpResponse::NotFound().finish());
    };

    if info.died {
        settlement::mark_character_dead(&db, info.character_id)
            .await
            .map_err(error::ErrorInternalServerError)?;

        // The roster caches for the owning show are stale now.
        let show_id = sqlx::query_scalar::<_, i32>("SELECT show_id FROM characters WHERE id = $1")
            .bind(info.character_id)
            .fetch_optional(db.get_ref())
            .await
            .map_err(error::ErrorInternalServerError)?;
        if let Some(show_id) = show_id {
            cache::invalidate(&redis, &cache::keys::show(show_id)).await;
            cache::invalidate(&redis, &cache::keys::characters_by_show(show_id, true)).await;
            cache::invalidate(&redis, &cache::keys::characters_by_show(show_id, false)).await;
        }
    }

    let resolved = settlement::resolve_outcome(&db, episode_id, info.character_id, info.died)
        .await
        .map_err(error::ErrorInternalServerError)?;
    crate::metrics::BETS_RESOLVED.inc_by(resolved);

    cache::invalidate(&redis, &cache::keys::episode(episode_id)).await;
    cache::invalidate(&redis, &cache::keys::season_episodes(episode.season_id)).await;

    Ok(HttpResponse::Ok().json(json!({ "resolved": resolved })))
}

/// POST /api/episodes/{id}/cancel
///
/// Cancels the episode: closes betting and refunds every pending stake.
#[post("/episodes/{id}/cancel")]
pub async fn cancel_episode(
    path: web::Path<i32>,
    _auth: JwtAuth,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let episode_id = path.into_inner();

    let Some(episode) = show_repo::find_episode(&db, episode_id)
        .await
        .map_err(error::ErrorInternalServerError)?
    else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let refunded = settlement::cancel_episode(&db, episode_id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    crate::metrics::BETS_RESOLVED.inc_by(refunded);

    cache::invalidate(&redis, &cache::keys::episode(episode_id)).await;
    cache::invalidate(&redis, &cache::keys::season_episodes(episode.season_id)).await;

    Ok(HttpResponse::Ok().json(json!({ "refunded": refunded })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(season_episodes)
        .service(episode_detail)
        .service(record_outcome)
        .service(cancel_episode);
}
