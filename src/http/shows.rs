//! Show catalog: listing, detail, joining, characters, leaderboard.

use actix_web::{error, get, post, web, HttpResponse};
use redis::Client as RedisClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::cache;
use crate::config::settings;
use crate::db::membership_repo::{self, LeaderboardEntry};
use crate::db::models::{Character, Episode, Season, Show};
use crate::db::show_repo;
use crate::http::auth::JwtAuth;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDetail {
    #[serde(flatten)]
    pub season: Season,
    pub episodes: Vec<Episode>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDetail {
    #[serde(flatten)]
    pub show: Show,
    pub seasons: Vec<SeasonDetail>,
    pub characters: Vec<Character>,
}

#[derive(Deserialize)]
pub struct CharacterParams {
    #[serde(rename = "aliveOnly")]
    pub alive_only: Option<bool>,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    /// Maximum number of entries to return.
    pub limit: Option<i64>,
}

/// GET /api/shows
#[get("/shows")]
pub async fn list_shows(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let key = cache::keys::shows_list();
    if let Some(cached) = cache::fetch::<Vec<Show>>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let shows = show_repo::list_active(&db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    cache::store(&redis, &key, &shows, settings().cache_ttl).await;
    Ok(HttpResponse::Ok().json(shows))
}

/// GET /api/shows/{id}
#[get("/shows/{id}")]
pub async fn show_detail(
    path: web::Path<i32>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let show_id = path.into_inner();

    let key = cache::keys::show(show_id);
    if let Some(cached) = cache::fetch::<serde_json::Value>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let Some(show) = show_repo::find(&db, show_id)
        .await
        .map_err(error::ErrorInternalServerError)?
    else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let seasons = show_repo::seasons_of(&db, show_id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let episodes = show_repo::episodes_of_show(&db, show_id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let characters = show_repo::characters_of(&db, show_id, false)
        .await
        .map_err(error::ErrorInternalServerError)?;

    // Group episodes under their seasons; both lists arrive ordered.
    let seasons: Vec<SeasonDetail> = seasons
        .into_iter()
        .map(|season| {
            let mine: Vec<Episode> = episodes
                .iter()
                .filter(|e| e.season_id == season.id)
                .cloned()
                .collect();
            SeasonDetail {
                season,
                episodes: mine,
            }
        })
        .collect();

    let detail = ShowDetail {
        show,
        seasons,
        characters,
    };

    cache::store(&redis, &key, &detail, settings().cache_ttl).await;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/shows/{id}/join
#[post("/shows/{id}/join")]
pub async fn join_show(
    path: web::Path<i32>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let show_id = path.into_inner();

    let joined = membership_repo::join_show(&db, auth.user_id, show_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    if !joined {
        return Ok(HttpResponse::BadRequest()
            .json(json!({ "message": "Unable to join show. You may already be a member." })));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully joined show" })))
}

/// GET /api/shows/{id}/characters?aliveOnly=
#[get("/shows/{id}/characters")]
pub async fn show_characters(
    path: web::Path<i32>,
    web::Query(params): web::Query<CharacterParams>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let show_id = path.into_inner();
    let alive_only = params.alive_only.unwrap_or(false);

    let key = cache::keys::characters_by_show(show_id, alive_only);
    if let Some(cached) = cache::fetch::<Vec<Character>>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let characters = show_repo::characters_of(&db, show_id, alive_only)
        .await
        .map_err(error::ErrorInternalServerError)?;

    cache::store(&redis, &key, &characters, settings().cache_ttl).await;
    Ok(HttpResponse::Ok().json(characters))
}

/// GET /api/shows/{id}/leaderboard?limit=
#[get("/shows/{id}/leaderboard")]
pub async fn leaderboard(
    path: web::Path<i32>,
    web::Query(params): web::Query<LeaderboardParams>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, actix_web::Error> {
    let show_id = path.into_inner();
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let key = cache::keys::leaderboard(show_id, limit);
    if let Some(cached) = cache::fetch::<Vec<LeaderboardEntry>>(&redis, &key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let entries = membership_repo::leaderboard(&db, show_id, limit)
        .await
        .map_err(error::ErrorInternalServerError)?;

    cache::store(&redis, &key, &entries, settings().leaderboard_cache_ttl).await;
    Ok(HttpResponse::Ok().json(entries))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_shows)
        .service(show_detail)
        .service(join_show)
        .service(show_characters)
        .service(leaderboard);
}
