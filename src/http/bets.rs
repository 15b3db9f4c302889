//! Wager placement and the caller's bet history.

use actix_web::{error, get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;

use crate::db::bet_repo;
use crate::db::models::Prediction;
use crate::http::auth::JwtAuth;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub character_id: i32,
    pub episode_id: i32,
    pub amount: i64,
    pub prediction: String,
}

#[derive(Deserialize)]
pub struct MyBetsParams {
    #[serde(rename = "episodeId")]
    pub episode_id: Option<i32>,
}

/// POST /api/bets
#[post("/bets")]
pub async fn place_bet(
    info: web::Json<PlaceBetRequest>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    // An unknown prediction string is the same uniform rejection as any
    // other failed precondition.
    let Ok(prediction) = Prediction::from_str(&info.prediction) else {
        return Ok(reject());
    };

    let placed = bet_repo::place_bet(
        &db,
        auth.user_id,
        info.character_id,
        info.episode_id,
        info.amount,
        prediction,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    match placed {
        Some(result) => {
            crate::metrics::BETS_PLACED.inc();
            Ok(HttpResponse::Ok().json(result))
        }
        None => Ok(reject()),
    }
}

fn reject() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "message": "Unable to place bet. Check episode status, character status, and balance."
    }))
}

/// GET /api/bets/me?episodeId=
#[get("/bets/me")]
pub async fn my_bets(
    web::Query(params): web::Query<MyBetsParams>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let bets = bet_repo::list_for_user(&db, auth.user_id, params.episode_id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(bets))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(place_bet).service(my_bets);
}
