//! Per-user resources beyond the auth profile.

use actix_web::{error, get, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::membership_repo;
use crate::http::auth::JwtAuth;

/// GET /api/users/me/shows/{showId}/balance
#[get("/users/me/shows/{show_id}/balance")]
pub async fn show_balance(
    path: web::Path<i32>,
    auth: JwtAuth,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let show_id = path.into_inner();

    let balance = membership_repo::balance(&db, auth.user_id, show_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match balance {
        Some(balance) => Ok(HttpResponse::Ok().json(json!({ "balance": balance }))),
        None => {
            Ok(HttpResponse::NotFound().json(json!({ "message": "User has not joined this show" })))
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(show_balance);
}
