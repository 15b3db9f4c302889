//! Feature-flag state lookups.

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::features;

/// GET /api/features
#[get("/features")]
pub async fn all_features() -> impl Responder {
    let map: serde_json::Map<String, serde_json::Value> = features::all()
        .into_iter()
        .map(|(name, enabled)| (name.to_string(), serde_json::Value::Bool(enabled)))
        .collect();
    HttpResponse::Ok().json(map)
}

/// GET /api/features/{name}
#[get("/features/{name}")]
pub async fn one_feature(path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();
    let enabled = features::is_enabled(&name);
    HttpResponse::Ok().json(json!({ "feature": name, "enabled": enabled }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(all_features).service(one_feature);
}
