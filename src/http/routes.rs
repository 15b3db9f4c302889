use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module under `/api`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(http::auth::init_routes)
            .configure(http::shows::init_routes)
            .configure(http::episodes::init_routes)
            .configure(http::bets::init_routes)
            .configure(http::users::init_routes)
            .configure(http::features::init_routes)
            .configure(http::health::init_routes),
    );
}
