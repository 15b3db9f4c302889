//! Registration, login, and the bearer-token extractor.

use actix_web::{error, get, post, web, HttpResponse};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

use crate::config::settings;
use crate::db::models::User;
use crate::db::user_repo;

//////////////////////////////////////////////////
// Data structs
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        UserProfile {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

//////////////////////////////////////////////////
// Password hashing (argon2id, PHC strings)
//////////////////////////////////////////////////

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

//////////////////////////////////////////////////
// Token issuance
//////////////////////////////////////////////////

pub fn issue_token(user_id: Uuid) -> anyhow::Result<String> {
    let secret = env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
    let exp = Utc::now()
        .checked_add_signed(Duration::minutes(settings().token_ttl_minutes))
        .ok_or_else(|| anyhow::anyhow!("token expiry overflow"))?
        .timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

//////////////////////////////////////////////////
// ─────────────  JwtAuth extractor  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::Claims;
    use actix_web::{
        dev::Payload, error::ErrorUnauthorized, FromRequest, HttpRequest, Result as ActixResult,
    };
    use futures_util::future::{ready, Ready};
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use std::env;
    use uuid::Uuid;

    /// Extracts and validates a Bearer-JWT, exposing the caller's user id.
    #[derive(Debug, Clone)]
    pub struct JwtAuth {
        pub user_id: Uuid,
    }

    impl FromRequest for JwtAuth {
        type Error = actix_web::Error;
        type Future = Ready<ActixResult<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| {
                // Expect:  Authorization: Bearer <JWT>
                let hdr = req
                    .headers()
                    .get("Authorization")
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| ErrorUnauthorized("missing Authorization header"))?;

                let token = hdr
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| ErrorUnauthorized("malformed Authorization header"))?;

                let secret =
                    env::var("JWT_SECRET").map_err(|_| ErrorUnauthorized("server mis-config"))?;
                let data = decode::<Claims>(
                    token,
                    &DecodingKey::from_secret(secret.as_bytes()),
                    &Validation::default(),
                )
                .map_err(|_| ErrorUnauthorized("invalid / expired token"))?;

                let user_id =
                    Uuid::parse_str(&data.claims.sub).map_err(|_| ErrorUnauthorized("bad sub"))?;

                Ok(JwtAuth { user_id })
            })();

            ready(res)
        }
    }
}
pub use extractor::JwtAuth; // <-- makes path crate::http::auth::JwtAuth work

//////////////////////////////////////////////////
// POST /api/auth/register
//////////////////////////////////////////////////
#[post("/auth/register")]
pub async fn register(
    info: web::Json<RegisterRequest>,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    if info.username.trim().is_empty() || info.email.trim().is_empty() || info.password.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(json!({ "message": "username, email and password are required" })));
    }

    let taken = user_repo::identity_taken(&db, &info.username, &info.email)
        .await
        .map_err(error::ErrorInternalServerError)?;
    if taken {
        return Ok(HttpResponse::BadRequest()
            .json(json!({ "message": "Username or email already exists" })));
    }

    let password_hash = hash_password(&info.password)
        .map_err(|e| error::ErrorInternalServerError(e.to_string()))?;

    // The unique constraints settle any registration race; surface the loser
    // as the same duplicate rejection.
    let user = match user_repo::create(&db, &info.username, &info.email, &password_hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            return Ok(HttpResponse::BadRequest()
                .json(json!({ "message": "Username or email already exists" })));
        }
        Err(e) => return Err(error::ErrorInternalServerError(e)),
    };

    let token = issue_token(user.id).map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

//////////////////////////////////////////////////
// POST /api/auth/login
//////////////////////////////////////////////////
#[post("/auth/login")]
pub async fn login(
    info: web::Json<LoginRequest>,
    db: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = user_repo::find_by_username(&db, &info.username)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let Some(user) = user else {
        return Ok(HttpResponse::Unauthorized().finish());
    };
    if !verify_password(&info.password, &user.password_hash) {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    user_repo::touch_last_login(&db, user.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let token = issue_token(user.id).map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

//////////////////////////////////////////////////
// GET /api/auth/me
//////////////////////////////////////////////////
#[get("/auth/me")]
pub async fn me(auth: JwtAuth, db: web::Data<PgPool>) -> Result<HttpResponse, actix_web::Error> {
    let user = user_repo::find_by_id(&db, auth.user_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(UserProfile::from(&u))),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(me);
}
