use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{Json, Response},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::ApiFailure;
use super::DevState;
use crate::error::ClientError;

/// Claims of tokens issued by the development backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl DevClaims {
    pub fn new(username: &str, expiry_hours: i64, now: DateTime<Utc>) -> Self {
        let role = if username.eq_ignore_ascii_case("admin") { "admin" } else { "user" };
        Self {
            sub: username.to_string(),
            role: role.to_string(),
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expiration: DateTime<Utc>,
}

/// Authenticated caller, placed in request extensions by [`require_bearer`]
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: String,
}

pub fn issue_token(claims: &DevClaims, secret: &str) -> Result<String, ClientError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ClientError::Server {
            status: Some(500),
            message: format!("JWT generation error: {}", e),
        })
}

pub fn validate_token(token: &str, secret: &str) -> Result<DevClaims, String> {
    decode::<DevClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid JWT token: {}", e))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<DevState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    let username = body.username.trim();
    if username.is_empty() || body.password != state.auth.password {
        tracing::info!("rejected login for '{}'", username);
        return Err(ApiFailure::unauthorized("Invalid username or password"));
    }

    let now = Utc::now();
    let claims = DevClaims::new(username, state.auth.expiry_hours, now);
    let token = issue_token(&claims, &state.auth.jwt_secret)?;
    tracing::info!("issued token for {}", username);

    Ok(Json(LoginResponse {
        token,
        username: claims.sub,
        role: claims.role,
        expiration: now + Duration::hours(state.auth.expiry_hours),
    }))
}

/// Rejects requests without a valid bearer token
pub async fn require_bearer(
    State(state): State<DevState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let token = extract_bearer(request.headers()).map_err(ApiFailure::unauthorized)?;
    let claims = validate_token(&token, &state.auth.jwt_secret).map_err(ApiFailure::unauthorized)?;

    request.extensions_mut().insert(AuthUser {
        username: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;
    let value = header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
