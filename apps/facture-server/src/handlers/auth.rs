//! Authentication handlers: register, login, logout, current user.

use std::str::FromStr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use facture_policy::normalize_email;
use facture_storage::{
    AccountStatus, CreateSessionParams, CreateUserParams, Role, StoreError,
};

use crate::config::{ServerConfig, COOKIE_MAX_AGE_DAYS, SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::error::ApiError;
use crate::extract::{AppJson, CurrentUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let full_name = req.full_name.trim().to_string();
    if full_name.is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("All fields are required".into()));
    }
    let email = normalize_email(&req.email)?;

    let role = match req.role.as_deref() {
        None => Role::Sales,
        Some(raw) => Role::from_str(raw).map_err(ApiError::Validation)?,
    };

    // One-way hash; the clear-text password is neither stored nor logged.
    let password_hash = facture_auth::hash_password(&req.password)?;

    match state
        .store
        .create_user(&CreateUserParams {
            full_name,
            email,
            password_hash,
            role,
            status: AccountStatus::Active,
        })
        .await
    {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(json!({"message": "User registered successfully"})),
        )),
        Err(StoreError::AlreadyExists) => Err(ApiError::Conflict("Email already exists".into())),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("Email and password required".into()));
    }

    // Unknown email and wrong password produce the same rejection; the
    // response never reveals which one failed.
    let user = match state.store.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(invalid_credentials()),
        Err(e) => return Err(e.into()),
    };
    if !facture_auth::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let token = facture_auth::session_token();
    state
        .store
        .create_session(&CreateSessionParams {
            token: token.clone(),
            user_id: user.id.clone(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
        })
        .await?;

    Ok((
        jar.add(session_cookie(&state.config, token)),
        Json(json!({
            "message": "Login successful",
            "role": user.role,
            "email": user.email,
            "full_name": user.full_name,
        })),
    ))
}

fn invalid_credentials() -> ApiError {
    ApiError::Validation("Invalid credentials".into())
}

fn session_cookie(config: &ServerConfig, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS));
    cookie.set_secure(config.production);
    cookie.set_same_site(if config.production {
        SameSite::None
    } else {
        SameSite::Lax
    });
    cookie
}

pub async fn logout(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        // Idempotent: destroying an already-gone session still succeeds.
        state.store.delete_session(cookie.value()).await?;
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    Ok((
        jar.remove(removal),
        Json(json!({"message": "Logged out successfully"})),
    ))
}

pub async fn me(CurrentUser(principal): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "id": principal.id,
        "full_name": principal.full_name,
        "email": principal.email,
        "role": principal.role,
    }))
}
