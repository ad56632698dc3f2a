//! Request extractors: the authenticated principal and a JSON body wrapper
//! that folds deserialization failures into the API error taxonomy.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;

use facture_storage::{Principal, StoreError};

use crate::config::SESSION_COOKIE;
use crate::error::ApiError;
use crate::server::AppState;

/// The acting principal, resolved from the session cookie on every request.
///
/// Resolution fails open to `Unauthenticated`: a missing, expired, or
/// unknown token — or a session whose user has since been deleted — all look
/// the same to the caller. The resolved record is then passed explicitly into
/// every policy and store call; there is no ambient per-request identity.
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(ApiError::Unauthenticated)?;

        let session = match state.store.get_session(&token).await {
            Ok(session) => session,
            Err(StoreError::NotFound) => return Err(ApiError::Unauthenticated),
            Err(e) => return Err(e.into()),
        };

        let principal = match state.store.get_user_by_id(&session.user_id).await {
            Ok(principal) => principal,
            Err(StoreError::NotFound) => return Err(ApiError::Unauthenticated),
            Err(e) => return Err(e.into()),
        };

        Ok(CurrentUser(principal))
    }
}

/// JSON extractor whose rejections render as our structured 400 payload
/// instead of axum's default body.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}
