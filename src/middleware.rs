use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorMessage, HttpError},
    models::usermodel::{User, UserRole},
    utils::token,
    AppState,
};

/// The authenticated caller, attached to request extensions by `auth` and
/// `optional_auth`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

fn extract_token(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
        })
        .filter(|token| !token.is_empty())
}

async fn load_user(app_state: &AppState, token: String) -> Result<User, HttpError> {
    let token_details = token::decode_token(token, app_state.env.jwt_secret.as_bytes())
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user_id = uuid::Uuid::parse_str(&token_details)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = app_state.store.get_user(user_id).await.map_err(|e| {
        tracing::error!("Failed to load user {}: {}", user_id, e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    user.ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &req)
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let user = load_user(&app_state, token).await?;

    req.extensions_mut().insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}

/// Attaches the caller when a usable token is present. Missing, invalid or
/// stale tokens continue as an anonymous request.
pub async fn optional_auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    if let Some(token) = extract_token(&cookie_jar, &req) {
        match load_user(&app_state, token).await {
            Ok(user) => {
                req.extensions_mut().insert(JWTAuthMiddleware { user });
            }
            Err(e) => tracing::debug!("Ignoring unusable token: {}", e.message),
        }
    }

    next.run(req).await
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddleware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        return Err(HttpError::new(ErrorMessage::PermissionDenied.to_string(), StatusCode::FORBIDDEN));
    }

    Ok(next.run(req).await)
}
