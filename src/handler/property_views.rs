use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Path},
    http::HeaderMap,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::viewdtos::{ReconcileResponseDto, RecordViewResponseDto, ViewAnalyticsDto},
    error::HttpError,
    middleware::{auth, optional_auth, role_check, JWTAuthMiddleware},
    models::{usermodel::UserRole, viewmodel::ViewerIdentity},
    utils::client_ip::client_ip,
    AppState,
};

pub fn property_views_handler() -> Router {
    Router::new()
        .route(
            "/:property_id",
            post(record_view).layer(middleware::from_fn(optional_auth)),
        )
        .route(
            "/:property_id/analytics",
            get(get_view_analytics)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin, UserRole::Seller])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/:property_id/reconcile",
            post(reconcile_view_count)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                }))
                .layer(middleware::from_fn(auth)),
        )
}

pub async fn record_view(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    user: Option<Extension<JWTAuthMiddleware>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = user.map(|Extension(auth)| auth.user.id);
    let ip_address = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let viewer = ViewerIdentity::resolve(user_id, ip_address);

    let outcome = app_state
        .view_service
        .record_view(property_id, viewer)
        .await?;

    let message = if outcome.recorded {
        "View recorded successfully"
    } else {
        "Property already viewed today"
    };

    Ok(Json(RecordViewResponseDto {
        success: true,
        message: message.to_string(),
        already_viewed: !outcome.recorded,
        view_count: outcome.view_count,
    }))
}

pub async fn get_view_analytics(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .view_service
        .analytics(property_id, &user.user)
        .await?;

    Ok(Json(ViewAnalyticsDto::from(stats)))
}

pub async fn reconcile_view_count(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let view_count = app_state.view_service.reconcile(property_id).await?;

    Ok(Json(ReconcileResponseDto {
        success: true,
        view_count,
    }))
}
