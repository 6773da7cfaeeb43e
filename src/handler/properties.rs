use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Path, Query},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::propertydtos::{PropertyDto, PropertyListResponseDto, SearchPropertiesQuery, ViewCountResponseDto},
    error::HttpError,
    middleware::{optional_auth, JWTAuthMiddleware},
    utils::client_ip::client_ip,
    AppState,
};

pub fn properties_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(search_properties).layer(middleware::from_fn(optional_auth)),
        )
        .route("/filters", get(get_filters))
        .route("/increment-view-count/:id", put(increment_view_count))
}

pub async fn search_properties(
    Query(query_params): Query<SearchPropertiesQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
    user: Option<Extension<JWTAuthMiddleware>>,
) -> Result<impl IntoResponse, HttpError> {
    let caller = user.as_ref().map(|Extension(auth)| &auth.user);

    let page = app_state
        .search_service
        .search(&query_params, caller)
        .await?;

    Ok(Json(PropertyListResponseDto {
        properties: PropertyDto::filter_properties(&page.items),
        total_pages: page.total_pages(),
        current_page: page.pagination.page,
        total_properties: page.total_count,
    }))
}

pub async fn get_filters(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let facets = app_state.search_service.facets().await?;

    Ok(Json(facets))
}

/// Deprecated: counts under the calendar-day policy keyed on the client
/// address. New clients use `POST /api/property-views/:property_id`.
pub async fn increment_view_count(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let ip_address = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    tracing::warn!(
        "Deprecated increment-view-count called for {} from {:?}",
        property_id,
        ip_address
    );

    let view_count = app_state
        .view_service
        .record_legacy_view(property_id, ip_address)
        .await?;

    let successor = HeaderValue::from_str(&format!(
        "</api/property-views/{}>; rel=\"successor-version\"",
        property_id
    ))
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        [
            (HeaderName::from_static("deprecation"), HeaderValue::from_static("true")),
            (header::LINK, successor),
        ],
        Json(ViewCountResponseDto { view_count }),
    ))
}
