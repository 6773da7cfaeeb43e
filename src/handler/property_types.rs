use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{dtos::propertydtos::PropertyTypesResponseDto, error::HttpError, AppState};

pub fn property_types_handler() -> Router {
    Router::new().route("/seller", get(get_seller_property_types))
}

/// Active property types sellers may choose from when listing.
pub async fn get_seller_property_types(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let types = app_state.search_service.seller_property_types().await?;

    Ok(Json(PropertyTypesResponseDto { types }))
}
