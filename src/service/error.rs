use thiserror::Error;
use uuid::Uuid;

use crate::error::{ErrorMessage, HttpError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Property {0} not found")]
    PropertyNotFound(Uuid),

    #[error("Property {0} belongs to another seller")]
    NotPropertyOwner(Uuid),

    #[error("Viewer could not be identified")]
    ViewerUnknown,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::PropertyNotFound(_) => HttpError::not_found(ErrorMessage::PropertyNotFound.to_string()),
            ServiceError::NotPropertyOwner(_) => HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()),
            ServiceError::ViewerUnknown => HttpError::bad_request(ErrorMessage::ViewerUnknown.to_string()),
            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}
