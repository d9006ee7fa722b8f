// Error to HTTP status mapping
use crate::application::device_registry::RegistryError;
use crate::application::editing_service::SessionError;
use crate::application::household_repository::HouseholdError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing caller identity")]
    Unauthenticated,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Household(#[from] HouseholdError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Registry(e) => registry_status(e),
            ApiError::Household(e) => match e {
                HouseholdError::HomeNotFound(_) | HouseholdError::InviteNotFound(_) => StatusCode::NOT_FOUND,
                HouseholdError::InviteClosed(_) => StatusCode::CONFLICT,
                HouseholdError::NotInvitee(_) | HouseholdError::NotOwner(_) => StatusCode::FORBIDDEN,
                HouseholdError::OwnHome | HouseholdError::EmptyName => StatusCode::BAD_REQUEST,
            },
            ApiError::Session(e) => match e {
                SessionError::NotEditing(_) => StatusCode::CONFLICT,
                SessionError::UnknownCard(_) => StatusCode::NOT_FOUND,
                SessionError::Registry(e) => registry_status(e),
            },
        }
    }
}

fn registry_status(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::Duplicate(_) => StatusCode::CONFLICT,
        RegistryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
