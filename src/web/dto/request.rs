//! Request DTOs for Web API.
//!
//! Request bodies are the profile service's own request types; field rules
//! are checked by the service, so the extractor here only parses JSON.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::web::error::ApiError;

pub use crate::auth::{LoginRequest, ProfileUpdateRequest, RegistrationRequest};

/// JSON body extractor whose rejection is a 400 [`ApiError`].
///
/// Axum's own `Json` rejects bad bodies with 415/422 and a plain-text body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T: DeserializeOwned> JsonBody<T> {
    /// Parse an already buffered body.
    ///
    /// For handlers that must check something else before looking at the
    /// body. No `Content-Type` check is made.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_bytes(bytes)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;
        Ok(JsonBody(value))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;
        Ok(JsonBody(value))
    }
}
