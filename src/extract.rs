//! Request extractors that reject with the JSON error envelope.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ApiError;

/// A JSON request body. Unparseable bodies become `INVALID_TYPE` errors.
pub(crate) struct JsonBody(pub Value);

#[axum::async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Typed path parameters. A segment that does not parse becomes an `INVALID_TYPE` error.
pub(crate) struct PathParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
