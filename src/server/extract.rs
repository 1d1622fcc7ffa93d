//! Axum extractors that reject with [`CrewError`] bodies
//!
//! `axum::Json` and `axum::extract::Query` reject with plain-text responses.
//! These wrappers keep every 4xx in the `{"code","message","details"}` shape.

use crate::core::error::{CrewError, ValidationError};
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body; parse failures become `VALIDATION_ERROR`
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = CrewError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ValidationError::InvalidJson {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}

/// JSON body that also passed its `validator` rules
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_customer(
///     State(state): State<AppState>,
///     ValidJson(input): ValidJson<CustomerInput>,
/// ) -> CrewResult<Json<Customer>> {
///     // input is already validated
/// }
/// ```
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = CrewError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate().map_err(ValidationError::from)?;
        Ok(Self(value))
    }
}

/// Query string; unknown enum values and malformed dates become `VALIDATION_ERROR`
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = CrewError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ValidationError::field("query", rejection.body_text()).into()),
        }
    }
}
