use axum::{
  RequestExt,
  body::Body,
  extract::{FromRequest, Json, rejection::JsonRejection},
  http::{Request, StatusCode},
  response::{IntoResponse, Response},
};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::errors::ApiError;

/// Search payload extractor. The body must be JSON, deserialize into `T` and
/// pass `T`'s validation rules before the handler runs.
pub struct TypedJson<T>(pub T);

pub enum TypedJsonRejection {
  Malformed(JsonRejection),
  Invalid(ValidationErrors),
}

impl From<&TypedJsonRejection> for ApiError {
  fn from(value: &TypedJsonRejection) -> Self {
    match value {
      TypedJsonRejection::Malformed(JsonRejection::MissingJsonContentType(_)) => ApiError(StatusCode::UNSUPPORTED_MEDIA_TYPE, "invalid media type, expected application/json".into(), None),
      TypedJsonRejection::Malformed(JsonRejection::JsonSyntaxError(_)) => ApiError(StatusCode::BAD_REQUEST, "invalid payload format".into(), None),
      TypedJsonRejection::Malformed(JsonRejection::JsonDataError(err)) => ApiError(StatusCode::BAD_REQUEST, "payload does not match expected format".into(), Some(vec![err.body_text()])),
      TypedJsonRejection::Malformed(err) => ApiError(err.status(), "invalid payload".into(), Some(vec![err.body_text()])),
      TypedJsonRejection::Invalid(errs) => ApiError(StatusCode::UNPROCESSABLE_ENTITY, "payload failed validation".into(), Some(validation_messages(errs))),
    }
  }
}

impl IntoResponse for TypedJsonRejection {
  fn into_response(self) -> Response {
    ApiError::from(&self).into_response()
  }
}

/// One message per failed rule, including schema rules, sorted.
fn validation_messages(errs: &ValidationErrors) -> Vec<String> {
  errs
    .field_errors()
    .into_iter()
    .flat_map(|(field, errors)| {
      errors.iter().map(move |error| match &error.message {
        Some(message) => message.to_string(),
        None => format!("{field} is invalid"),
      })
    })
    .sorted()
    .dedup()
    .collect()
}

impl<T, S> FromRequest<S> for TypedJson<T>
where
  T: DeserializeOwned + Validate + 'static,
  S: Send + Sync,
{
  type Rejection = TypedJsonRejection;

  async fn from_request(request: Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
    let Json(payload) = request.extract::<Json<T>, _>().await.map_err(TypedJsonRejection::Malformed)?;

    payload.validate().map_err(TypedJsonRejection::Invalid)?;

    Ok(TypedJson(payload))
  }
}
