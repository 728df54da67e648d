mod competitors;
mod lookups;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use librivalry::prelude::*;

use crate::api::{AppState, errors::AppError};

pub(super) use self::competitors::{area_competitors, distance_competitors, diversified_competitors};
pub(super) use self::lookups::{industry_similarity, normalize_area};

pub async fn not_found() -> impl IntoResponse {
  AppError::ResourceNotFound
}

pub async fn healthz() -> StatusCode {
  StatusCode::OK
}

pub async fn readyz<C: StoreCatalog>(State(state): State<AppState<C>>) -> StatusCode {
  match state.rivalry.health().await {
    Ok(true) => StatusCode::OK,
    Ok(false) => StatusCode::SERVICE_UNAVAILABLE,

    Err(err) => {
      tracing::warn!(error = err.to_string(), "store catalog is not ready");

      StatusCode::SERVICE_UNAVAILABLE
    }
  }
}

pub async fn prometheus<C: StoreCatalog>(State(state): State<AppState<C>>) -> Result<String, AppError> {
  match state.prometheus {
    Some(handle) => Ok(handle.render()),
    None => Err(AppError::ResourceNotFound),
  }
}
