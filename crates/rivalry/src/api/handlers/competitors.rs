use axum::{Json, extract::State, response::IntoResponse};
use librivalry::prelude::*;
use tracing::instrument;

use crate::api::{
  AppState,
  dto::{AreaPayload, CompetitorsResponse, DistancePayload, DiversifiedPayload},
  errors::AppError,
  middlewares::json_rejection::TypedJson,
};

#[instrument(skip_all, fields(area = body.area, industry = body.industry))]
pub async fn diversified_competitors<C: StoreCatalog>(State(state): State<AppState<C>>, TypedJson(body): TypedJson<DiversifiedPayload>) -> Result<impl IntoResponse, AppError> {
  let shortlist = state.rivalry.find_diversified(&body.into_search(&state.config)).await;

  Ok(Json(CompetitorsResponse::from(shortlist)))
}

#[instrument(skip_all, fields(area = body.area, industry = body.industry))]
pub async fn area_competitors<C: StoreCatalog>(State(state): State<AppState<C>>, TypedJson(body): TypedJson<AreaPayload>) -> Result<impl IntoResponse, AppError> {
  let query = body.into_search(&state.config);

  query.validate()?;

  Ok(Json(CompetitorsResponse::from(state.rivalry.search_by_area(&query).await)))
}

#[instrument(skip_all, fields(industry = body.industry))]
pub async fn distance_competitors<C: StoreCatalog>(State(state): State<AppState<C>>, TypedJson(body): TypedJson<DistancePayload>) -> Result<impl IntoResponse, AppError> {
  let query = body.into_search(&state.config);

  query.validate()?;

  Ok(Json(CompetitorsResponse::from(state.rivalry.search_by_distance(&query).await)))
}
