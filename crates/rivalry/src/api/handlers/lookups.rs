use axum::{Json, response::IntoResponse};
use axum_extra::extract::{Query, WithRejection};
use librivalry::prelude::{self, *};

use crate::api::{
  dto::{IndustrySimilarity, NormalizeParams, NormalizedArea, SimilarityParams},
  errors::AppError,
};

pub async fn normalize_area(WithRejection(Query(params), _): WithRejection<Query<NormalizeParams>, AppError>) -> Result<impl IntoResponse, AppError> {
  Ok(Json(NormalizedArea {
    area: prelude::normalize_area(&params.q),
    district: extract_district(&params.q),
    input: params.q,
  }))
}

pub async fn industry_similarity(WithRejection(Query(params), _): WithRejection<Query<SimilarityParams>, AppError>) -> Result<impl IntoResponse, AppError> {
  let lhs = params.lhs.trim();
  let rhs = params.rhs.trim();

  if lhs.is_empty() || rhs.is_empty() {
    return Err(AppError::BadRequest("both industries must be provided".into()));
  }

  Ok(Json(IndustrySimilarity {
    similarity: prelude::industry_similarity(lhs, rhs),
    lhs_chain: broadening_chain(lhs).into_iter().map(String::from).collect(),
    rhs_chain: broadening_chain(rhs).into_iter().map(String::from).collect(),
    lhs: lhs.to_string(),
    rhs: rhs.to_string(),
  }))
}
