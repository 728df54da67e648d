use librivalry::prelude::*;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use validator::{Validate, ValidationError};

use crate::api::config::Config;

fn non_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank"));
  }

  Ok(())
}

fn located(payload: &DiversifiedPayload) -> Result<(), ValidationError> {
  match (payload.latitude, payload.longitude) {
    (Some(_), None) | (None, Some(_)) => Err(ValidationError::new("coordinates").with_message("latitude and longitude must be provided together".into())),
    _ => Ok(()),
  }
}

fn positive_weights(weights: &WeightsParam) -> Result<(), ValidationError> {
  Weights::from(*weights).validate().map_err(|_| ValidationError::new("weights"))
}

/// Either a named preset or explicit exponents.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WeightsParam {
  Preset(WeightProfile),
  Explicit(Weights),
}

impl Default for WeightsParam {
  fn default() -> Self {
    WeightsParam::Preset(WeightProfile::default())
  }
}

impl From<WeightsParam> for Weights {
  fn from(value: WeightsParam) -> Self {
    match value {
      WeightsParam::Preset(profile) => profile.into(),
      WeightsParam::Explicit(weights) => weights,
    }
  }
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[validate(schema(function = "located", skip_on_field_errors = false))]
pub(crate) struct DiversifiedPayload {
  #[validate(custom(function = "non_blank", message = "area cannot be empty"))]
  pub area: String,
  #[validate(custom(function = "non_blank", message = "industry cannot be empty"))]
  pub industry: String,

  #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
  pub latitude: Option<f64>,
  #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
  pub longitude: Option<f64>,

  #[validate(range(exclusive_min = 0.0, max = 50.0, message = "max_distance must be between 0 and 50 kilometers"))]
  pub max_distance: Option<f64>,
  #[validate(range(min = 0.0, max = 1.0, message = "min_similarity must be between 0 and 1"))]
  pub min_similarity: Option<f64>,
  #[validate(range(min = 0.0, max = 1.0, message = "min_competition_score must be between 0 and 1"))]
  pub min_competition_score: Option<f64>,
  pub min_review_count: Option<u32>,
}

impl DiversifiedPayload {
  pub(crate) fn into_search(self, config: &Config) -> DiversifiedSearch {
    DiversifiedSearch::builder()
      .maybe_origin(self.latitude.zip(self.longitude).map(|(latitude, longitude)| Coordinates::new(latitude, longitude)))
      .area(self.area)
      .industry(self.industry)
      .max_distance(self.max_distance.unwrap_or(config.max_distance))
      .min_similarity(self.min_similarity.unwrap_or(config.min_similarity))
      .min_competition_score(self.min_competition_score.unwrap_or(config.min_competition_score))
      .min_review_count(self.min_review_count.unwrap_or(config.min_review_count))
      .build()
  }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize, Validate)]
pub(crate) struct AreaPayload {
  #[validate(custom(function = "non_blank", message = "area cannot be empty"))]
  pub area: String,
  #[validate(custom(function = "non_blank", message = "industry cannot be empty"))]
  pub industry: String,

  #[serde_inline_default(5)]
  #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
  pub limit: usize,
  #[serde(default)]
  #[validate(custom(function = "positive_weights", message = "weights must be finite positive numbers"))]
  pub weights: WeightsParam,
  #[validate(range(min = 0.0, max = 1.0, message = "min_similarity must be between 0 and 1"))]
  pub min_similarity: Option<f64>,
  pub min_review_count: Option<u32>,
  #[serde_inline_default(true)]
  pub dynamic_cutoff: bool,
}

impl AreaPayload {
  pub(crate) fn into_search(self, config: &Config) -> AreaSearch {
    AreaSearch::builder()
      .area(self.area)
      .industry(self.industry)
      .limit(self.limit)
      .weights(self.weights.into())
      .min_similarity(self.min_similarity.unwrap_or(config.min_similarity))
      .min_review_count(self.min_review_count.unwrap_or(config.min_review_count))
      .dynamic_cutoff(self.dynamic_cutoff)
      .build()
  }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize, Validate)]
pub(crate) struct DistancePayload {
  #[validate(custom(function = "non_blank", message = "industry cannot be empty"))]
  pub industry: String,
  #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
  pub latitude: f64,
  #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
  pub longitude: f64,

  #[serde_inline_default(20)]
  #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
  pub limit: usize,
  #[serde(default)]
  #[validate(custom(function = "positive_weights", message = "weights must be finite positive numbers"))]
  pub weights: WeightsParam,
  #[validate(range(exclusive_min = 0.0, max = 50.0, message = "max_distance must be between 0 and 50 kilometers"))]
  pub max_distance: Option<f64>,
  #[validate(range(min = 0.0, max = 1.0, message = "min_similarity must be between 0 and 1"))]
  pub min_similarity: Option<f64>,
  pub min_review_count: Option<u32>,
}

impl DistancePayload {
  pub(crate) fn into_search(self, config: &Config) -> DistanceSearch {
    DistanceSearch::builder()
      .origin(Coordinates::new(self.latitude, self.longitude))
      .industry(self.industry)
      .limit(self.limit)
      .weights(self.weights.into())
      .max_distance(self.max_distance.unwrap_or(config.max_distance))
      .min_similarity(self.min_similarity.unwrap_or(config.min_similarity))
      .min_review_count(self.min_review_count.unwrap_or(config.min_review_count))
      .build()
  }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct NormalizeParams {
  pub q: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SimilarityParams {
  pub lhs: String,
  pub rhs: String,
}

#[derive(Serialize)]
pub(super) struct CompetitorsResponse {
  pub competitors: Vec<CompetitorScore>,
  pub total: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shortfall: Option<usize>,
}

impl From<Vec<CompetitorScore>> for CompetitorsResponse {
  fn from(competitors: Vec<CompetitorScore>) -> Self {
    CompetitorsResponse {
      total: competitors.len(),
      competitors,
      target: None,
      shortfall: None,
    }
  }
}

impl From<Shortlist> for CompetitorsResponse {
  fn from(shortlist: Shortlist) -> Self {
    CompetitorsResponse {
      total: shortlist.competitors.len(),
      target: Some(shortlist.target),
      shortfall: Some(shortlist.shortfall()),
      competitors: shortlist.competitors,
    }
  }
}

#[derive(Serialize)]
pub(super) struct NormalizedArea {
  pub input: String,
  pub area: String,
  pub district: Option<String>,
}

#[derive(Serialize)]
pub(super) struct IndustrySimilarity {
  pub lhs: String,
  pub rhs: String,
  pub similarity: f64,
  pub lhs_chain: Vec<String>,
  pub rhs_chain: Vec<String>,
}
