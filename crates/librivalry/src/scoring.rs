use metrics::histogram;
use serde::{Deserialize, Serialize};

use crate::error::RivalryError;

/// Exponents applied to industry similarity (β) and geographic fitness (α).
///
/// A higher exponent makes the corresponding signal more discriminating, since
/// both inputs live in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Weights {
  pub industry: f64,
  pub geo: f64,
}

impl Weights {
  pub const DEFAULT: Weights = Weights { industry: 1.8, geo: 0.9 };
  pub const LOCATION_PRIORITY: Weights = Weights { industry: 0.8, geo: 2.0 };
  pub const INDUSTRY_PRIORITY: Weights = Weights { industry: 2.0, geo: 0.8 };
  pub const EVEN: Weights = Weights { industry: 1.2, geo: 1.2 };

  /// Both exponents must be finite and strictly positive, otherwise scores
  /// leave `[0, 1]` and rankings invert.
  pub fn validate(&self) -> Result<(), RivalryError> {
    if !(self.industry.is_finite() && self.industry > 0.0 && self.geo.is_finite() && self.geo > 0.0) {
      return Err(RivalryError::InvalidQuery("weights must be finite positive numbers"));
    }

    Ok(())
  }

  pub fn score(&self, industry_similarity: f64, geo_fitness: f64) -> f64 {
    competition_score(industry_similarity, geo_fitness, self.industry, self.geo)
  }
}

impl Default for Weights {
  fn default() -> Self {
    Weights::DEFAULT
  }
}

/// Named weighting presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightProfile {
  #[default]
  Default,
  LocationPriority,
  IndustryPriority,
  Even,
}

impl From<WeightProfile> for Weights {
  fn from(profile: WeightProfile) -> Self {
    match profile {
      WeightProfile::Default => Weights::DEFAULT,
      WeightProfile::LocationPriority => Weights::LOCATION_PRIORITY,
      WeightProfile::IndustryPriority => Weights::INDUSTRY_PRIORITY,
      WeightProfile::Even => Weights::EVEN,
    }
  }
}

/// Combine industry similarity and geographic fitness into a single score,
/// as `similarity^beta * fitness^alpha`.
///
/// Inputs are clamped to `[0, 1]`. A result that is not a finite number
/// (negative exponent on a zero input, NaN input) is reported and scored
/// as `0.0`.
pub fn competition_score(industry_similarity: f64, geo_fitness: f64, beta: f64, alpha: f64) -> f64 {
  let score = industry_similarity.clamp(0.0, 1.0).powf(beta) * geo_fitness.clamp(0.0, 1.0).powf(alpha);

  if !score.is_finite() {
    tracing::error!(industry_similarity, geo_fitness, beta, alpha, "could not compute competition score");

    return 0.0;
  }

  histogram!("rivalry_competition_scores").record(score);

  score
}

#[cfg(test)]
mod tests {
  use float_cmp::approx_eq;

  use super::{WeightProfile, Weights, competition_score};

  #[test]
  fn composite() {
    assert_eq!(competition_score(1.0, 1.0, 1.8, 0.9), 1.0);
    assert_eq!(competition_score(0.0, 1.0, 1.8, 0.9), 0.0);
    assert!(approx_eq!(f64, competition_score(0.7, 0.85, 1.8, 0.9), 0.7f64.powf(1.8) * 0.85f64.powf(0.9)));
    assert!(approx_eq!(f64, Weights::DEFAULT.score(0.7, 0.85), competition_score(0.7, 0.85, 1.8, 0.9)));
  }

  #[test]
  fn clamped_and_finite() {
    assert_eq!(competition_score(1.5, 2.0, 1.8, 0.9), 1.0);
    assert_eq!(competition_score(-0.5, 1.0, 1.8, 0.9), 0.0);
    assert_eq!(competition_score(0.0, 1.0, -1.0, 0.9), 0.0);
    assert_eq!(competition_score(f64::NAN, 1.0, 1.8, 0.9), 0.0);
  }

  #[test]
  fn monotonic() {
    let steps = (0..=20).map(|step| step as f64 / 20.0).collect::<Vec<_>>();

    for weights in [Weights::DEFAULT, Weights::LOCATION_PRIORITY, Weights::INDUSTRY_PRIORITY, Weights::EVEN] {
      for fixed in &steps {
        for pair in steps.windows(2) {
          assert!(weights.score(pair[0], *fixed) <= weights.score(pair[1], *fixed));
          assert!(weights.score(*fixed, pair[0]) <= weights.score(*fixed, pair[1]));
          assert!(weights.score(pair[0], *fixed) >= 0.0);
        }
      }
    }
  }

  #[test]
  fn profiles() {
    assert_eq!(Weights::from(WeightProfile::default()), Weights::DEFAULT);
    assert_eq!(Weights::from(WeightProfile::LocationPriority), Weights { industry: 0.8, geo: 2.0 });
    assert_eq!(serde_json::from_str::<WeightProfile>(r#""industry_priority""#).unwrap(), WeightProfile::IndustryPriority);
  }

  #[test]
  fn weights_validation() {
    for weights in [Weights::DEFAULT, Weights::LOCATION_PRIORITY, Weights::INDUSTRY_PRIORITY, Weights::EVEN] {
      assert!(weights.validate().is_ok());
    }

    assert!(Weights { industry: -1.0, geo: 1.0 }.validate().is_err());
    assert!(Weights { industry: 1.0, geo: 0.0 }.validate().is_err());
    assert!(Weights { industry: f64::NAN, geo: 1.0 }.validate().is_err());
    assert!(Weights { industry: 1.0, geo: f64::INFINITY }.validate().is_err());
  }
}
