use std::collections::HashSet;

use ahash::RandomState;
use bon::Builder;
use tracing::instrument;

use crate::{
  error::RivalryError,
  model::{CompetitorScore, Coordinates, MatchType, Shortlist, StoreRecord},
  scoring::Weights,
  search::{AreaSearch, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MIN_REVIEW_COUNT, DEFAULT_MIN_SIMILARITY, DistanceSearch, search_by_area, search_by_distance, validate_radius},
};

pub const DEFAULT_MIN_COMPETITION_SCORE: f64 = 0.15;

/// Number of competitors a diversified search tries to return.
pub const SHORTLIST_SIZE: usize = 5;

const STRATEGY_POOL_SIZE: usize = 20;
const BACKFILL_POOL_SIZE: usize = 15;

/// Parameters for a diversified search.
///
/// Without an origin, the search falls back to area adjacency only.
#[derive(Builder, Clone, Debug)]
pub struct DiversifiedSearch {
  pub origin: Option<Coordinates>,
  #[builder(into)]
  pub area: String,
  #[builder(into)]
  pub industry: String,
  #[builder(default = DEFAULT_MAX_DISTANCE_KM)]
  pub max_distance: f64,
  #[builder(default = DEFAULT_MIN_SIMILARITY)]
  pub min_similarity: f64,
  /// Candidates picked by a strategy must score at least this much.
  #[builder(default = DEFAULT_MIN_COMPETITION_SCORE)]
  pub min_competition_score: f64,
  #[builder(default = DEFAULT_MIN_REVIEW_COUNT)]
  pub min_review_count: u32,
}

impl DiversifiedSearch {
  pub fn validate(&self) -> Result<(), RivalryError> {
    if self.area.trim().is_empty() {
      return Err(RivalryError::InvalidQuery("area is empty"));
    }

    if self.industry.trim().is_empty() {
      return Err(RivalryError::InvalidQuery("industry is empty"));
    }

    if let Some(origin) = self.origin
      && !origin.is_valid()
    {
      return Err(RivalryError::InvalidQuery("origin coordinates are out of range"));
    }

    validate_radius(self.max_distance)
  }
}

struct Strategy {
  tag: &'static str,
  weights: Weights,
  quota: usize,
  /// Accept slightly less similar industries, since proximity dominates.
  relaxed: bool,
}

impl Strategy {
  fn cutoff(&self, min_similarity: f64) -> f64 {
    if self.relaxed { (min_similarity - 0.1).max(0.40) } else { min_similarity }
  }
}

const STRATEGIES: [Strategy; 3] = [
  Strategy {
    tag: "위치우선",
    weights: Weights::LOCATION_PRIORITY,
    quota: 2,
    relaxed: true,
  },
  Strategy {
    tag: "업종우선",
    weights: Weights::INDUSTRY_PRIORITY,
    quota: 2,
    relaxed: false,
  },
  Strategy {
    tag: "균형",
    weights: Weights::EVEN,
    quota: 1,
    relaxed: false,
  },
];

/// Build a shortlist of competitors blending several points of view.
///
/// When an origin is known, three distance searches favoring location,
/// industry, then both, each contribute a few stores. Remaining slots are
/// filled from an area search. The shortlist never holds the same store twice
/// and may come back short when the catalog does not have enough qualifying
/// stores.
#[instrument(name = "find_diversified", skip_all, fields(area = query.area, industry = query.industry, located = query.origin.is_some()))]
pub fn find_diversified(pool: &[StoreRecord], query: &DiversifiedSearch) -> Shortlist {
  if let Err(err) = query.validate() {
    tracing::error!(error = err.to_string(), "invalid diversified search");

    return Shortlist {
      competitors: vec![],
      target: SHORTLIST_SIZE,
    };
  }

  let mut selected: Vec<CompetitorScore> = Vec::with_capacity(SHORTLIST_SIZE);
  let mut seen: HashSet<String, RandomState> = HashSet::default();

  match query.origin {
    Some(origin) => {
      for strategy in &STRATEGIES {
        let search = DistanceSearch::builder()
          .origin(origin)
          .industry(query.industry.clone())
          .limit(STRATEGY_POOL_SIZE)
          .max_distance(query.max_distance)
          .weights(strategy.weights)
          .min_similarity(strategy.cutoff(query.min_similarity))
          .min_review_count(query.min_review_count)
          .build();

        let mut picked = 0;

        for mut candidate in search_by_distance(pool, &search) {
          if picked == strategy.quota {
            break;
          }

          if candidate.competition_score < query.min_competition_score {
            tracing::debug!(strategy = strategy.tag, place_id = candidate.place_id, score = candidate.competition_score, "candidate below quality bar");
            continue;
          }

          if !seen.insert(candidate.place_id.clone()) {
            continue;
          }

          candidate.match_type = candidate.match_type.tagged(strategy.tag);
          selected.push(candidate);
          picked += 1;
        }

        tracing::debug!(strategy = strategy.tag, picked, "applied selection strategy");
      }
    }

    None => tracing::info!("no coordinates given, selecting by area only"),
  }

  if selected.len() < SHORTLIST_SIZE {
    let needed = SHORTLIST_SIZE - selected.len();

    tracing::info!(needed, "backfilling shortlist with area search");

    let search = AreaSearch::builder()
      .area(query.area.clone())
      .industry(query.industry.clone())
      .limit(BACKFILL_POOL_SIZE)
      .min_similarity(query.min_similarity)
      .min_review_count(query.min_review_count)
      .build();

    let backfill = search_by_area(pool, &search)
      .into_iter()
      .filter(|candidate| seen.insert(candidate.place_id.clone()))
      .take(needed)
      .map(|mut candidate| {
        candidate.match_type = MatchType::Backfill {
          district: candidate.district.clone(),
        };

        candidate
      });

    selected.extend(backfill);
  }

  let shortlist = Shortlist {
    competitors: selected,
    target: SHORTLIST_SIZE,
  };

  match shortlist.shortfall() {
    0 => tracing::info!(found = shortlist.competitors.len(), "built competitor shortlist"),
    missing => tracing::warn!(found = shortlist.competitors.len(), missing, "not enough qualifying competitors"),
  }

  shortlist
}
