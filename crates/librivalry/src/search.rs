use std::cmp::Ordering;

use bon::Builder;
use itertools::Itertools;
use metrics::{counter, histogram};
use tokio::time::Instant;
use tracing::instrument;

use crate::{
  area::normalize_area,
  error::RivalryError,
  geo::{geo_fitness, geo_fitness_from_distance},
  model::{Assessment, CompetitorScore, Coordinates, MatchType, SkipReason, StoreRecord},
  scoring::Weights,
  similarity::{DISTINCT_LABEL_CEILING, broadening_chain, industry_similarity},
};

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.50;
pub const DEFAULT_MIN_REVIEW_COUNT: u32 = 30;
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 5.0;

const RELAXATION_STEP: f64 = 0.15;
const RELAXATION_FLOOR: f64 = 0.25;
const MAX_RELAXATIONS: usize = 3;

/// Parameters for a search based on area labels.
#[derive(Builder, Clone, Debug)]
pub struct AreaSearch {
  /// Free-form area, normalized before use.
  #[builder(into)]
  pub area: String,
  #[builder(into)]
  pub industry: String,
  #[builder(default = 5)]
  pub limit: usize,
  #[builder(default)]
  pub weights: Weights,
  #[builder(default = DEFAULT_MIN_SIMILARITY)]
  pub min_similarity: f64,
  #[builder(default = DEFAULT_MIN_REVIEW_COUNT)]
  pub min_review_count: u32,
  /// Lower the similarity cutoff when too few candidates qualify.
  #[builder(default = true)]
  pub dynamic_cutoff: bool,
}

impl AreaSearch {
  pub fn validate(&self) -> Result<(), RivalryError> {
    if self.area.trim().is_empty() {
      return Err(RivalryError::InvalidQuery("area is empty"));
    }

    if self.industry.trim().is_empty() {
      return Err(RivalryError::InvalidQuery("industry is empty"));
    }

    self.weights.validate()
  }
}

/// Parameters for a search around a point.
#[derive(Builder, Clone, Debug)]
pub struct DistanceSearch {
  pub origin: Coordinates,
  #[builder(into)]
  pub industry: String,
  #[builder(default = 20)]
  pub limit: usize,
  /// Radius, in kilometers.
  #[builder(default = DEFAULT_MAX_DISTANCE_KM)]
  pub max_distance: f64,
  #[builder(default)]
  pub weights: Weights,
  #[builder(default = DEFAULT_MIN_SIMILARITY)]
  pub min_similarity: f64,
  #[builder(default = DEFAULT_MIN_REVIEW_COUNT)]
  pub min_review_count: u32,
}

impl DistanceSearch {
  pub fn validate(&self) -> Result<(), RivalryError> {
    if self.industry.trim().is_empty() {
      return Err(RivalryError::InvalidQuery("industry is empty"));
    }

    if !self.origin.is_valid() {
      return Err(RivalryError::InvalidQuery("origin coordinates are out of range"));
    }

    validate_radius(self.max_distance)?;

    self.weights.validate()
  }
}

pub(crate) fn validate_radius(max_distance: f64) -> Result<(), RivalryError> {
  if !max_distance.is_finite() || max_distance < 0.0 {
    return Err(RivalryError::InvalidQuery("maximum distance must be a finite, non-negative number"));
  }

  Ok(())
}

/// Rank the stores of `pool` competing with a store of `query.industry`
/// located in `query.area`.
///
/// Geographic fitness is derived from area adjacency. When fewer than
/// `query.limit` stores clear the similarity cutoff, the cutoff can be lowered
/// a few times and the whole pool re-scanned. Returning fewer results than
/// requested, or none at all, is a valid outcome.
#[instrument(name = "search_by_area", skip_all, fields(area = query.area, industry = query.industry))]
pub fn search_by_area(pool: &[StoreRecord], query: &AreaSearch) -> Vec<CompetitorScore> {
  if let Err(err) = query.validate() {
    tracing::error!(error = err.to_string(), "invalid area search");

    return vec![];
  }

  let then = Instant::now();
  let industry = query.industry.trim();
  let area = normalize_area(&query.area);
  let chain = broadening_chain(industry);

  tracing::info!(normalized_area = area, chain = chain.join(" → "), "searching competitors by area");

  let scan = |cutoff: f64| partition(pool.iter().map(|record| assess_in_area(record, &area, industry, &chain, query, cutoff)));

  let mut cutoff = query.min_similarity;
  let (mut accepted, mut skipped) = scan(cutoff);
  let mut attempts = 0;

  while query.dynamic_cutoff && distinct(&accepted) < query.limit && cutoff > RELAXATION_FLOOR && attempts < MAX_RELAXATIONS {
    cutoff = (cutoff - RELAXATION_STEP).max(RELAXATION_FLOOR);
    attempts += 1;

    tracing::info!(cutoff, attempts, found = distinct(&accepted), "lowering similarity cutoff");

    (accepted, skipped) = scan(cutoff);
  }

  report_skipped(&skipped);

  let results = accepted
    .into_iter()
    .sorted_by(|lhs, rhs| {
      rhs
        .competition_score
        .total_cmp(&lhs.competition_score)
        .then_with(|| rhs.review_count.cmp(&lhs.review_count))
        .then_with(|| lhs.place_id.cmp(&rhs.place_id))
    })
    .unique_by(|score| score.place_id.clone())
    .take(query.limit)
    .collect::<Vec<_>>();

  histogram!("rivalry_search_latency_seconds", "mode" => "area").record(then.elapsed().as_secs_f64());

  if results.is_empty() {
    tracing::warn!(cutoff, "no competitor matched the area search");
  } else {
    tracing::info!(found = results.len(), cutoff, "found competitors by area");
  }

  results
}

/// Rank the stores of `pool` located within `query.max_distance` kilometers
/// of `query.origin` and competing with a store of `query.industry`.
///
/// Geographic fitness is derived from the great-circle distance. Among equal
/// scores, closer stores rank first.
#[instrument(name = "search_by_distance", skip_all, fields(industry = query.industry, max_distance = query.max_distance))]
pub fn search_by_distance(pool: &[StoreRecord], query: &DistanceSearch) -> Vec<CompetitorScore> {
  if let Err(err) = query.validate() {
    tracing::error!(error = err.to_string(), "invalid distance search");

    return vec![];
  }

  let then = Instant::now();
  let industry = query.industry.trim();
  let chain = broadening_chain(industry);

  tracing::info!(latitude = query.origin.latitude, longitude = query.origin.longitude, chain = chain.join(" → "), "searching competitors by distance");

  let (accepted, skipped) = partition(pool.iter().map(|record| assess_around(record, industry, &chain, query)));

  report_skipped(&skipped);

  let results = accepted
    .into_iter()
    .sorted_by(|lhs, rhs| {
      rhs
        .competition_score
        .total_cmp(&lhs.competition_score)
        .then_with(|| rhs.geo_fitness.total_cmp(&lhs.geo_fitness))
        .then_with(|| rhs.review_count.cmp(&lhs.review_count))
        .then_with(|| lhs.place_id.cmp(&rhs.place_id))
    })
    .unique_by(|score| score.place_id.clone())
    .take(query.limit)
    .collect::<Vec<_>>();

  histogram!("rivalry_search_latency_seconds", "mode" => "distance").record(then.elapsed().as_secs_f64());

  if results.is_empty() {
    tracing::warn!("no competitor matched the distance search");
  } else {
    tracing::info!(found = results.len(), "found competitors by distance");
  }

  results
}

/// Best similarity between a candidate industry and any label of the
/// broadening chain, along with the depth of that label.
///
/// The first label reaching the maximum wins.
pub(crate) fn best_match(industry: &str, chain: &[&str], candidate: &str) -> (f64, usize) {
  if candidate == industry {
    return (1.0, 0);
  }

  let (similarity, depth) = chain.iter().enumerate().fold((0.0, 0), |(best, depth), (index, label)| {
    let similarity = industry_similarity(label, candidate);

    match similarity.partial_cmp(&best) {
      Some(Ordering::Greater) => (similarity, index),
      _ => (best, depth),
    }
  });

  (similarity.min(DISTINCT_LABEL_CEILING), depth)
}

fn assess_in_area(record: &StoreRecord, area: &str, industry: &str, chain: &[&str], query: &AreaSearch, cutoff: f64) -> Assessment {
  if let Some(defect) = record.defect() {
    return skip(record, SkipReason::Malformed(defect));
  }

  if record.review_count < query.min_review_count {
    return skip(
      record,
      SkipReason::BelowReviewFloor {
        count: record.review_count,
        floor: query.min_review_count,
      },
    );
  }

  let (similarity, depth) = best_match(industry, chain, &record.industry);

  if similarity < cutoff {
    return skip(record, SkipReason::BelowSimilarityCutoff { similarity, cutoff });
  }

  let fitness = geo_fitness(area, &record.district, false);
  let score = query.weights.score(similarity, fitness);

  Assessment::Accepted(CompetitorScore::new(record, similarity, fitness, score, MatchType::from_depth(depth)))
}

fn assess_around(record: &StoreRecord, industry: &str, chain: &[&str], query: &DistanceSearch) -> Assessment {
  if let Some(defect) = record.defect() {
    return skip(record, SkipReason::Malformed(defect));
  }

  if record.review_count < query.min_review_count {
    return skip(
      record,
      SkipReason::BelowReviewFloor {
        count: record.review_count,
        floor: query.min_review_count,
      },
    );
  }

  let Some(coordinates) = record.coordinates else {
    return skip(record, SkipReason::MissingCoordinates);
  };

  let distance = query.origin.distance_to(&coordinates);

  if distance > query.max_distance {
    return skip(record, SkipReason::OutOfRange { distance, max: query.max_distance });
  }

  let (similarity, _) = best_match(industry, chain, &record.industry);

  if similarity < query.min_similarity {
    return skip(
      record,
      SkipReason::BelowSimilarityCutoff {
        similarity,
        cutoff: query.min_similarity,
      },
    );
  }

  let fitness = geo_fitness_from_distance(distance);
  let score = query.weights.score(similarity, fitness);

  Assessment::Accepted(CompetitorScore::new(record, similarity, fitness, score, MatchType::Distance(distance)))
}

fn skip(record: &StoreRecord, reason: SkipReason) -> Assessment {
  Assessment::Skipped {
    place_id: record.place_id.clone(),
    reason,
  }
}

fn partition(assessments: impl Iterator<Item = Assessment>) -> (Vec<CompetitorScore>, Vec<(String, SkipReason)>) {
  assessments.partition_map(|assessment| match assessment {
    Assessment::Accepted(score) => itertools::Either::Left(score),
    Assessment::Skipped { place_id, reason } => itertools::Either::Right((place_id, reason)),
  })
}

fn distinct(accepted: &[CompetitorScore]) -> usize {
  accepted.iter().map(|score| score.place_id.as_str()).unique().count()
}

fn report_skipped(skipped: &[(String, SkipReason)]) {
  for (place_id, reason) in skipped {
    tracing::debug!(place_id, reason = reason.to_string(), "skipped candidate");

    counter!("rivalry_candidates_skipped_total", "reason" => reason.kind()).increment(1);
  }
}

#[cfg(test)]
mod tests {
  use float_cmp::approx_eq;

  use crate::{
    model::{Assessment, Coordinates, MatchType, SkipReason},
    scoring::Weights,
    tests::{north_of, store},
  };

  use super::{AreaSearch, DistanceSearch, assess_around, best_match, search_by_area, search_by_distance};

  const ORIGIN: (f64, f64) = (37.5188, 127.0469);

  #[test]
  fn best_match_prefers_shallowest_label() {
    let chain = ["오마카세", "스시", "일식", "음식점"];

    assert_eq!(best_match("오마카세", &chain, "오마카세"), (1.0, 0));
    assert_eq!(best_match("오마카세", &chain, "스시"), (0.95, 1));
    assert_eq!(best_match("오마카세", &chain, "퓨전일식"), (0.40, 2));
    assert_eq!(best_match("오마카세", &chain, "꽃집"), (0.0, 0));
  }

  #[test]
  fn exact_match_ranks_first() {
    let pool = vec![
      store("ramen").industry("라멘").district("홍대").review_count(900).call(),
      store("sushi").industry("스시").review_count(500).call(),
      store("omakase").industry("오마카세").review_count(120).call(),
    ];

    let results = search_by_area(&pool, &AreaSearch::builder().area("청담동").industry("오마카세").build());

    assert_eq!(results[0].place_id, "omakase");
    assert_eq!(results[0].industry_similarity, 1.0);
    assert_eq!(results[0].geo_fitness, 1.0);
    assert_eq!(results[0].match_type, MatchType::Exact);
    assert_eq!(results[1].place_id, "sushi");
    assert_eq!(results[1].match_type, MatchType::Similar);
  }

  #[test]
  fn review_floor_is_enforced() {
    let pool = vec![store("tiny").industry("오마카세").review_count(5).call(), store("big").industry("오마카세").review_count(30).call()];

    let results = search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").build());

    assert_eq!(results.iter().map(|score| score.place_id.as_str()).collect::<Vec<_>>(), vec!["big"]);
  }

  #[test]
  fn invalid_or_empty_inputs() {
    let pool = vec![store("1").industry("오마카세").call()];

    assert!(search_by_area(&pool, &AreaSearch::builder().area(" ").industry("오마카세").build()).is_empty());
    assert!(search_by_area(&pool, &AreaSearch::builder().area("청담").industry("").build()).is_empty());
    assert!(search_by_area(&[], &AreaSearch::builder().area("청담").industry("오마카세").build()).is_empty());
  }

  #[test]
  fn dynamic_cutoff_rescans_pool() {
    let pool = vec![store("omakase").industry("오마카세").call(), store("fusion").industry("퓨전일식").call()];

    let strict = search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").dynamic_cutoff(false).build());
    let relaxed = search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").build());

    assert_eq!(strict.len(), 1);
    assert_eq!(relaxed.len(), 2);
    assert!(approx_eq!(f64, relaxed[1].industry_similarity, 0.40));
  }

  #[test]
  fn cutoff_is_monotonic() {
    let pool = ["오마카세", "스시", "일식", "라멘", "이자카야", "술집", "중식", "퓨전일식", "카페", "떡볶이"]
      .iter()
      .enumerate()
      .map(|(index, industry)| store(&index.to_string()).industry(industry).call())
      .collect::<Vec<_>>();

    let search = |cutoff: f64| {
      let results = search_by_area(
        &pool,
        &AreaSearch::builder().area("청담").industry("오마카세").limit(100).min_similarity(cutoff).dynamic_cutoff(false).build(),
      );

      results.into_iter().map(|score| score.place_id).collect::<Vec<_>>()
    };

    for (low, high) in [(0.0, 0.3), (0.3, 0.5), (0.5, 0.7), (0.7, 0.9), (0.9, 1.0)] {
      let (low, high) = (search(low), search(high));

      assert!(high.len() <= low.len());
      assert!(high.iter().all(|id| low.contains(id)));
    }
  }

  #[test]
  fn equal_scores_are_ordered_by_reviews_then_id() {
    let pool = vec![
      store("b").industry("오마카세").review_count(50).call(),
      store("a").industry("오마카세").review_count(50).call(),
      store("c").industry("오마카세").review_count(80).call(),
    ];

    let results = search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").build());

    assert_eq!(results.iter().map(|score| score.place_id.as_str()).collect::<Vec<_>>(), vec!["c", "a", "b"]);
  }

  #[test]
  fn duplicates_and_limit() {
    let pool = (0..10).map(|_| store("same").industry("오마카세").call()).collect::<Vec<_>>();

    assert_eq!(search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").build()).len(), 1);

    let pool = (0..10).map(|index| store(&index.to_string()).industry("오마카세").call()).collect::<Vec<_>>();

    assert_eq!(search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").limit(3).build()).len(), 3);
  }

  #[test]
  fn distance_radius() {
    let pool = vec![
      store("near").industry("오마카세").coordinates((north_of(ORIGIN.0, 0.3), ORIGIN.1)).call(),
      store("far").industry("오마카세").coordinates((north_of(ORIGIN.0, 6.0), ORIGIN.1)).call(),
      store("nowhere").industry("오마카세").call(),
    ];

    let results = search_by_distance(&pool, &DistanceSearch::builder().origin(Coordinates::new(ORIGIN.0, ORIGIN.1)).industry("오마카세").build());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place_id, "near");
    assert_eq!(results[0].geo_fitness, 1.0);
    assert_eq!(results[0].match_type.to_string(), "0.30km");
  }

  #[test]
  fn closer_wins_among_equal_scores() {
    let pool = vec![
      store("far").industry("오마카세").review_count(500).coordinates((north_of(ORIGIN.0, 1.5), ORIGIN.1)).call(),
      store("close").industry("오마카세").review_count(50).coordinates((north_of(ORIGIN.0, 0.2), ORIGIN.1)).call(),
    ];

    let search = DistanceSearch::builder().origin(Coordinates::new(ORIGIN.0, ORIGIN.1)).industry("오마카세").weights(crate::scoring::Weights { industry: 1.0, geo: 0.0 }).build();
    let results = search_by_distance(&pool, &search);

    assert_eq!(results.iter().map(|score| score.place_id.as_str()).collect::<Vec<_>>(), vec!["close", "far"]);
  }

  #[test]
  fn distance_skip_reasons() {
    let query = DistanceSearch::builder().origin(Coordinates::new(ORIGIN.0, ORIGIN.1)).industry("오마카세").build();
    let chain = ["오마카세", "스시", "일식", "음식점"];

    let reason = |record| match assess_around(&record, "오마카세", &chain, &query) {
      Assessment::Skipped { reason, .. } => Some(reason.kind()),
      Assessment::Accepted(_) => None,
    };

    assert_eq!(reason(store("1").industry("오마카세").call()), Some("missing_coordinates"));
    assert_eq!(reason(store("2").industry("오마카세").review_count(3).coordinates(ORIGIN).call()), Some("review_floor"));
    assert_eq!(reason(store("3").industry("오마카세").coordinates((north_of(ORIGIN.0, 6.0), ORIGIN.1)).call()), Some("out_of_range"));
    assert_eq!(reason(store("4").industry("꽃집").coordinates(ORIGIN).call()), Some("similarity_cutoff"));
    assert_eq!(reason(store("5").industry("").coordinates(ORIGIN).call()), Some("malformed"));
    assert_eq!(reason(store("6").industry("스시").coordinates(ORIGIN).call()), None);

    assert!(matches!(
      assess_around(&store("7").industry("오마카세").coordinates((north_of(ORIGIN.0, 6.0), ORIGIN.1)).call(), "오마카세", &chain, &query),
      Assessment::Skipped {
        reason: SkipReason::OutOfRange { .. },
        ..
      }
    ));
  }

  #[test]
  fn invalid_origin() {
    let pool = vec![store("1").industry("오마카세").coordinates(ORIGIN).call()];

    assert!(search_by_distance(&pool, &DistanceSearch::builder().origin(Coordinates::new(120.0, 0.0)).industry("오마카세").build()).is_empty());
  }

  #[test]
  fn duplicated_candidates_do_not_block_relaxation() {
    let pool = vec![store("omakase").industry("오마카세").call(), store("omakase").industry("오마카세").call(), store("fusion").industry("퓨전일식").call()];

    let results = search_by_area(&pool, &AreaSearch::builder().area("청담").industry("오마카세").limit(2).build());

    assert_eq!(results.iter().map(|score| score.place_id.as_str()).collect::<Vec<_>>(), vec!["omakase", "fusion"]);
  }

  #[test]
  fn invalid_radius() {
    let pool = vec![store("1").industry("오마카세").coordinates(ORIGIN).call()];
    let search = |max_distance: f64| search_by_distance(&pool, &DistanceSearch::builder().origin(Coordinates::new(ORIGIN.0, ORIGIN.1)).industry("오마카세").max_distance(max_distance).build());

    assert_eq!(search(1.0).len(), 1);
    assert_eq!(search(0.0).len(), 1);
    assert!(search(f64::NAN).is_empty());
    assert!(search(-1.0).is_empty());
    assert!(search(f64::INFINITY).is_empty());
  }

  #[test]
  fn non_positive_weights_are_rejected() {
    let pool = vec![store("sushi").industry("스시").call(), store("omakase").industry("오마카세").call()];
    let weights = Weights { industry: -1.0, geo: 1.0 };

    let query = AreaSearch::builder().area("청담").industry("오마카세").weights(weights).build();

    assert!(query.validate().is_err());
    assert!(search_by_area(&pool, &query).is_empty());

    let query = DistanceSearch::builder().origin(Coordinates::new(ORIGIN.0, ORIGIN.1)).industry("오마카세").weights(weights).build();

    assert!(query.validate().is_err());
  }
}
