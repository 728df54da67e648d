use std::fmt;

use bon::Builder;
use serde::{Deserialize, Serialize, Serializer};

use crate::geo;

/// A WGS-84 latitude/longitude pair, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Coordinates {
    Coordinates { latitude, longitude }
  }

  pub fn is_valid(&self) -> bool {
    self.latitude.is_finite() && self.longitude.is_finite() && (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
  }

  /// Great-circle distance to `other`, in kilometers.
  pub fn distance_to(&self, other: &Coordinates) -> f64 {
    geo::haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
  }
}

/// A store as listed in the catalog.
///
/// Records are read-only to the engine: they are handed in for the duration of
/// a search and copied into [`CompetitorScore`]s when they qualify.
#[derive(Builder, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct StoreRecord {
  #[builder(into)]
  pub place_id: String,
  #[builder(into, default)]
  pub name: String,
  #[builder(into)]
  pub district: String,
  #[builder(into)]
  pub industry: String,
  #[builder(default)]
  pub review_count: u32,
  pub coordinates: Option<Coordinates>,
}

impl StoreRecord {
  pub(crate) fn defect(&self) -> Option<&'static str> {
    if self.place_id.trim().is_empty() {
      return Some("missing place id");
    }

    if self.industry.trim().is_empty() {
      return Some("missing industry");
    }

    if let Some(coordinates) = &self.coordinates
      && !coordinates.is_valid()
    {
      return Some("coordinates out of range");
    }

    None
  }
}

/// Why a candidate matched, carried along for display purposes only.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchType {
  /// The candidate's best similarity came from the queried industry itself.
  Exact,
  /// Best similarity came from one or two steps up the broadening chain.
  Similar,
  /// Best similarity came from a distant ancestor of the queried industry.
  Substitute,
  /// Found through a distance search, the value is in kilometers.
  Distance(f64),
  /// Picked by a diversification strategy.
  Strategy { tag: &'static str, inner: Box<MatchType> },
  /// Added by the area-search backfill of a diversified search.
  Backfill { district: String },
}

impl MatchType {
  pub(crate) fn from_depth(depth: usize) -> MatchType {
    match depth {
      0 => MatchType::Exact,
      1..=2 => MatchType::Similar,
      _ => MatchType::Substitute,
    }
  }

  pub(crate) fn tagged(self, tag: &'static str) -> MatchType {
    MatchType::Strategy { tag, inner: Box::new(self) }
  }
}

impl fmt::Display for MatchType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MatchType::Exact => write!(f, "정확 일치"),
      MatchType::Similar => write!(f, "유사 업종"),
      MatchType::Substitute => write!(f, "대체 업종"),
      MatchType::Distance(km) => write!(f, "{km:.2}km"),
      MatchType::Strategy { tag, inner } => write!(f, "{tag} {inner}"),
      MatchType::Backfill { district } => write!(f, "텍스트기반 ({district})"),
    }
  }
}

impl Serialize for MatchType {
  fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_str(self)
  }
}

/// A scored competitor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompetitorScore {
  pub place_id: String,
  pub name: String,
  pub district: String,
  pub industry: String,
  pub review_count: u32,

  pub industry_similarity: f64,
  pub geo_fitness: f64,
  pub competition_score: f64,
  pub match_type: MatchType,
}

impl CompetitorScore {
  pub(crate) fn new(record: &StoreRecord, industry_similarity: f64, geo_fitness: f64, competition_score: f64, match_type: MatchType) -> CompetitorScore {
    CompetitorScore {
      place_id: record.place_id.clone(),
      name: record.name.clone(),
      district: record.district.clone(),
      industry: record.industry.clone(),
      review_count: record.review_count,
      industry_similarity,
      geo_fitness,
      competition_score,
      match_type,
    }
  }
}

/// Outcome of evaluating a single catalog record against a query.
#[derive(Clone, Debug, PartialEq)]
pub enum Assessment {
  Accepted(CompetitorScore),
  Skipped { place_id: String, reason: SkipReason },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SkipReason {
  #[error("{count} reviews is below the floor of {floor}")]
  BelowReviewFloor { count: u32, floor: u32 },
  #[error("industry similarity {similarity:.2} is below the cutoff of {cutoff:.2}")]
  BelowSimilarityCutoff { similarity: f64, cutoff: f64 },
  #[error("store has no coordinates")]
  MissingCoordinates,
  #[error("store is {distance:.2}km away, beyond {max:.2}km")]
  OutOfRange { distance: f64, max: f64 },
  #[error("malformed store record: {0}")]
  Malformed(&'static str),
}

impl SkipReason {
  pub fn kind(&self) -> &'static str {
    match self {
      SkipReason::BelowReviewFloor { .. } => "review_floor",
      SkipReason::BelowSimilarityCutoff { .. } => "similarity_cutoff",
      SkipReason::MissingCoordinates => "missing_coordinates",
      SkipReason::OutOfRange { .. } => "out_of_range",
      SkipReason::Malformed(_) => "malformed",
    }
  }
}

/// Result of a diversified search.
///
/// Holding fewer competitors than `target` is a valid outcome reflecting a
/// genuine lack of qualifying stores, callers are expected to surface it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Shortlist {
  pub competitors: Vec<CompetitorScore>,
  pub target: usize,
}

impl Shortlist {
  pub fn shortfall(&self) -> usize {
    self.target.saturating_sub(self.competitors.len())
  }
}
