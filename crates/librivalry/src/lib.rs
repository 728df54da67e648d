mod area;
mod diversify;
mod error;
mod model;
mod rivalry;
mod tables;

pub mod catalog;
pub mod geo;
pub mod scoring;
pub mod search;
pub mod similarity;

#[cfg(any(test, feature = "benchmarks"))]
#[doc(hidden)]
pub mod tests;

/// Force the initialization of the embedded lookup tables.
pub fn init() {
  let _ = *crate::tables::AREAS;
  let _ = *crate::tables::INDUSTRIES;
}

pub mod prelude {
  pub use crate::area::{extract_district, normalize_area};
  pub use crate::catalog::{CatalogQuery, StoreCatalog, mock::MockedCatalog, sqlite::SqliteCatalog};
  pub use crate::diversify::{DEFAULT_MIN_COMPETITION_SCORE, DiversifiedSearch, SHORTLIST_SIZE, find_diversified};
  pub use crate::error::RivalryError;
  pub use crate::geo::{GeoTier, geo_fitness, geo_fitness_from_distance, geo_tier, haversine_km};
  pub use crate::model::{Assessment, CompetitorScore, Coordinates, MatchType, Shortlist, SkipReason, StoreRecord};
  pub use crate::rivalry::Rivalry;
  pub use crate::scoring::{WeightProfile, Weights, competition_score};
  pub use crate::search::{AreaSearch, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MIN_REVIEW_COUNT, DEFAULT_MIN_SIMILARITY, DistanceSearch, search_by_area, search_by_distance};
  pub use crate::similarity::{broadening_chain, industry_similarity};
}
