pub mod mock;
pub mod sqlite;

use crate::{error::RivalryError, model::StoreRecord};

/// Filter applied by the catalog when building a candidate pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
  pub min_review_count: u32,
  /// Only return stores with both coordinates set.
  pub require_coordinates: bool,
}

/// Source of candidate stores.
///
/// Implementations return every store matching the query, ordered by review
/// count, most reviewed first. They are read-only from the engine's point of
/// view.
#[allow(async_fn_in_trait)]
pub trait StoreCatalog: Clone + Send + Sync + 'static {
  fn health(&self) -> impl Future<Output = Result<bool, RivalryError>> + Send;
  fn stores(&self, query: &CatalogQuery) -> impl Future<Output = Result<Vec<StoreRecord>, RivalryError>> + Send;
}
