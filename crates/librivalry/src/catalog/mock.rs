use std::cmp::Reverse;

use crate::{
  catalog::{CatalogQuery, StoreCatalog},
  error::RivalryError,
  model::StoreRecord,
};

/// In-memory catalog, applying the same filters and ordering as a real one.
#[derive(Clone, Debug, Default)]
pub struct MockedCatalog {
  stores: Vec<StoreRecord>,
  failing: bool,
}

impl MockedCatalog {
  pub fn with_stores(stores: Vec<StoreRecord>) -> MockedCatalog {
    MockedCatalog { stores, failing: false }
  }

  /// A catalog for which every call fails, as an unreachable database would.
  pub fn failing() -> MockedCatalog {
    MockedCatalog { stores: vec![], failing: true }
  }
}

impl StoreCatalog for MockedCatalog {
  async fn health(&self) -> Result<bool, RivalryError> {
    Ok(!self.failing)
  }

  async fn stores(&self, query: &CatalogQuery) -> Result<Vec<StoreRecord>, RivalryError> {
    if self.failing {
      return Err(RivalryError::CatalogError(sqlx::Error::PoolTimedOut));
    }

    let mut stores = self
      .stores
      .iter()
      .filter(|store| store.review_count >= query.min_review_count)
      .filter(|store| !query.require_coordinates || store.coordinates.is_some())
      .cloned()
      .collect::<Vec<_>>();

    stores.sort_by_key(|store| Reverse(store.review_count));

    Ok(stores)
  }
}
