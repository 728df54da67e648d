use crate::{
  catalog::{CatalogQuery, StoreCatalog},
  diversify::{self, DiversifiedSearch},
  error::RivalryError,
  model::{CompetitorScore, Shortlist, StoreRecord},
  search::{self, AreaSearch, DistanceSearch},
};

/// The main entrypoint for using the rivalry library.
///
/// `Rivalry` fetches a candidate pool from a [`StoreCatalog`] for every call,
/// then ranks it. Failures of the catalog are logged and result in an empty
/// list, so a caller only ever has to deal with a (possibly short) result.
///
/// # Examples
///
/// ```rust
/// # use librivalry::prelude::*;
///
/// # tokio_test::block_on(async {
///   let catalog = MockedCatalog::with_stores(vec![
///     StoreRecord::builder().place_id("1").district("청담").industry("스시").review_count(120).build(),
///   ]);
///
///   let rivalry = Rivalry::new(catalog);
///   let competitors = rivalry.search_by_area(&AreaSearch::builder().area("청담동").industry("오마카세").build()).await;
///
///   for competitor in competitors {
///     println!("{} ({}): {:.3}", competitor.name, competitor.match_type, competitor.competition_score);
///   }
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Rivalry<C: StoreCatalog> {
  catalog: C,
}

impl<C: StoreCatalog> Rivalry<C> {
  /// Create a new instance over the given catalog.
  ///
  /// Lookup tables are initialized on first use, only once in the lifetime of
  /// the program. This struct can be safely cloned and sent across thread
  /// boundaries.
  pub fn new(catalog: C) -> Rivalry<C> {
    crate::init();

    Rivalry { catalog }
  }

  /// Retrieve the backing catalog availability.
  pub async fn health(&self) -> Result<bool, RivalryError> {
    self.catalog.health().await
  }

  pub async fn search_by_area(&self, query: &AreaSearch) -> Vec<CompetitorScore> {
    let pool = self.pool(query.min_review_count, false).await;

    search::search_by_area(&pool, query)
  }

  pub async fn search_by_distance(&self, query: &DistanceSearch) -> Vec<CompetitorScore> {
    let pool = self.pool(query.min_review_count, true).await;

    search::search_by_distance(&pool, query)
  }

  /// Build a diversified shortlist, see [`diversify::find_diversified`].
  ///
  /// The catalog is queried once, located and unlocated stores alike, and the
  /// pool is shared by every selection strategy.
  pub async fn find_diversified(&self, query: &DiversifiedSearch) -> Shortlist {
    let pool = self.pool(query.min_review_count, false).await;

    diversify::find_diversified(&pool, query)
  }

  async fn pool(&self, min_review_count: u32, require_coordinates: bool) -> Vec<StoreRecord> {
    let query = CatalogQuery {
      min_review_count,
      require_coordinates,
    };

    match self.catalog.stores(&query).await {
      Ok(stores) => {
        if stores.is_empty() {
          tracing::warn!(min_review_count, require_coordinates, "catalog returned no store");
        }

        stores
      }

      Err(err) => {
        tracing::error!(error = err.to_string(), "could not fetch stores from catalog");

        vec![]
      }
    }
  }
}
