use std::str::FromStr;

use bon::bon;
use sqlx::{
  Row,
  sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::{
  catalog::{CatalogQuery, StoreCatalog},
  error::RivalryError,
  model::{Coordinates, StoreRecord},
};

const STORES_QUERY: &str = "SELECT place_id, name, district, industry, review_count, latitude, longitude FROM stores WHERE review_count >= ?";
const LOCATED_FILTER: &str = " AND latitude IS NOT NULL AND longitude IS NOT NULL";
const ORDERING: &str = " ORDER BY review_count DESC";

/// Read-only catalog backed by the `stores` table of the review database.
#[derive(Clone, Debug)]
pub struct SqliteCatalog {
  pool: SqlitePool,
}

#[bon]
impl SqliteCatalog {
  /// Open a read-only connection pool to the database at `url`.
  #[builder(finish_fn = build)]
  pub async fn connect(#[builder(start_fn, into)] url: String, #[builder(default = 4)] max_connections: u32) -> Result<SqliteCatalog, RivalryError> {
    let options = SqliteConnectOptions::from_str(&url)?.read_only(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;

    tracing::info!(url, max_connections, "connected to store catalog");

    Ok(SqliteCatalog { pool })
  }
}

impl SqliteCatalog {
  pub fn from_pool(pool: SqlitePool) -> SqliteCatalog {
    SqliteCatalog { pool }
  }
}

impl StoreCatalog for SqliteCatalog {
  async fn health(&self) -> Result<bool, RivalryError> {
    sqlx::query("SELECT 1 FROM stores LIMIT 1").fetch_optional(&self.pool).await?;

    Ok(true)
  }

  #[tracing::instrument(name = "fetch_stores", skip_all, fields(min_review_count = query.min_review_count, require_coordinates = query.require_coordinates))]
  async fn stores(&self, query: &CatalogQuery) -> Result<Vec<StoreRecord>, RivalryError> {
    let sql = if query.require_coordinates {
      format!("{STORES_QUERY}{LOCATED_FILTER}{ORDERING}")
    } else {
      format!("{STORES_QUERY}{ORDERING}")
    };

    let rows = sqlx::query(&sql).bind(i64::from(query.min_review_count)).fetch_all(&self.pool).await?;
    let total = rows.len();

    let stores = rows
      .iter()
      .filter_map(|row| match row_to_store(row) {
        Ok(store) => Some(store),

        Err(err) => {
          tracing::warn!(error = err.to_string(), "skipping unreadable store row");
          None
        }
      })
      .collect::<Vec<_>>();

    tracing::debug!(total, readable = stores.len(), "fetched stores from catalog");

    Ok(stores)
  }
}

fn row_to_store(row: &SqliteRow) -> Result<StoreRecord, sqlx::Error> {
  let place_id: String = row.try_get("place_id")?;
  let review_count: i64 = row.try_get("review_count")?;
  let latitude: Option<f64> = row.try_get("latitude")?;
  let longitude: Option<f64> = row.try_get("longitude")?;

  let coordinates = match (latitude, longitude) {
    (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
    (None, None) => None,

    _ => {
      tracing::debug!(place_id, "store has a single coordinate, ignoring both");
      None
    }
  };

  Ok(StoreRecord {
    review_count: u32::try_from(review_count).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
    name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
    district: row.try_get::<Option<String>, _>("district")?.unwrap_or_default(),
    industry: row.try_get::<Option<String>, _>("industry")?.unwrap_or_default(),
    place_id,
    coordinates,
  })
}

#[cfg(test)]
mod tests {
  use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

  use crate::{
    catalog::{CatalogQuery, StoreCatalog},
    model::Coordinates,
  };

  use super::SqliteCatalog;

  async fn database() -> SqlitePool {
    let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();

    sqlx::query("CREATE TABLE stores (place_id TEXT PRIMARY KEY, name TEXT, district TEXT, industry TEXT, review_count INTEGER, latitude REAL, longitude REAL, address TEXT)")
      .execute(&pool)
      .await
      .unwrap();

    sqlx::query(
      "INSERT INTO stores VALUES
        ('1', '스시 오마카세', '청담', '오마카세', 120, 37.5240, 127.0470, NULL),
        ('2', '동네 이자카야', '청담', '이자카야', 80, NULL, NULL, NULL),
        ('3', '작은 스시', '압구정', '스시', 10, 37.5270, 127.0280, NULL),
        ('4', '반쪽 좌표', '신사', '스시', 45, 37.5200, NULL, NULL),
        ('5', '좌표 오류', '신사', '스시', 50, 'north', 127.0200, NULL),
        ('6', '이름 없음', NULL, '라멘', 300, 37.5100, 127.0400, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
  }

  #[tokio::test]
  async fn stores_are_filtered_and_ordered() {
    let catalog = SqliteCatalog::from_pool(database().await);

    let stores = catalog
      .stores(&CatalogQuery {
        min_review_count: 30,
        require_coordinates: false,
      })
      .await
      .unwrap();

    assert_eq!(stores.iter().map(|store| store.place_id.as_str()).collect::<Vec<_>>(), vec!["6", "1", "2", "4"]);
    assert_eq!(stores[0].district, "");
    assert_eq!(stores[1].coordinates, Some(Coordinates::new(37.5240, 127.0470)));
    assert_eq!(stores[3].coordinates, None);
  }

  #[tokio::test]
  async fn located_stores_only() {
    let catalog = SqliteCatalog::from_pool(database().await);

    let stores = catalog
      .stores(&CatalogQuery {
        min_review_count: 0,
        require_coordinates: true,
      })
      .await
      .unwrap();

    assert_eq!(stores.iter().map(|store| store.place_id.as_str()).collect::<Vec<_>>(), vec!["6", "1", "3"]);
  }

  #[tokio::test]
  async fn unreadable_rows_are_skipped() {
    let catalog = SqliteCatalog::from_pool(database().await);

    let stores = catalog
      .stores(&CatalogQuery {
        min_review_count: 0,
        require_coordinates: false,
      })
      .await
      .unwrap();

    assert_eq!(stores.len(), 5);
    assert!(stores.iter().all(|store| store.place_id != "5"));
  }

  #[tokio::test]
  async fn health() {
    let catalog = SqliteCatalog::from_pool(database().await);

    assert!(catalog.health().await.unwrap());

    let empty = SqliteCatalog::from_pool(SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap());

    assert!(empty.health().await.is_err());
  }
}
