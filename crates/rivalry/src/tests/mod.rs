use librivalry::prelude::*;

use crate::api::{AppState, config::Config};


pub(super) const ORIGIN: Coordinates = Coordinates {
  latitude: 37.5188,
  longitude: 127.0469,
};

fn record(place_id: &str, industry: &str, district: &str, review_count: u32, km_north: Option<f64>) -> StoreRecord {
  StoreRecord::builder()
    .place_id(place_id)
    .name(format!("{industry} {place_id}"))
    .district(district)
    .industry(industry)
    .review_count(review_count)
    .maybe_coordinates(km_north.map(|km| Coordinates::new(ORIGIN.latitude + km / 111.195, ORIGIN.longitude)))
    .build()
}

pub(super) fn catalog() -> MockedCatalog {
  MockedCatalog::with_stores(vec![
    record("omakase-1", "오마카세", "청담", 420, Some(0.2)),
    record("omakase-2", "오마카세", "압구정", 210, Some(1.2)),
    record("omakase-tiny", "오마카세", "청담", 5, Some(0.1)),
    record("sushi-1", "스시", "청담", 330, Some(0.6)),
    record("sushi-far", "스시", "잠실", 800, Some(6.0)),
    record("izakaya-1", "이자카야", "신사", 150, Some(2.5)),
    record("ramen-1", "라멘", "홍대", 90, None),
  ])
}

pub(super) fn state(config: Config, catalog: MockedCatalog) -> AppState<MockedCatalog> {
  AppState {
    config,
    prometheus: None,
    rivalry: Rivalry::new(catalog),
  }
}
