use std::collections::HashSet;

use librivalry::prelude::*;

const ORIGIN: Coordinates = Coordinates {
  latitude: 37.5188,
  longitude: 127.0469,
};

fn record(place_id: &str, industry: &str, district: &str, review_count: u32, km_north: Option<f64>) -> StoreRecord {
  StoreRecord {
    place_id: place_id.to_string(),
    name: format!("{industry} {place_id}"),
    district: district.to_string(),
    industry: industry.to_string(),
    review_count,
    coordinates: km_north.map(|km| Coordinates::new(ORIGIN.latitude + km / 111.195, ORIGIN.longitude)),
  }
}

fn catalog() -> MockedCatalog {
  MockedCatalog::with_stores(vec![
    record("omakase-1", "오마카세", "청담", 420, Some(0.2)),
    record("omakase-2", "오마카세", "압구정", 210, Some(1.2)),
    record("omakase-tiny", "오마카세", "청담", 5, Some(0.1)),
    record("sushi-1", "스시", "청담", 330, Some(0.6)),
    record("sushi-far", "스시", "잠실", 800, Some(6.0)),
    record("izakaya-1", "이자카야", "신사", 150, Some(2.5)),
    record("ramen-1", "라멘", "홍대", 90, None),
    record("cafe-1", "카페", "청담", 1000, Some(0.1)),
  ])
}

#[tokio::test]
async fn exact_match_comes_first() {
  let rivalry = Rivalry::new(catalog());
  let results = rivalry.search_by_area(&AreaSearch::builder().area("청담역").industry("오마카세").build()).await;

  assert_eq!(results[0].place_id, "omakase-1");
  assert_eq!(results[0].industry_similarity, 1.0);
  assert_eq!(results[0].match_type.to_string(), "정확 일치");
  assert!(results.iter().all(|score| score.place_id != "omakase-tiny"));
  assert!(results.iter().all(|score| score.place_id != "cafe-1"));
}

#[tokio::test]
async fn distance_search_respects_radius() {
  let rivalry = Rivalry::new(catalog());
  let results = rivalry.search_by_distance(&DistanceSearch::builder().origin(ORIGIN).industry("오마카세").build()).await;
  let ids = results.iter().map(|score| score.place_id.as_str()).collect::<Vec<_>>();

  assert!(!ids.contains(&"sushi-far"));
  assert!(!ids.contains(&"ramen-1"));
  assert!(!ids.contains(&"omakase-tiny"));
  assert_eq!(ids.first(), Some(&"omakase-1"));
}

#[tokio::test]
async fn diversified_shortlist_is_unique() {
  let rivalry = Rivalry::new(catalog());
  let shortlist = rivalry.find_diversified(&DiversifiedSearch::builder().origin(ORIGIN).area("청담").industry("오마카세").build()).await;

  let ids = shortlist.competitors.iter().map(|score| score.place_id.as_str()).collect::<HashSet<_>>();

  assert_eq!(ids.len(), shortlist.competitors.len());
  assert!(shortlist.competitors.len() <= shortlist.target);
  assert!(!ids.contains("omakase-tiny"));
}

#[tokio::test]
async fn scarcity_everywhere() {
  let rivalry = Rivalry::new(MockedCatalog::default());

  assert!(rivalry.search_by_area(&AreaSearch::builder().area("해운대").industry("떡볶이").build()).await.is_empty());
  assert!(rivalry.search_by_distance(&DistanceSearch::builder().origin(ORIGIN).industry("떡볶이").build()).await.is_empty());

  let shortlist = rivalry.find_diversified(&DiversifiedSearch::builder().area("해운대").industry("떡볶이").build()).await;

  assert!(shortlist.competitors.is_empty());
  assert_eq!(shortlist.shortfall(), SHORTLIST_SIZE);
}

#[test]
fn similarity_examples() {
  assert_eq!(industry_similarity("오마카세", "오마카세"), 1.0);
  assert!((industry_similarity("스시", "일식") - 0.70).abs() < 1e-9);
  assert_eq!(normalize_area("청담동"), "청담");
  assert_eq!(geo_fitness("청담", "청담", false), 1.0);
}
