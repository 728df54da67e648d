use serde::Serialize;

use crate::tables::AREAS;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// How close two areas are, as a customer would perceive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTier {
  SameStrip,
  SameZone,
  NearbyZone,
  Adjacent,
}

impl GeoTier {
  pub fn score(&self) -> f64 {
    match self {
      GeoTier::SameStrip => 1.0,
      GeoTier::SameZone => 0.85,
      GeoTier::NearbyZone => 0.60,
      GeoTier::Adjacent => 0.40,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      GeoTier::SameStrip => "동일 스트립/단지",
      GeoTier::SameZone => "같은 권역·도보 10분",
      GeoTier::NearbyZone => "인접 권역·도보 15분",
      GeoTier::Adjacent => "인접 지역·대중교통",
    }
  }

  fn barrier_factor(&self) -> f64 {
    match self {
      GeoTier::SameStrip => 1.0,
      GeoTier::SameZone | GeoTier::NearbyZone => 0.75,
      GeoTier::Adjacent => 0.60,
    }
  }
}

/// Classify the relationship between two canonical area labels.
pub fn geo_tier(lhs: &str, rhs: &str) -> GeoTier {
  if lhs == rhs {
    return GeoTier::SameStrip;
  }

  match (AREAS.group_of(lhs), AREAS.group_of(rhs)) {
    (Some(left), Some(right)) if left.name == right.name && left.name.contains("핵심") => GeoTier::SameZone,
    (Some(left), Some(right)) if left.name == right.name => GeoTier::NearbyZone,

    (Some(left), Some(right)) if group_prefix(&left.name) == group_prefix(&right.name) => GeoTier::NearbyZone,

    _ => GeoTier::Adjacent,
  }
}

/// Score how likely customers of one area also frequent the other.
///
/// A physical barrier (river, highway, ...) between two distinct areas dampens
/// the score.
pub fn geo_fitness(lhs: &str, rhs: &str, has_barrier: bool) -> f64 {
  let tier = geo_tier(lhs, rhs);

  if has_barrier { tier.score() * tier.barrier_factor() } else { tier.score() }
}

/// Step function mapping a distance in kilometers to a fitness score.
pub fn geo_fitness_from_distance(km: f64) -> f64 {
  match km {
    km if km < 0.5 => 1.0,
    km if km < 1.0 => 0.8,
    km if km < 2.0 => 0.6,
    km if km < 5.0 => 0.3,
    _ => 0.1,
  }
}

/// Haversine great-circle distance between two lat/lng points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
  let d_lat = (lat2 - lat1).to_radians();
  let d_lng = (lng2 - lng1).to_radians();

  let a = (d_lat / 2.0).sin().powi(2) + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

  EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
}

// Zones sharing a stem (홍대핵심, 홍대확장) are considered neighbours.
fn group_prefix(name: &str) -> &str {
  ["핵심", "권", "확장"].iter().fold(name, |prefix, marker| prefix.split(marker).next().unwrap_or(prefix))
}
