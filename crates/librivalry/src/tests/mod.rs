use crate::model::{Coordinates, StoreRecord};

#[bon::builder]
pub fn store(#[builder(start_fn)] place_id: &str, industry: &str, district: Option<&str>, review_count: Option<u32>, coordinates: Option<(f64, f64)>) -> StoreRecord {
  StoreRecord {
    place_id: place_id.to_string(),
    name: format!("{industry} {place_id}"),
    district: district.unwrap_or("청담").to_string(),
    industry: industry.to_string(),
    review_count: review_count.unwrap_or(100),
    coordinates: coordinates.map(|(latitude, longitude)| Coordinates::new(latitude, longitude)),
  }
}

/// A latitude `km` kilometers north of `latitude`.
pub fn north_of(latitude: f64, km: f64) -> f64 {
  latitude + km / 111.195
}
