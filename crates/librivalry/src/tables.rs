use std::{collections::HashMap, sync::LazyLock};

use ahash::RandomState;
use rust_embed::Embed;
use serde::Deserialize;

#[derive(Embed)]
#[folder = "./assets"]
struct Tables;

pub(crate) static AREAS: LazyLock<AreaTables> = LazyLock::new(|| {
  tracing::debug!("building area tables");

  let file = Tables::get("areas.yml").expect("could not read area tables");
  let raw = serde_yaml::from_slice::<RawAreaTables>(&file.data).expect("could not unmarshal area tables");

  AreaTables::from(raw)
});

pub(crate) static INDUSTRIES: LazyLock<IndustryTables> = LazyLock::new(|| {
  tracing::debug!("building industry tables");

  let file = Tables::get("industries.yml").expect("could not read industry tables");
  let raw = serde_yaml::from_slice::<RawIndustryTables>(&file.data).expect("could not unmarshal industry tables");

  IndustryTables::from(raw)
});

#[derive(Deserialize)]
struct RawAreaTables {
  stations: Vec<(String, String)>,
  groups: Vec<AreaGroup>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AreaGroup {
  pub name: String,
  pub areas: Vec<String>,
}

pub(crate) struct AreaTables {
  /// Station and neighbourhood names in declaration order.
  pub stations: Vec<(String, String)>,
  pub groups: Vec<AreaGroup>,

  station_index: HashMap<String, usize, RandomState>,
  group_index: HashMap<String, usize, RandomState>,
}

impl From<RawAreaTables> for AreaTables {
  fn from(raw: RawAreaTables) -> Self {
    let mut station_index = HashMap::default();
    let mut group_index = HashMap::default();

    for (index, (key, _)) in raw.stations.iter().enumerate() {
      station_index.entry(key.clone()).or_insert(index);
    }

    // An area is expected to belong to a single group, the first declaration wins.
    for (index, group) in raw.groups.iter().enumerate() {
      for area in &group.areas {
        group_index.entry(area.clone()).or_insert(index);
      }
    }

    AreaTables {
      stations: raw.stations,
      groups: raw.groups,
      station_index,
      group_index,
    }
  }
}

impl AreaTables {
  pub fn station(&self, name: &str) -> Option<&str> {
    self.station_index.get(name).map(|index| self.stations[*index].1.as_str())
  }

  pub fn group_of(&self, area: &str) -> Option<&AreaGroup> {
    self.group_index.get(area).map(|index| &self.groups[*index])
  }
}

#[derive(Deserialize)]
struct RawIndustryTables {
  hierarchy: HashMap<String, Vec<String>, RandomState>,
  similarity: Vec<(String, String, f64)>,
  keywords: Vec<(String, f64)>,
}

pub(crate) struct IndustryTables {
  pub hierarchy: HashMap<String, Vec<String>, RandomState>,
  pub keywords: Vec<(String, f64)>,

  pairs: HashMap<String, HashMap<String, f64, RandomState>, RandomState>,
}

impl From<RawIndustryTables> for IndustryTables {
  fn from(raw: RawIndustryTables) -> Self {
    let mut pairs: HashMap<String, HashMap<String, f64, RandomState>, RandomState> = HashMap::default();

    for (lhs, rhs, score) in &raw.similarity {
      pairs.entry(lhs.clone()).or_default().insert(rhs.clone(), *score);
    }

    // Mirrored entries never shadow a pair that was declared explicitly.
    for (lhs, rhs, score) in &raw.similarity {
      pairs.entry(rhs.clone()).or_default().entry(lhs.clone()).or_insert(*score);
    }

    IndustryTables {
      hierarchy: raw.hierarchy,
      keywords: raw.keywords,
      pairs,
    }
  }
}

impl IndustryTables {
  pub fn pair(&self, lhs: &str, rhs: &str) -> Option<f64> {
    self.pairs.get(lhs).and_then(|scores| scores.get(rhs)).copied()
  }

  pub fn chain(&self, industry: &str) -> Option<&[String]> {
    self.hierarchy.get(industry).map(Vec::as_slice)
  }
}
