use std::sync::LazyLock;

use regex::Regex;

use crate::tables::AREAS;

const LOCATIVE_SUFFIXES: [char; 4] = ['역', '동', '구', '로'];

static GU_DONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[가-힣]+구\s+([가-힣]+동)").unwrap());
static DONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([가-힣]+동)(?:[^가-힣]|$)").unwrap());
static GU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([가-힣]+구)").unwrap());

/// Map free-form user input (station, neighbourhood, suffixed variant) to the
/// canonical area label used in the catalog.
///
/// Input that cannot be resolved is returned unchanged (trimmed), on the
/// assumption that it is either already canonical or simply unknown.
pub fn normalize_area(input: &str) -> String {
  let input = input.trim();

  if input.is_empty() {
    return String::new();
  }

  match resolve_area(input) {
    Some(area) => area.to_string(),

    None => {
      tracing::warn!(input, "could not map area, using input as is");

      input.to_string()
    }
  }
}

fn resolve_area(input: &str) -> Option<&'static str> {
  lookup_area(input).or_else(|| {
    AREAS
      .stations
      .iter()
      .find(|(key, _)| input.contains(key.as_str()) || key.contains(input))
      .map(|(_, area)| area.as_str())
  })
}

fn lookup_area(input: &str) -> Option<&'static str> {
  if let Some(area) = AREAS.station(input) {
    return Some(area);
  }

  LOCATIVE_SUFFIXES.iter().find_map(|suffix| input.strip_suffix(*suffix).and_then(|base| AREAS.station(base)))
}

/// Extract an area label from a postal address or a short place hint.
///
/// Known station and neighbourhood names are looked up first, then the address
/// is searched for a `…구 …동` pair, a standalone `…동`, then a `…구`, each
/// capture being mapped to its canonical label when one exists. Substring
/// resolution only runs afterwards, so that `강남구 청담동` yields `청담` and not
/// the first station whose name appears in the address. As a last attempt,
/// `동` is appended to bare names (`성수` → `성수동`). When nothing matches, the
/// trimmed input is returned.
pub fn extract_district(address: &str) -> Option<String> {
  let address = address.trim();

  if address.is_empty() {
    return None;
  }

  if let Some(area) = lookup_area(address) {
    return Some(area.to_string());
  }

  for pattern in [&GU_DONG, &DONG, &GU] {
    if let Some(captures) = pattern.captures(address)
      && let Some(district) = captures.get(1)
    {
      let district = district.as_str();

      return Some(lookup_area(district).unwrap_or(district).to_string());
    }
  }

  if let Some(area) = resolve_area(address) {
    return Some(area.to_string());
  }

  if !address.ends_with(['동', '구', '역'])
    && let Some(area) = resolve_area(&format!("{address}동"))
  {
    return Some(area.to_string());
  }

  tracing::debug!(address, "could not extract district from address");

  Some(address.to_string())
}
