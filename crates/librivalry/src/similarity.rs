use crate::tables::INDUSTRIES;

/// Label every unknown industry eventually broadens to.
pub const GENERIC_INDUSTRY: &str = "음식점";

/// Highest similarity two distinct labels can reach, so that `1.0` always
/// means the exact same industry.
pub(crate) const DISTINCT_LABEL_CEILING: f64 = 0.95;

/// Compute how interchangeable two industry labels are, from the customer's
/// point of view.
///
/// The score is symmetric and bounded to `[0, 1]`, with `1.0` reserved to
/// identical labels. Curated pairs take precedence, then the position of the
/// closest shared ancestor in both broadening chains, then broad keywords
/// found in both labels.
pub fn industry_similarity(lhs: &str, rhs: &str) -> f64 {
  if lhs == rhs {
    return 1.0;
  }

  let score = INDUSTRIES
    .pair(lhs, rhs)
    .or_else(|| hierarchy_similarity(lhs, rhs))
    .or_else(|| keyword_similarity(lhs, rhs))
    .unwrap_or(0.0);

  score.clamp(0.0, DISTINCT_LABEL_CEILING)
}

/// Ordered list of labels a query for `industry` may broaden to, most
/// specific first.
pub fn broadening_chain(industry: &str) -> Vec<&str> {
  match INDUSTRIES.chain(industry) {
    Some(chain) => chain.iter().map(String::as_str).collect(),
    None => vec![industry, GENERIC_INDUSTRY],
  }
}

fn hierarchy_similarity(lhs: &str, rhs: &str) -> Option<f64> {
  let lhs_chain = chain_or_self(lhs);
  let rhs_chain = chain_or_self(rhs);

  let lhs_depth = lhs_chain.iter().position(|label| rhs_chain.contains(label))?;
  let rhs_depth = rhs_chain.iter().position(|label| lhs_chain.contains(label))?;

  let depth = (lhs_depth + rhs_depth) as f64 / 2.0;

  let score = match depth {
    d if d == 0.0 => 0.85,
    d if d <= 1.0 => 0.70,
    d if d <= 2.0 => 0.55,
    d if d <= 3.0 => 0.40,
    _ => 0.25,
  };

  Some(score)
}

fn chain_or_self(industry: &str) -> Vec<&str> {
  match INDUSTRIES.chain(industry) {
    Some(chain) => chain.iter().map(String::as_str).collect(),
    None => vec![industry],
  }
}

fn keyword_similarity(lhs: &str, rhs: &str) -> Option<f64> {
  INDUSTRIES
    .keywords
    .iter()
    .find(|(keyword, _)| lhs.contains(keyword.as_str()) && rhs.contains(keyword.as_str()))
    .map(|(_, score)| *score)
}
