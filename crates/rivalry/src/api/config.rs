use std::{
  env::{self, VarError},
  fmt::Display,
  str::FromStr,
  time::Duration,
};

use librivalry::prelude::*;

use crate::api::errors::AppError;

#[derive(Clone, Debug)]
pub struct Config {
  pub env: Env,
  pub listen_addr: String,
  pub request_timeout: Duration,

  // Store catalog
  pub database_url: String,
  pub database_max_connections: u32,

  // Search defaults
  pub min_review_count: u32,
  pub min_similarity: f64,
  pub min_competition_score: f64,
  pub max_distance: f64,

  // Debugging
  pub enable_tracing: bool,
  pub enable_prometheus: bool,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      env: Env::Dev,
      listen_addr: "0.0.0.0:8000".into(),
      request_timeout: Duration::from_secs(30),
      database_url: "sqlite://seoul_industry_reviews.db".into(),
      database_max_connections: 4,
      min_review_count: DEFAULT_MIN_REVIEW_COUNT,
      min_similarity: DEFAULT_MIN_SIMILARITY,
      min_competition_score: DEFAULT_MIN_COMPETITION_SCORE,
      max_distance: DEFAULT_MAX_DISTANCE_KM,
      enable_tracing: false,
      enable_prometheus: false,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Config, AppError> {
    let defaults = Config::default();

    let config = Config {
      env: Env::from(env::var("ENV").unwrap_or("dev".into())),
      listen_addr: env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
      request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT", 30)?),
      database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
      database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
      min_review_count: parse_env("MIN_REVIEW_COUNT", defaults.min_review_count)?,
      min_similarity: parse_env("MIN_SIMILARITY", defaults.min_similarity)?,
      min_competition_score: parse_env("MIN_COMPETITION_SCORE", defaults.min_competition_score)?,
      max_distance: parse_env("MAX_DISTANCE_KM", defaults.max_distance)?,
      enable_tracing: env::var("ENABLE_TRACING").unwrap_or_default() == "1",
      enable_prometheus: env::var("ENABLE_PROMETHEUS").unwrap_or_default() == "1",
    };

    if !(0.0..=1.0).contains(&config.min_similarity) {
      return Err(AppError::ConfigError("MIN_SIMILARITY must be between 0 and 1".into()));
    }

    if !(0.0..=1.0).contains(&config.min_competition_score) {
      return Err(AppError::ConfigError("MIN_COMPETITION_SCORE must be between 0 and 1".into()));
    }

    if !config.max_distance.is_finite() || config.max_distance <= 0.0 {
      return Err(AppError::ConfigError("MAX_DISTANCE_KM must be a positive number".into()));
    }

    if config.database_max_connections == 0 {
      return Err(AppError::ConfigError("DATABASE_MAX_CONNECTIONS cannot be zero".into()));
    }

    Ok(config)
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Env {
  Dev,
  Production,
}

impl From<String> for Env {
  fn from(value: String) -> Self {
    match value.as_ref() {
      "dev" => Env::Dev,
      "production" => Env::Production,
      _ => Env::Dev,
    }
  }
}

pub fn parse_env<T>(name: &str, default: T) -> Result<T, AppError>
where
  T: FromStr,
  T::Err: Display,
{
  match env::var(name) {
    Ok(value) if value.is_empty() => Ok(default),
    Ok(value) => value.parse::<T>().map_err(|err| AppError::ConfigError(format!("could not read {name}: {err}"))),
    Err(err) => match err {
      VarError::NotPresent => Ok(default),
      _ => Err(AppError::ConfigError(format!("could not read {name}: {err}"))),
    },
  }
}
