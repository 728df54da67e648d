#[derive(Debug, thiserror::Error)]
pub enum RivalryError {
  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("invalid query: {0}")]
  InvalidQuery(&'static str),
  #[error(transparent)]
  CatalogError(#[from] sqlx::Error),
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),
}
