use axum::{
  Router,
  http::StatusCode,
  middleware,
  routing::{get, post},
};
use librivalry::prelude::*;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{api::config::Config, trace};

pub mod config;
pub mod dto;
pub mod errors;

pub mod handlers;
pub(crate) mod middlewares;

#[derive(Clone)]
pub struct AppState<C: StoreCatalog> {
  pub config: Config,
  pub prometheus: Option<PrometheusHandle>,
  pub rivalry: Rivalry<C>,
}

pub async fn routes<C: StoreCatalog>(config: &Config, catalog: C) -> anyhow::Result<Router> {
  let prometheus = if config.enable_prometheus { Some(trace::build_prometheus()?) } else { None };

  let state = AppState {
    config: config.clone(),
    prometheus,
    rivalry: Rivalry::new(catalog),
  };

  Ok(router(state))
}

pub fn router<C: StoreCatalog>(state: AppState<C>) -> Router {
  Router::new()
    .route("/competitors", post(handlers::diversified_competitors::<C>))
    .route("/competitors/area", post(handlers::area_competitors::<C>))
    .route("/competitors/distance", post(handlers::distance_competitors::<C>))
    .route("/areas/normalize", get(handlers::normalize_area))
    .route("/industries/similarity", get(handlers::industry_similarity))
    .fallback(handlers::not_found)
    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, state.config.request_timeout))
    .layer(middleware::from_fn(middlewares::metrics))
    .layer(TraceLayer::new_for_http().make_span_with(middlewares::create_request_span))
    .layer(middleware::from_fn_with_state(state.clone(), middlewares::logging::api_logger::<C>))
    // The routes below will not go through the observability middlewares above
    .route("/healthz", get(handlers::healthz))
    .route("/readyz", get(handlers::readyz::<C>))
    .route("/metrics", get(handlers::prometheus::<C>))
    .layer(middleware::from_fn(middlewares::request_id))
    .with_state(state)
}
