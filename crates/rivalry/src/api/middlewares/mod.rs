use std::fmt;

use axum::{
  body::Body,
  extract::MatchedPath,
  http::{HeaderName, HeaderValue, Request, StatusCode},
  middleware::Next,
  response::Response,
};
use metrics::counter;
use opentelemetry::global;
use opentelemetry_http::HeaderExtractor;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

pub(crate) mod json_rejection;
pub(crate) mod logging;

pub(crate) const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Identifier attached to every request and echoed back in `x-request-id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RequestId(pub Uuid);

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.as_hyphenated().fmt(f)
  }
}

pub(crate) async fn request_id(mut request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
  let request_id = RequestId(Uuid::new_v4());

  request.extensions_mut().insert(request_id);

  let mut response = next.run(request).await;

  if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
  }

  response.extensions_mut().insert(request_id);

  Ok(response)
}

/// Count requests by route template. Requests matching no route are labelled
/// `unmatched`.
pub(super) async fn metrics(request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
  let route = match request.extensions().get::<MatchedPath>() {
    Some(path) => path.as_str().to_string(),
    None => "unmatched".to_string(),
  };

  let response = next.run(request).await;

  counter!("http_requests_total", "path" => route, "status" => response.status().as_u16().to_string()).increment(1);

  Ok(response)
}

pub(crate) fn create_request_span(req: &axum::extract::Request) -> Span {
  let parent = global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(req.headers())));
  let request_id = req.extensions().get::<RequestId>().map(RequestId::to_string).unwrap_or_default();
  let span = tracing::info_span!("request", request_id);

  let _ = span.set_parent(parent);
  span
}
