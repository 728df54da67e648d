use std::io::Write;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{
  Resource,
  metrics::MeterProviderBuilder,
  propagation::TraceContextPropagator,
  trace::{BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::config::{self, Config, Env};

pub fn build_prometheus() -> Result<PrometheusHandle, BuildError> {
  let builder = PrometheusBuilder::new()
    .add_global_label("service", "rivalry")
    .set_buckets_for_metric(Matcher::Full("rivalry_competition_scores".into()), &[0.1, 0.25, 0.5, 0.75, 0.9])?
    .set_buckets_for_metric(Matcher::Full("rivalry_search_latency_seconds".into()), &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05])?;

  builder.install_recorder()
}

pub struct TraceGuards {
  _logging: WorkerGuard,
  trace: Option<SdkTracerProvider>,
}

impl Drop for TraceGuards {
  fn drop(&mut self) {
    if let Some(provider) = &self.trace
      && let Err(err) = provider.shutdown()
    {
      eprintln!("could not shut down tracing provider: {err}");
    }
  }
}

pub fn init_tracing(config: &Config, writer: impl Write + Send + 'static) -> TraceGuards {
  let (appender, logging_guard) = tracing_appender::non_blocking(writer);

  let logging_formatter = match config.env {
    #[cfg(not(test))]
    Env::Dev => fmt::layer().compact().with_writer(appender).with_ansi(true).boxed(),
    Env::Production => json_subscriber::layer()
      .with_writer(appender)
      .flatten_event(true)
      .flatten_span_list_on_top_level(true)
      .with_current_span(false)
      .with_span_list(false)
      .boxed(),

    #[cfg(test)]
    Env::Dev => fmt::layer().compact().with_writer(appender).with_ansi(false).boxed(),
  };

  let guard = TraceGuards { _logging: logging_guard, trace: None };
  let (guard, tracing_layers) = tracing_layers(guard, config);
  let mut errors: Vec<anyhow::Error> = vec![];

  global::set_text_map_propagator(TraceContextPropagator::new());

  let filter = EnvFilter::builder().try_from_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let layers = filter.and_then(logging_formatter);

  let layers = match tracing_layers {
    Ok(tracing_layers) => tracing_layers.into_iter().fold(layers.boxed(), |registry, layer| registry.and_then(layer).boxed()),

    Err(err) => {
      errors.push(err);
      layers.boxed()
    }
  };

  if let Err(err) = tracing_subscriber::registry().with(layers).try_init() {
    eprintln!("could not install tracing subscriber: {err}");
  }

  for err in errors {
    tracing::warn!(%err, "could not initialize tracing provider");
  }

  guard
}

type TracingLayers = Vec<Box<dyn Layer<Registry> + Send + Sync>>;

fn tracing_layers(mut guards: TraceGuards, config: &Config) -> (TraceGuards, Result<TracingLayers, anyhow::Error>) {
  if !config.enable_tracing {
    return (guards, Ok(vec![]));
  }

  let resource = Resource::builder_empty().with_attributes([KeyValue::new("service.name", "rivalry")]).build();

  let tracing_otlp = match opentelemetry_otlp::SpanExporter::builder().with_tonic().build() {
    Ok(exporter) => exporter,
    Err(err) => return (guards, Err(err.into())),
  };

  let metrics_otlp = match opentelemetry_otlp::MetricExporter::builder().with_tonic().build() {
    Ok(exporter) => exporter,
    Err(err) => return (guards, Err(err.into())),
  };

  let processor = BatchSpanProcessor::builder(tracing_otlp)
    .with_batch_config(BatchConfigBuilder::default().with_max_queue_size(8192).build())
    .build();

  let provider = SdkTracerProvider::builder()
    .with_sampler(Sampler::TraceIdRatioBased(config::parse_env("OTEL_TRACES_SAMPLER_ARGS", 0.1).unwrap_or(0.1)))
    .with_resource(resource.clone())
    .with_span_processor(processor)
    .build();

  let tracer = provider.tracer("rivalry");
  let metrics_provider = MeterProviderBuilder::default().with_periodic_exporter(metrics_otlp).with_resource(resource).build();

  global::set_meter_provider(metrics_provider.clone());

  guards.trace = Some(provider);

  (guards, Ok(vec![tracing_opentelemetry::layer().with_tracer(tracer).boxed(), MetricsLayer::new(metrics_provider).boxed()]))
}
