use std::str::FromStr;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::{debug, warn};
use tracing_subscriber::{filter::LevelFilter, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt};

use crate::types::config::LogConfig;

/// Keeps span export alive; spans still buffered are flushed on drop.
pub struct TelemetryGuard {
	provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
	fn drop(&mut self) {
		if let Some(provider) = self.provider.take() {
			if let Err(e) = provider.shutdown() {
				eprintln!("Failed to flush spans: {}", e);
			}
		}
	}
}

/// Installs the global subscriber: formatted events to stderr at the
/// configured level, plus spans printed to stdout when asked for.
pub fn init(config: &LogConfig) -> TelemetryGuard {
	let level = LevelFilter::from_str(&config.level).ok();

	let provider = config
		.stdout_spans
		.then(|| SdkTracerProvider::builder().with_simple_exporter(opentelemetry_stdout::SpanExporter::default()).build());
	let otel_layer = provider
		.as_ref()
		.map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("flash-templates")));

	let result = tracing_subscriber::registry()
		.with(level.unwrap_or(LevelFilter::WARN))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_timer(ChronoLocal::rfc_3339()))
		.with(otel_layer)
		.try_init();

	if result.is_err() {
		// Tests and embedders may already have a subscriber
		debug!("Global subscriber already installed");
	}
	if level.is_none() {
		warn!("Unknown log level '{}', using warn", config.level);
	}

	TelemetryGuard { provider }
}
