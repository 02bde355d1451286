//! Logging setup, with optional OpenTelemetry span export.

use thumbra_error::{ServerError, ServerErrorKind};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter used when `RUST_LOG` is unset (e.g., "info", "debug")
    pub log_level: String,
    /// Enable JSON-formatted logs for structured logging
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Filter from `RUST_LOG`, else the configured level.
    fn env_filter(&self) -> Result<EnvFilter, ServerError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .map_err(|e| ServerError::new(ServerErrorKind::Logging(e.to_string())))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new("thumbra")
    }
}

fn fmt_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    }
}

/// Install the global subscriber.
///
/// This sets up:
/// - `RUST_LOG` filtering, falling back to the configured level
/// - Text or JSON log lines on stdout
///
/// # Errors
///
/// Returns error if the level does not parse or a subscriber is already set.
#[cfg(not(feature = "otel"))]
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), ServerError> {
    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(fmt_layer(config.json_logs))
        .try_init()
        .map_err(|e| ServerError::new(ServerErrorKind::Logging(e.to_string())))
}

/// Install the global subscriber with OpenTelemetry export.
///
/// This sets up:
/// - Tracing with OpenTelemetry bridge
/// - Stdout span exporter
/// - Service name and version metadata
/// - Configurable log format (text or JSON)
///
/// # Errors
///
/// Returns error if the level does not parse or a subscriber is already set.
#[cfg(feature = "otel")]
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), ServerError> {
    use opentelemetry::{KeyValue, global, trace::TracerProvider};
    use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
    use opentelemetry_stdout::SpanExporter;

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes(vec![KeyValue::new(
            "service.version",
            config.service_version.clone(),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build();

    global::set_tracer_provider(provider.clone());

    let tracer = provider.tracer(config.service_name.clone());
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(fmt_layer(config.json_logs))
        .with(otel_layer)
        .try_init()
        .map_err(|e| ServerError::new(ServerErrorKind::Logging(e.to_string())))
}
