use opentelemetry_otlp::WithExportConfig;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

pub struct HoneycombConfig {
    pub team: String,
    pub dataset: String,
}

/// Install the global subscriber: an indented tree in development, Bunyan JSON lines
/// otherwise, and optionally an OTLP exporter to Honeycomb.
pub fn configure(
    name: impl Into<String>,
    production: bool,
    honeycomb_config: Option<HoneycombConfig>,
) -> Result<(), eyre::Report> {
    LogTracer::builder()
        .ignore_crate("rustls")
        .with_max_level(log::LevelFilter::Debug)
        .init()?;

    let env_filter = EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let (json_storage, bunyan) = if production {
        (
            Some(JsonStorageLayer),
            Some(BunyanFormattingLayer::new(name.into(), std::io::stdout)),
        )
    } else {
        (None, None)
    };

    let tree = (!production).then(|| {
        HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true)
    });

    let telemetry = match honeycomb_config {
        Some(honeycomb_config) => {
            let mut oltp_meta = tonic::metadata::MetadataMap::new();
            oltp_meta.insert("x-honeycomb-team", honeycomb_config.team.parse()?);

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint("api.honeycomb.io:443")
                .with_metadata(oltp_meta);

            let oltp = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_trace_config(opentelemetry::sdk::trace::config().with_resource(
                    opentelemetry::sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                        "service.name",
                        honeycomb_config.dataset,
                    )]),
                ))
                .with_exporter(exporter)
                .install_batch(opentelemetry::runtime::TokioCurrentThread)?;
            Some(tracing_opentelemetry::layer().with_tracer(oltp))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(json_storage)
        .with(bunyan)
        .with(tree)
        .with(ErrorLayer::default())
        .with(telemetry);

    set_global_default(subscriber)?;

    Ok(())
}

pub fn teardown() {
    opentelemetry::global::shutdown_tracer_provider();
}
