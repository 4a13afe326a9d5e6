use std::{io, sync::Once};

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::{
        auth::METRIC_AUTH_EXCHANGES,
        convert::{METRIC_CONVERT_MS, METRIC_PRESENTATIONS_CREATED, METRIC_SLIDES_CREATED},
    },
    config::{LogFormat, LoggingSettings},
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so commands that print results on stdout stay clean.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_PRESENTATIONS_CREATED,
            Unit::Count,
            "Total number of presentations created from Markdown."
        );
        describe_counter!(
            METRIC_SLIDES_CREATED,
            Unit::Count,
            "Total number of slides written into created presentations."
        );
        describe_counter!(
            METRIC_AUTH_EXCHANGES,
            Unit::Count,
            "Authorization code exchanges, labelled by outcome."
        );
        describe_histogram!(
            METRIC_CONVERT_MS,
            Unit::Milliseconds,
            "End-to-end conversion latency in milliseconds."
        );
    });
}
