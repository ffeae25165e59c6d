use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize tracing for a station session. RUST_LOG wins over the
/// configured level; JSON output is for when the log is shipped rather than
/// read off the terminal.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true),
            )
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }

    tracing::info!("shopfloor telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking one scan's log records together.
pub fn generate_scan_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the common station scan attributes.
pub fn scan_span(
    station: &str,
    workcenter_key: &str,
    serial: &str,
    scan_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "station_scan",
        station = station,
        workcenter.key = workcenter_key,
        serial = serial,
        scan.id = scan_id,
    )
}
