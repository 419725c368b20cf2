//! Logging and metrics setup for apiop.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus text rendering via `metrics-exporter-prometheus`
//!
//! The other apiop crates only depend on the `tracing` and `metrics`
//! facades. Nothing is recorded until [`init_telemetry`] (or the individual
//! initializers) runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiop_config::ConfigLoader;
//! use apiop_telemetry::{init_telemetry, render_metrics};
//!
//! let config = ConfigLoader::new().with_env_prefix("APIOP").load()?;
//! init_telemetry(&config)?;
//!
//! // ... normalize requests ...
//!
//! let text = render_metrics().unwrap_or_default();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

use apiop_config::ApiOpConfig;

pub use error::TelemetryError;
pub use self::logging::{init_logging, LogConfig};
pub use self::metrics::{init_metrics, render_metrics, BODY_SOURCE_TOTAL, OPERATIONS_TOTAL};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and metrics from the loaded configuration.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &ApiOpConfig) -> TelemetryResult<()> {
    init_logging(&LogConfig::from(&config.logging))?;

    if config.metrics.enabled {
        init_metrics()?;
    }

    Ok(())
}
