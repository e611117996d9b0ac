//! Tracing subscriber initialisation
//!
//! Library code only emits `tracing` events; binaries and test harnesses call
//! [`init_tracing`] once to install a subscriber. Filtering follows
//! `RUST_LOG` and defaults to `info`.

use std::io::IsTerminal;
use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info";

/// Output format for the global subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines, coloured when stdout is a terminal
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Install the global subscriber.
///
/// Returns false when a subscriber was already installed; the existing one
/// is kept.
pub fn init_tracing(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_ansi(std::io::stdout().is_terminal())
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
    };

    let installed = tracing_subscriber::registry().with(fmt_layer).with(filter).try_init().is_ok();

    if installed {
        tracing::info!(?format, "Logging initialized");
    } else {
        tracing::debug!("Global tracing subscriber already initialized");
    }
    installed
}
