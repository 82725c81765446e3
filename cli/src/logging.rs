//! Tracing setup for the `weft` binary: logs go to stderr so stdout stays
//! clean for stream output.
//!
//! Filter precedence: `-v` (debug for weft crates), then `RUST_LOG`, then the
//! configured `WEFT_LOG` / `[graph] log`, then `warn`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use weft_cli::RunError;

const VERBOSE_FILTER: &str = "weft=debug,weft_cli=debug";

fn filter(verbose: bool, configured: Option<&str>) -> Result<EnvFilter, RunError> {
    if verbose {
        return Ok(EnvFilter::new(VERBOSE_FILTER));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    match configured {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| RunError::Logging(format!("invalid log filter {:?}: {}", directives, e))),
        None => Ok(EnvFilter::new("warn")),
    }
}

pub fn init(verbose: bool, configured: Option<&str>) -> Result<(), RunError> {
    let filter = filter(verbose, configured)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| RunError::Logging(e.to_string()))
}
