//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the filter is `warn`, or `debug` for
//! this tool and the engine when `--verbose` is given.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "apstream=debug,packed_stream=debug,warn";

fn filter_directive(verbose: bool) -> String {
    match std::env::var("RUST_LOG") {
        Ok(directive) if !directive.trim().is_empty() => directive,
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install a compact stderr subscriber. Call once at startup.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(verbose))?;

    let fmt_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    Ok(())
}
