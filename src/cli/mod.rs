//! Command line front end: argument handling and the compile pipeline.

use tracing_subscriber::{fmt, EnvFilter};

pub mod driver;
pub mod options;
pub mod styles;


/// Installs the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter, which is `warn`, or `debug`
/// with `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
