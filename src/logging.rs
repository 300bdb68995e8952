// Logging setup. Events go to stderr so they never interleave with the
// menu on stdout; the default filter keeps the session quiet.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `debug` or
/// `spe_demo_cli=info`.
pub const LOG_ENV: &str = "SPE_DEMO_LOG";

const DEFAULT_FILTER: &str = "warn";

pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))
}
