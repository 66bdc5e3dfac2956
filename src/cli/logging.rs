//! Tracing subscriber setup for the CLI

use shipfee::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; logs go to stderr
///
/// `RUST_LOG` wins over `logging.level`.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    if let Err(e) = result {
        eprintln!("Warning: logging not initialized: {}", e);
    }
}
