use tracing_subscriber::EnvFilter;

/// Initialize `tracing` the way the rest of the workspace's binaries do:
/// `RUST_LOG` wins if set, otherwise fall back to `default_level`, and
/// finally to `"info"` if even that fails to parse. Writes to stderr so
/// stdout stays free for the AST/diagnostic output the binary prints.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
