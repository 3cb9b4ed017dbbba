//! Logging initialization

/// Initialize logging to stderr based on the debug flag
///
/// `RUST_LOG` takes precedence over the flag. Stdout is left to command output.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .init();
}
