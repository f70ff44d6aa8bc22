use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG` wins over `default_level` when it is set and valid. With
/// `json` the output is one JSON object per line.
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // try_init so tests can call this more than once without panicking
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
