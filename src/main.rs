//! ternfactor command line entry point

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    init_tracing();

    ternfactor::cli::run()
}

/// Log to stderr, filtered by `TERNFACTOR_LOG` (default `ternfactor=info`).
#[cfg(feature = "logging")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("TERNFACTOR_LOG").unwrap_or_else(|_| EnvFilter::new("ternfactor=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
