use tracing_subscriber::{EnvFilter, fmt};

/// Default directives when RUST_LOG is unset. The AWS SDK is chatty at info.
const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn";

pub fn init() {
    // RUST_LOG=debug shows one line per submitted batch
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
