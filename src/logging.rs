use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "warn";

/// Logs go to stderr: stdout belongs to the alternate screen. `RUST_LOG`
/// overrides the default filter, e.g. `RUST_LOG=solarsystem=debug 2>log`.
pub(crate) fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(env_filter).with(layer).try_init();
}
