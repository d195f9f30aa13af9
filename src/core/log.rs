use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// `RUST_LOG` wins outright when set; otherwise `verbose` picks the level for this crate.
fn build_filters(verbose: bool, from_env: Option<EnvFilter>) -> (EnvFilter, Option<Targets>) {
    if let Some(env_filter) = from_env {
        return (env_filter, None);
    }

    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::WARN, "warn")
    };
    let app_filter = Targets::new()
        .with_target("gengi", level_filter)
        .with_default(LevelFilter::WARN);
    (EnvFilter::new(level), Some(app_filter))
}

/// Installs the global subscriber. `verbose` turns on debug output for this crate.
pub fn init_logging(verbose: bool) {
    let (env_filter, app_filter) = build_filters(verbose, EnvFilter::try_from_default_env().ok());

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}
