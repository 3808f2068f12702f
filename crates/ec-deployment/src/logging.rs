use snafu::{ResultExt, Snafu};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to install the global tracing subscriber"))]
    Initialize {
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Initializes `tracing` logging with directives from the environment
/// variable `env`, e.g. `EC_DEPLOYMENT_LOG=debug`.
///
/// Without the variable, or with invalid directives, the maximum level is
/// INFO. Fails when a global subscriber is already installed.
pub fn initialize_logging(env: &str, app_name: &str) -> Result<(), Error> {
    let filter = EnvFilter::builder()
        .with_env_var(env)
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context(InitializeSnafu)?;

    tracing::debug!(app_name, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing::{debug, error, info};

    // Only checks that initialization works once per process. Run with
    // `--nocapture` and `NOT_SET=debug` to see the messages.
    #[test]
    fn default_level_is_info() {
        super::initialize_logging("NOT_SET", "test").expect("first initialization");

        error!("ERROR level messages should be seen.");
        info!("INFO level messages should also be seen by default.");
        debug!("DEBUG level messages should be seen only if you set the NOT_SET env var.");

        assert!(super::initialize_logging("NOT_SET", "test").is_err());
    }
}
