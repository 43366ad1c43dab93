// ABOUTME: Entry point for the waitdaemon binary.
// ABOUTME: Reads configuration, runs the current stage and exits with its status code.

use tracing_subscriber::EnvFilter;
use waitdaemon::config::Config;
use waitdaemon::runtime::DefaultEngines;

#[tokio::main]
async fn main() {
    // JSON lines on stdout; RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(true)
        .init();

    let config = Config::from_env();
    tracing::info!(
        phase = %config.phase,
        image = %config.image,
        hostname = %config.self_id,
        wait_seconds = config.wait.as_secs(),
        runtime = %config.runtime.preference,
        "starting waitdaemon"
    );

    let code = match waitdaemon::run(&config, &DefaultEngines).await {
        Ok(_) => 0,
        Err(e) => {
            tracing::error!(
                phase = %config.phase,
                image = %config.image,
                error = %e,
                "waitdaemon failed"
            );
            e.exit_code()
        }
    };

    std::process::exit(code);
}
