// ABOUTME: Library root for waitdaemon - exposes the stages and runtimes for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod runtime;
pub mod stage;
pub mod types;

use config::Config;
use error::{Error, Result};
use runtime::{EngineFactory, RuntimeInfo, select_runtime};
use types::ContainerId;

/// Select an engine, run the configured stage and release the engine.
///
/// Returns the ID of the container the stage launched.
pub async fn run(config: &Config, engines: &impl EngineFactory) -> Result<ContainerId> {
    let runtime = select_runtime(&config.runtime, engines).await?;
    tracing::info!(engine = runtime.name(), "selected container runtime");

    let result = stage::run_stage(&*runtime, config).await;

    if let Err(e) = runtime.close() {
        tracing::warn!(error = %e, "failed to close container runtime");
    }

    result.map_err(|source| Error::Stage {
        phase: config.phase,
        source,
    })
}
