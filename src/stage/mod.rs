// ABOUTME: Two-stage launch controller.
// ABOUTME: First stage clones its own container with a marker; second stage waits and launches the target.

mod error;

pub use error::StageError;

use crate::config::{Config, PHASE_ENV, PHASE_SECOND_FORK, Phase};
use crate::runtime::ContainerRuntime;
use crate::types::ContainerId;

/// Variable removed from the final container so the target image keeps its own.
const PATH_ENV: &str = "PATH";

/// Run the stage selected by `config.phase`.
///
/// Returns the ID of the container this stage launched.
pub async fn run_stage<R>(runtime: &R, config: &Config) -> Result<ContainerId, StageError>
where
    R: ContainerRuntime + ?Sized,
{
    match config.phase {
        Phase::First => first_stage(runtime, config).await,
        Phase::Second => second_stage(runtime, config).await,
    }
}

/// Make sure the target image is present, then start a marked clone of the
/// current container.
///
/// A pull failure here is the only one the orchestrator sees, since it
/// waits on this process's exit status.
pub async fn first_stage<R>(runtime: &R, config: &Config) -> Result<ContainerId, StageError>
where
    R: ContainerRuntime + ?Sized,
{
    if !runtime.image_exists(&config.image).await {
        tracing::info!(phase = %Phase::First, image = %config.image, "pulling image");
        runtime
            .pull_image(&config.image)
            .await
            .map_err(|source| StageError::Pull {
                image: config.image.clone(),
                source,
            })?;
    }

    let mut info = runtime.inspect_self(&config.self_id).await?;
    info.push_env(PHASE_ENV, PHASE_SECOND_FORK);

    tracing::info!(
        phase = %Phase::First,
        image = %info.image,
        "launching second stage container"
    );
    let id = runtime.run_container(&info).await?;
    tracing::info!(phase = %Phase::First, container = %id.short(), "second stage started");
    Ok(id)
}

/// Wait, then launch the target image with the configuration of the
/// current container.
///
/// The wait cannot be cancelled; only killing the process stops it.
pub async fn second_stage<R>(runtime: &R, config: &Config) -> Result<ContainerId, StageError>
where
    R: ContainerRuntime + ?Sized,
{
    tracing::info!(
        phase = %Phase::Second,
        wait_seconds = config.wait.as_secs(),
        "waiting before running user image"
    );
    tokio::time::sleep(config.wait).await;

    let mut info = runtime.inspect_self(&config.self_id).await?;
    info.image.clone_from(&config.image);
    // The inspected command is `<our binary> <user args...>`; the target
    // image has no copy of our binary.
    info.strip_command_prefix(&config.program);
    info.remove_env(PATH_ENV);

    tracing::info!(
        phase = %Phase::Second,
        image = %info.image,
        cmd = ?info.cmd,
        "running user image"
    );
    let id = runtime.run_container(&info).await?;
    tracing::info!(phase = %Phase::Second, container = %id.short(), "user container started");
    Ok(id)
}
