// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Talks to the Docker Engine API, which reports complete container configuration.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerError, ContainerInfo, ContainerOps, ImageError, ImageOps, RuntimeInfo,
    RuntimeInfoError,
};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerInspectResponse, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, StartContainerOptions,
};
use futures::StreamExt;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_inspect_error(e: bollard::errors::Error, id: &ContainerId) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Inspection {
            id: id.to_string(),
            reason: e.to_string(),
        },
    }
}

fn map_launch_error(e: bollard::errors::Error, image: &str) -> ContainerError {
    ContainerError::Launch {
        image: image.to_string(),
        reason: e.to_string(),
    }
}

fn map_image_pull_error(e: bollard::errors::Error, image: &str) -> ImageError {
    ImageError::PullFailed {
        image: image.to_string(),
        reason: e.to_string(),
    }
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
pub struct BollardRuntime {
    client: Docker,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker) -> Self {
        Self { client }
    }

    /// Connect using `DOCKER_HOST` or the platform default socket, then
    /// negotiate the API version with the daemon.
    pub async fn connect() -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_defaults()
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?
            .negotiate_version()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client))
    }
}

/// Copy an inspect response into a ContainerInfo, field for field.
fn info_from_inspect(details: ContainerInspectResponse) -> ContainerInfo {
    let config = details.config.unwrap_or_default();
    let host_config = details.host_config.unwrap_or_default();

    ContainerInfo {
        image: config.image.unwrap_or_default(),
        env: config.env.unwrap_or_default(),
        cmd: config.cmd.unwrap_or_default(),
        tty: config.tty.unwrap_or(false),
        attach_stdout: config.attach_stdout.unwrap_or(false),
        attach_stderr: config.attach_stderr.unwrap_or(false),
        privileged: host_config.privileged.unwrap_or(false),
        binds: host_config.binds.unwrap_or_default(),
        pid_mode: host_config.pid_mode.unwrap_or_default(),
    }
}

/// Build the create request for a ContainerInfo.
fn create_body(info: &ContainerInfo) -> ContainerCreateBody {
    let host_config = HostConfig {
        privileged: Some(info.privileged),
        binds: (!info.binds.is_empty()).then(|| info.binds.clone()),
        pid_mode: (!info.pid_mode.is_empty()).then(|| info.pid_mode.clone()),
        ..Default::default()
    };

    ContainerCreateBody {
        image: Some(info.image.clone()),
        attach_stdout: Some(info.attach_stdout),
        attach_stderr: Some(info.attach_stderr),
        // An empty command lets the image entrypoint and default CMD apply.
        cmd: (!info.cmd.is_empty()).then(|| info.cmd.clone()),
        tty: Some(info.tty),
        env: (!info.env.is_empty()).then(|| info.env.clone()),
        host_config: Some(host_config),
        ..Default::default()
    }
}

/// Split a reference into the `fromImage` and `tag` query parameters.
///
/// The API pulls every tag when none is given, so untagged references get
/// `latest` the way the CLI does.
fn pull_parameters(reference: &str) -> (String, Option<String>) {
    if reference.contains('@') {
        return (reference.to_string(), None);
    }
    let last_segment_start = reference.rfind('/').map_or(0, |idx| idx + 1);
    match reference[last_segment_start..].rsplit_once(':') {
        Some((_, tag)) => {
            let name_end = reference.len() - tag.len() - 1;
            (reference[..name_end].to_string(), Some(tag.to_string()))
        }
        None => (reference.to_string(), Some("latest".to_string())),
    }
}

impl Sealed for BollardRuntime {}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), RuntimeInfoError> {
        // Dropping the client closes its connection pool.
        drop(self.client);
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn inspect_self(&self, self_id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let details = self
            .client
            .inspect_container(self_id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| map_inspect_error(e, self_id))?;

        Ok(info_from_inspect(details))
    }

    async fn run_container(&self, info: &ContainerInfo) -> Result<ContainerId, ContainerError> {
        let response = self
            .client
            .create_container(None::<CreateContainerOptions>, create_body(info))
            .await
            .map_err(|e| map_launch_error(e, &info.image))?;

        self.client
            .start_container(&response.id, None::<StartContainerOptions>)
            .await
            .map_err(|e| map_launch_error(e, &info.image))?;

        Ok(ContainerId::new(response.id))
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn image_exists(&self, reference: &str) -> bool {
        // Any error, including an unreachable daemon, means "not available".
        self.client.inspect_image(reference).await.is_ok()
    }

    async fn pull_image(&self, reference: &str) -> Result<(), ImageError> {
        let (from_image, tag) = pull_parameters(reference);
        let opts = CreateImageOptions {
            from_image: Some(from_image),
            tag,
            ..Default::default()
        };

        // Pull returns a stream of progress records; echo each one as a JSON line.
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            let progress = result.map_err(|e| map_image_pull_error(e, reference))?;
            if let Ok(line) = serde_json::to_string(&progress) {
                println!("{line}");
            }
        }

        Ok(())
    }
}
