// ABOUTME: Runtime selection between the Docker API and the nerdctl CLI.
// ABOUTME: Honours an explicit preference or probes the Docker socket, then falls back to the CLI.

use super::bollard::BollardRuntime;
use super::error::{CliSnafu, DockerSnafu, NoRuntimeFoundSnafu, SelectionError};
use super::nerdctl::NerdctlRuntime;
use super::traits::{ContainerRuntime, RuntimeInfo, RuntimeInfoError};
use super::types::{RuntimeConfig, RuntimePreference};
use async_trait::async_trait;
use snafu::ResultExt;
use std::path::Path;
use std::time::Duration;

/// Default Docker daemon socket.
pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// How long an engine gets to answer its liveness check.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// The CLI that understands containerd namespaces.
const NERDCTL: &str = "nerdctl";

/// Enter the mount, UTS, IPC, network and PID namespaces of host PID 1.
const NSENTER_PREFIX: [&str; 9] = [
    "nsenter", "--target", "1", "--mount", "--uts", "--ipc", "--net", "--pid", "--",
];

/// Constructs engines for the selector.
///
/// Keeps selection independent of the concrete engines so fakes can stand
/// in during tests.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Build the Docker API engine.
    async fn docker(&self) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError>;

    /// Build a CLI engine for the given command prefix.
    fn cli(&self, cli: Vec<String>) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError>;

    /// Whether the default Docker socket exists.
    fn docker_socket_present(&self) -> bool {
        socket_exists(Path::new(DOCKER_SOCKET))
    }
}

/// Builds the real bollard and nerdctl engines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEngines;

#[async_trait]
impl EngineFactory for DefaultEngines {
    async fn docker(&self) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError> {
        Ok(Box::new(BollardRuntime::connect().await?))
    }

    fn cli(&self, cli: Vec<String>) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError> {
        Ok(Box::new(NerdctlRuntime::new(cli)?))
    }
}

/// Select and verify a container engine.
///
/// Preference values:
/// - `docker`: Docker API, fail if unreachable
/// - `containerd`: nerdctl CLI, fail if unusable
/// - `auto` or empty: Docker API when its socket is present, then nerdctl
///
/// Any other value fails before an engine is constructed.
pub async fn select_runtime(
    config: &RuntimeConfig,
    engines: &impl EngineFactory,
) -> Result<Box<dyn ContainerRuntime>, SelectionError> {
    let preference: RuntimePreference = config.preference.parse()?;

    match preference {
        RuntimePreference::Docker => try_docker(engines).await.context(DockerSnafu),
        RuntimePreference::Containerd => {
            let cli = cli_command(config);
            let display = cli.join(" ");
            try_cli(engines, cli).await.context(CliSnafu { cli: display })
        }
        RuntimePreference::Auto => auto_detect(config, engines).await,
    }
}

async fn auto_detect(
    config: &RuntimeConfig,
    engines: &impl EngineFactory,
) -> Result<Box<dyn ContainerRuntime>, SelectionError> {
    let docker_failure = if config.docker_host.is_some() || engines.docker_socket_present() {
        match try_docker(engines).await {
            Ok(runtime) => return Ok(runtime),
            Err(e) => e.to_string(),
        }
    } else {
        format!("{DOCKER_SOCKET} not found")
    };
    tracing::debug!(reason = %docker_failure, "Docker API unavailable, trying CLI");

    let cli = cli_command(config);
    let display = cli.join(" ");
    match try_cli(engines, cli).await {
        Ok(runtime) => Ok(runtime),
        Err(e) => NoRuntimeFoundSnafu {
            docker: docker_failure,
            cli: format!("{display}: {e}"),
        }
        .fail(),
    }
}

/// Building the SDK engine talks to the daemon, so it shares the ping bound.
async fn try_docker(
    engines: &impl EngineFactory,
) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError> {
    let runtime = match tokio::time::timeout(PING_TIMEOUT, engines.docker()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(RuntimeInfoError::ConnectionFailed(format!(
                "no connection within {PING_TIMEOUT:?}"
            )));
        }
    };
    verify(runtime).await
}

async fn try_cli(
    engines: &impl EngineFactory,
    cli: Vec<String>,
) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError> {
    verify(engines.cli(cli)?).await
}

/// Ping the engine, closing it if it does not answer in time.
async fn verify(
    runtime: Box<dyn ContainerRuntime>,
) -> Result<Box<dyn ContainerRuntime>, RuntimeInfoError> {
    let result = match tokio::time::timeout(PING_TIMEOUT, runtime.ping()).await {
        Ok(result) => result,
        Err(_) => Err(RuntimeInfoError::ConnectionFailed(format!(
            "no response within {PING_TIMEOUT:?}"
        ))),
    };

    match result {
        Ok(()) => Ok(runtime),
        Err(e) => {
            let name = runtime.name();
            if let Err(close_err) = runtime.close() {
                tracing::debug!(engine = name, error = %close_err, "failed to close engine");
            }
            Err(e)
        }
    }
}

/// The full CLI command prefix for the configured options.
pub fn cli_command(config: &RuntimeConfig) -> Vec<String> {
    let cli = with_namespace(vec![NERDCTL.to_string()], &config.nerdctl_namespace);
    if config.nsenter {
        NSENTER_PREFIX
            .iter()
            .map(|s| s.to_string())
            .chain(cli)
            .collect()
    } else {
        cli
    }
}

/// Insert `--namespace` after the binary when the CLI is nerdctl.
fn with_namespace(mut cli: Vec<String>, namespace: &str) -> Vec<String> {
    if cli.first().is_some_and(|bin| bin == NERDCTL) && !namespace.is_empty() {
        cli.splice(1..1, ["--namespace".to_string(), namespace.to_string()]);
    }
    cli
}

/// Sockets and any other non-directory count; some setups expose the
/// Docker socket as a regular file.
fn socket_exists(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| !meta.is_dir())
}
