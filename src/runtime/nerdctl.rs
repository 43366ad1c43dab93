// ABOUTME: CLI-backed container runtime that shells out to nerdctl.
// ABOUTME: Fills gaps in nerdctl's inspect output from Mounts, Args and /proc/self/status.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerError, ContainerInfo, ContainerOps, ImageError, ImageOps, RuntimeInfo,
    RuntimeInfoError,
};
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Where the current process's capability and namespace details live.
const PROC_SELF_STATUS: &str = "/proc/self/status";

/// Mount destinations nerdctl manages per container. Their sources are
/// temporary directories belonging to this container and must not be
/// handed to a new one, which gets its own.
const TRANSIENT_DESTINATIONS: [&str; 3] = ["/etc/resolv.conf", "/etc/hosts", "/etc/hostname"];

// =============================================================================
// Inspect output
// =============================================================================

/// The subset of `container inspect` output we read. Compatible with both
/// docker and nerdctl.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InspectResponse {
    /// Arguments of the container process after its path. Populated by
    /// nerdctl even when `Config.Cmd` is not.
    #[serde(deserialize_with = "null_as_default")]
    args: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    mounts: Vec<MountEntry>,
    #[serde(deserialize_with = "null_as_default")]
    config: InspectConfig,
    #[serde(deserialize_with = "null_as_default")]
    host_config: InspectHostConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InspectConfig {
    #[serde(deserialize_with = "null_as_default")]
    image: String,
    #[serde(deserialize_with = "null_as_default")]
    env: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    cmd: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    tty: bool,
    #[serde(deserialize_with = "null_as_default")]
    attach_stdout: bool,
    #[serde(deserialize_with = "null_as_default")]
    attach_stderr: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InspectHostConfig {
    #[serde(deserialize_with = "null_as_default")]
    privileged: bool,
    #[serde(deserialize_with = "null_as_default")]
    binds: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pid_mode: String,
}

/// One entry of the inspect `Mounts` array. nerdctl fills this instead of
/// `HostConfig.Binds`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct MountEntry {
    #[serde(rename = "Type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(deserialize_with = "null_as_default")]
    source: String,
    #[serde(deserialize_with = "null_as_default")]
    destination: String,
    /// Some nerdctl/containerd versions name the destination `Target`.
    #[serde(deserialize_with = "null_as_default")]
    target: String,
    /// nerdctl packs everything here, e.g. `bind,rprivate,rw`.
    #[serde(deserialize_with = "null_as_default")]
    mode: String,
    #[serde(rename = "RW", deserialize_with = "null_as_default")]
    rw: bool,
    #[serde(deserialize_with = "null_as_default")]
    propagation: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse inspect output shaped either as a one-element list or a bare object.
fn parse_inspect(output: &str) -> Result<InspectResponse, ContainerError> {
    if let Ok(mut responses) = serde_json::from_str::<Vec<InspectResponse>>(output)
        && !responses.is_empty()
    {
        return Ok(responses.swap_remove(0));
    }
    serde_json::from_str::<InspectResponse>(output)
        .map_err(|e| ContainerError::Parse(e.to_string()))
}

fn info_from_inspect(resp: InspectResponse) -> ContainerInfo {
    // Config.Cmd excludes the entrypoint, which the engine re-applies itself.
    let cmd = if resp.config.cmd.is_empty() {
        resp.args
    } else {
        resp.config.cmd
    };

    let binds = if resp.host_config.binds.is_empty() {
        binds_from_mounts(&resp.mounts)
    } else {
        resp.host_config.binds
    };

    ContainerInfo {
        image: resp.config.image,
        env: resp.config.env,
        cmd,
        tty: resp.config.tty,
        attach_stdout: resp.config.attach_stdout,
        attach_stderr: resp.config.attach_stderr,
        privileged: resp.host_config.privileged,
        binds,
        pid_mode: resp.host_config.pid_mode,
    }
}

/// Synthesize `source:destination[:options]` strings from bind-type mounts.
fn binds_from_mounts(mounts: &[MountEntry]) -> Vec<String> {
    mounts
        .iter()
        .filter(|m| m.kind.eq_ignore_ascii_case("bind"))
        .filter_map(|m| {
            let dest = if m.destination.is_empty() {
                &m.target
            } else {
                &m.destination
            };
            if dest.is_empty() || is_transient_destination(dest) {
                return None;
            }
            let mut bind = format!("{}:{}", m.source, dest);
            let opts = mount_options(&m.mode, &m.propagation, m.rw);
            if !opts.is_empty() {
                bind.push(':');
                bind.push_str(&opts.join(","));
            }
            Some(bind)
        })
        .collect()
}

fn is_transient_destination(dest: &str) -> bool {
    TRANSIENT_DESTINATIONS.contains(&dest)
}

/// Normalise mount options for `--volume`.
///
/// Options come from `mode` then `propagation`, deduplicated
/// case-insensitively. `bind` is implied by `--volume` and dropped. A
/// read-only mount without an explicit `ro`/`rw` gets `ro`.
fn mount_options(mode: &str, propagation: &str, writable: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut opts = Vec::new();

    for opt in mode.split(',').chain(propagation.split(',')) {
        let opt = opt.trim();
        if opt.is_empty() || opt.eq_ignore_ascii_case("bind") {
            continue;
        }
        if seen.insert(opt.to_ascii_lowercase()) {
            opts.push(opt.to_string());
        }
    }

    if !writable && !seen.contains("ro") && !seen.contains("rw") {
        opts.push("ro".to_string());
    }

    opts
}

// =============================================================================
// /proc/self/status fallbacks
// =============================================================================

/// A privileged container holds every capability. Full sets end in at least
/// nine `f` digits (`0000003fffffffff` on 4.x, `000001ffffffffff` on 5.x+).
fn privileged_from_status(status: &str) -> bool {
    status
        .lines()
        .find_map(|line| line.strip_prefix("CapEff:"))
        .is_some_and(|caps| caps.trim().ends_with("fffffffff"))
}

/// One PID in `NSpid` means we share the host PID namespace.
fn pid_mode_from_status(status: &str) -> String {
    status
        .lines()
        .find_map(|line| line.strip_prefix("NSpid:"))
        .filter(|pids| pids.split_whitespace().count() == 1)
        .map(|_| "host".to_string())
        .unwrap_or_default()
}

// =============================================================================
// Run arguments
// =============================================================================

/// Arguments after the CLI prefix for a detached run of `info`.
fn run_args(info: &ContainerInfo) -> Vec<String> {
    let mut args: Vec<String> = vec!["container".into(), "run".into(), "--detach".into()];

    for env in &info.env {
        args.push("--env".into());
        args.push(env.clone());
    }
    for bind in &info.binds {
        args.push("--volume".into());
        args.push(bind.clone());
    }
    if info.tty {
        args.push("--tty".into());
    }
    if info.privileged {
        args.push("--privileged".into());
    }
    if !info.pid_mode.is_empty() {
        args.push("--pid".into());
        args.push(info.pid_mode.clone());
    }

    args.push(info.image.clone());
    // Executable then arguments; with no command the image entrypoint applies.
    args.extend(info.cmd.iter().cloned());
    args
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

// =============================================================================
// NerdctlRuntime
// =============================================================================

/// Container runtime that invokes a container CLI once per operation.
pub struct NerdctlRuntime {
    cli: Vec<String>,
    proc_status: PathBuf,
}

impl NerdctlRuntime {
    /// Create a runtime for the given command prefix, e.g. `["nerdctl"]` or
    /// `["nsenter", "--target", "1", ..., "--", "nerdctl"]`.
    pub fn new(cli: Vec<String>) -> Result<Self, RuntimeInfoError> {
        if cli.is_empty() {
            return Err(RuntimeInfoError::Runtime(
                "container CLI command is empty".to_string(),
            ));
        }
        Ok(Self {
            cli,
            proc_status: PathBuf::from(PROC_SELF_STATUS),
        })
    }

    /// Read capability and namespace details from `path` instead of
    /// `/proc/self/status`.
    pub fn with_proc_status(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_status = path.into();
        self
    }

    /// The command prefix every invocation starts with.
    pub fn cli(&self) -> &[String] {
        &self.cli
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.cli[0]);
        cmd.args(&self.cli[1..]).args(args);
        cmd
    }

    async fn proc_status(&self) -> Option<String> {
        tokio::fs::read_to_string(&self.proc_status).await.ok()
    }
}

impl Sealed for NerdctlRuntime {}

#[async_trait]
impl RuntimeInfo for NerdctlRuntime {
    fn name(&self) -> &'static str {
        "nerdctl"
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        let output = self
            .command(["version"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(RuntimeInfoError::ConnectionFailed(format!(
                "`version` exited with {}: {}",
                output.status,
                stderr_text(&output)
            )));
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), RuntimeInfoError> {
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for NerdctlRuntime {
    async fn inspect_self(&self, self_id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let inspection_error = |reason: String| ContainerError::Inspection {
            id: self_id.to_string(),
            reason,
        };

        let output = self
            .command([
                "container",
                "inspect",
                "--format",
                "{{json .}}",
                self_id.as_str(),
            ])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| inspection_error(e.to_string()))?;

        if !output.status.success() {
            return Err(inspection_error(stderr_text(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut info = info_from_inspect(parse_inspect(stdout.trim())?);

        // nerdctl leaves HostConfig.Privileged and HostConfig.PidMode unset.
        if !info.privileged || info.pid_mode.is_empty() {
            let status = self.proc_status().await.unwrap_or_default();
            if !info.privileged {
                info.privileged = privileged_from_status(&status);
            }
            if info.pid_mode.is_empty() {
                info.pid_mode = pid_mode_from_status(&status);
            }
        }

        tracing::debug!(
            cmd = ?info.cmd,
            binds = ?info.binds,
            privileged = info.privileged,
            pid_mode = %info.pid_mode,
            "inspected container via CLI"
        );

        Ok(info)
    }

    async fn run_container(&self, info: &ContainerInfo) -> Result<ContainerId, ContainerError> {
        let launch_error = |reason: String| ContainerError::Launch {
            image: info.image.clone(),
            reason,
        };

        let output = self
            .command(run_args(info))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| launch_error(e.to_string()))?;

        if !output.status.success() {
            return Err(launch_error(stderr_text(&output)));
        }

        // `run --detach` prints the new container's ID.
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ContainerId::new(id))
    }
}

#[async_trait]
impl ImageOps for NerdctlRuntime {
    async fn image_exists(&self, reference: &str) -> bool {
        self.command(["image", "inspect", reference])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    async fn pull_image(&self, reference: &str) -> Result<(), ImageError> {
        let pull_error = |reason: String| ImageError::PullFailed {
            image: reference.to_string(),
            reason,
        };

        // Inherit stdout and stderr so progress streams live.
        let status = self
            .command(["image", "pull", reference])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| pull_error(e.to_string()))?;

        if !status.success() {
            return Err(pull_error(format!("`image pull` exited with {status}")));
        }
        Ok(())
    }
}
