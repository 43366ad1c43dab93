// ABOUTME: Process configuration assembled once from the environment.
// ABOUTME: The only place that reads environment variables, host name and argv.

use crate::runtime::RuntimeConfig;
use crate::types::ContainerId;
use std::fmt;
use std::time::Duration;

/// Internal stage marker. Set on the clone, never by users.
pub const PHASE_ENV: &str = "PHASE";
/// Value of `PHASE` that selects the second stage.
pub const PHASE_SECOND_FORK: &str = "SECOND_FORK";
/// Image the second stage launches.
pub const IMAGE_ENV: &str = "IMAGE";
/// Seconds the second stage waits before launching.
pub const WAIT_SECONDS_ENV: &str = "WAIT_SECONDS";
/// Engine preference: `docker`, `containerd`, `auto` or empty.
pub const RUNTIME_ENV: &str = "RUNTIME";
/// containerd namespace for nerdctl.
pub const NERDCTL_NAMESPACE_ENV: &str = "NERDCTL_NAMESPACE";
/// Run the CLI engine through nsenter into the host namespaces.
pub const NSENTER_ENV: &str = "NSENTER";
/// Host name fallback when the system call fails.
pub const HOSTNAME_ENV: &str = "HOSTNAME";
/// Docker endpoint override, also read by bollard itself.
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

pub const DEFAULT_NERDCTL_NAMESPACE: &str = "tinkerbell";
pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);

/// Which half of the two-stage launch this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Clone ourselves with the marker set and exit.
    First,
    /// Wait, then launch the target image.
    Second,
}

impl Phase {
    /// Phase selected by the marker value. Anything but the second-stage
    /// value, including absence, means first stage.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(PHASE_SECOND_FORK) => Phase::Second,
            _ => Phase::First,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::First => write!(f, "first"),
            Phase::Second => write!(f, "second"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub phase: Phase,
    /// Target image; empty when `IMAGE` is unset.
    pub image: String,
    pub wait: Duration,
    pub runtime: RuntimeConfig,
    /// Identifier of the container we run in.
    pub self_id: ContainerId,
    /// Our own invoked program path, `argv[0]`.
    pub program: String,
}

impl Config {
    /// Read the process environment, host name and `argv[0]`.
    pub fn from_env() -> Self {
        let hostname = gethostname::gethostname()
            .into_string()
            .ok()
            .filter(|name| !name.is_empty());
        let program = std::env::args().next().unwrap_or_default();
        Self::from_lookup(|key| std::env::var(key).ok(), hostname, program)
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// `hostname` wins over the `HOSTNAME` variable when present.
    pub fn from_lookup<F>(lookup: F, hostname: Option<String>, program: String) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let nonempty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let runtime = RuntimeConfig {
            preference: lookup(RUNTIME_ENV).unwrap_or_default(),
            nerdctl_namespace: lookup(NERDCTL_NAMESPACE_ENV)
                .unwrap_or_else(|| DEFAULT_NERDCTL_NAMESPACE.to_string()),
            nsenter: parse_flag(nonempty(NSENTER_ENV).as_deref(), true),
            docker_host: nonempty(DOCKER_HOST_ENV),
        };

        Config {
            phase: Phase::from_marker(lookup(PHASE_ENV).as_deref()),
            image: lookup(IMAGE_ENV).unwrap_or_default(),
            wait: parse_wait_seconds(lookup(WAIT_SECONDS_ENV).as_deref()),
            runtime,
            self_id: ContainerId::new(
                hostname
                    .or_else(|| nonempty(HOSTNAME_ENV))
                    .unwrap_or_default(),
            ),
            program,
        }
    }
}

/// Whole seconds to wait. Missing, empty, negative or malformed input
/// falls back to [`DEFAULT_WAIT`].
pub fn parse_wait_seconds(value: Option<&str>) -> Duration {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_WAIT)
}

/// `true` and `1` (any case) are truthy, any other value is false, and
/// an unset value takes `default`.
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => v.eq_ignore_ascii_case("true") || v == "1",
    }
}
