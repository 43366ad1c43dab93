// ABOUTME: Runtime selection types.
// ABOUTME: Includes the RuntimePreference enum and the selector's RuntimeConfig.

use std::str::FromStr;

/// Accepted spellings of each preference, used in error messages.
pub const PREFERENCE_DOCKER: &str = "docker";
pub const PREFERENCE_CONTAINERD: &str = "containerd";
pub const PREFERENCE_AUTO: &str = "auto";

/// Which engine the selector should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePreference {
    /// Docker Engine API via bollard. Fails if the daemon is unreachable.
    Docker,
    /// nerdctl via the command line, optionally through nsenter.
    Containerd,
    /// Docker API first, then the command line.
    Auto,
}

/// The preference string matched none of the accepted values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown runtime {value:?}: valid values are {:?}, {:?}, {:?}",
    PREFERENCE_DOCKER,
    PREFERENCE_CONTAINERD,
    PREFERENCE_AUTO
)]
pub struct UnknownPreference {
    pub value: String,
}

impl FromStr for RuntimePreference {
    type Err = UnknownPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PREFERENCE_DOCKER => Ok(RuntimePreference::Docker),
            PREFERENCE_CONTAINERD => Ok(RuntimePreference::Containerd),
            PREFERENCE_AUTO | "" => Ok(RuntimePreference::Auto),
            other => Err(UnknownPreference {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RuntimePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimePreference::Docker => write!(f, "{PREFERENCE_DOCKER}"),
            RuntimePreference::Containerd => write!(f, "{PREFERENCE_CONTAINERD}"),
            RuntimePreference::Auto => write!(f, "{PREFERENCE_AUTO}"),
        }
    }
}

/// Input to runtime selection.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Raw preference string; validated during selection.
    pub preference: String,
    /// containerd namespace handed to nerdctl via `--namespace`.
    pub nerdctl_namespace: String,
    /// Run the CLI inside the host namespaces of PID 1.
    pub nsenter: bool,
    /// `DOCKER_HOST`, when set. Counts as a reachable Docker endpoint
    /// during auto-detection even without the default socket.
    pub docker_host: Option<String>,
}
