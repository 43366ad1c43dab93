// ABOUTME: Shared types used across runtime traits.
// ABOUTME: ContainerInfo is the launch configuration carried from stage to stage.

/// Runtime-agnostic launch configuration.
///
/// Produced by inspecting a running container and accepted as-is by
/// `ContainerOps::run_container`, so an unmodified value recreates an
/// equivalent container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Image reference.
    pub image: String,
    /// Environment in `KEY=VALUE` form, in inspection order.
    pub env: Vec<String>,
    /// Command tokens, excluding the image entrypoint.
    pub cmd: Vec<String>,
    /// Allocate a TTY.
    pub tty: bool,
    /// Attach stdout.
    pub attach_stdout: bool,
    /// Attach stderr.
    pub attach_stderr: bool,
    /// Run privileged.
    pub privileged: bool,
    /// Bind mounts in `host:container[:options]` form.
    pub binds: Vec<String>,
    /// PID namespace mode, empty or `host`.
    pub pid_mode: String,
}

impl ContainerInfo {
    /// Append `key=value` to the environment.
    pub fn push_env(&mut self, key: &str, value: &str) {
        self.env.push(format!("{key}={value}"));
    }

    /// Remove every environment entry whose key is exactly `key`.
    ///
    /// Relative order of the remaining entries is preserved.
    pub fn remove_env(&mut self, key: &str) {
        self.env.retain(|entry| env_key(entry) != key);
    }

    /// Drop the leading command token if it is exactly `program`.
    ///
    /// Returns whether a token was removed.
    pub fn strip_command_prefix(&mut self, program: &str) -> bool {
        if !program.is_empty() && self.cmd.first().is_some_and(|first| first == program) {
            self.cmd.remove(0);
            true
        } else {
            false
        }
    }
}

/// The key part of a `KEY=VALUE` entry. An entry without `=` is all key.
pub fn env_key(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with_env(env: &[&str]) -> ContainerInfo {
        ContainerInfo {
            env: env.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn env_key_splits_on_first_equals() {
        assert_eq!(env_key("PATH=/usr/bin"), "PATH");
        assert_eq!(env_key("OPTS=a=b"), "OPTS");
        assert_eq!(env_key("BARE"), "BARE");
    }

    #[test]
    fn push_env_appends() {
        let mut info = info_with_env(&["A=1"]);
        info.push_env("PHASE", "SECOND_FORK");
        assert_eq!(info.env, vec!["A=1", "PHASE=SECOND_FORK"]);
    }

    #[test]
    fn remove_env_matches_whole_key_only() {
        let mut info = info_with_env(&["PATH=/bin", "PATHEXT=.exe", "A=1", "PATH=/sbin"]);
        info.remove_env("PATH");
        assert_eq!(info.env, vec!["PATHEXT=.exe", "A=1"]);
    }

    #[test]
    fn strip_command_prefix_removes_own_binary() {
        let mut info = ContainerInfo {
            cmd: vec!["/waitdaemon".into(), "reboot".into()],
            ..Default::default()
        };
        assert!(info.strip_command_prefix("/waitdaemon"));
        assert_eq!(info.cmd, vec!["reboot"]);
    }

    #[test]
    fn strip_command_prefix_leaves_user_command() {
        let mut info = ContainerInfo {
            cmd: vec!["reboot".into()],
            ..Default::default()
        };
        assert!(!info.strip_command_prefix("/waitdaemon"));
        assert_eq!(info.cmd, vec!["reboot"]);
    }

    #[test]
    fn strip_command_prefix_ignores_empty_program() {
        let mut info = ContainerInfo {
            cmd: vec![String::new(), "x".into()],
            ..Default::default()
        };
        assert!(!info.strip_command_prefix(""));
        assert_eq!(info.cmd.len(), 2);
    }
}
