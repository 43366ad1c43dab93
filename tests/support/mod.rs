// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted stand-in for the container CLI.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Container ID the fake CLI prints for `container run`.
#[allow(dead_code)]
pub const LAUNCHED_ID: &str = "c0ffee0123456789abcdef";

/// A `nerdctl` shell script in a temporary directory.
///
/// Every invocation is appended to `invocations.log`. `container inspect`
/// prints the configured JSON, `container run` prints [`LAUNCHED_ID`] and
/// any other subcommand succeeds silently. Creating `fail-<cmd>-<sub>`
/// (or `fail-<cmd>` for single-word commands) makes that call exit 1.
pub struct FakeCli {
    dir: TempDir,
}

#[allow(dead_code)]
impl FakeCli {
    pub fn new(inspect_json: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("inspect.json"), inspect_json).unwrap();

        let script = format!(
            r#"#!/bin/sh
dir="{dir}"
echo "$*" >> "$dir/invocations.log"
if [ "$1" = "--namespace" ]; then shift 2; fi
key="$1"
if [ -n "$2" ]; then key="$1-$2"; fi
if [ -e "$dir/fail-$key" ]; then
  echo "simulated failure: $key" >&2
  exit 1
fi
case "$key" in
  container-inspect) cat "$dir/inspect.json" ;;
  container-run) echo "{id}" ;;
esac
exit 0
"#,
            dir = dir.path().display(),
            id = LAUNCHED_ID,
        );

        let path = dir.path().join("nerdctl");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    /// Directory holding the script, for prepending to `PATH`.
    pub fn bin_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn binary(&self) -> PathBuf {
        self.dir.path().join("nerdctl")
    }

    /// Make calls whose first words are `key` (e.g. `image-pull`) fail.
    pub fn fail(&self, key: &str) {
        fs::write(self.dir.path().join(format!("fail-{key}")), "").unwrap();
    }

    /// Arguments of every call so far, one string per call.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// The `container run` calls so far.
    pub fn runs(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|call| call.contains("container run"))
            .collect()
    }

    /// `PATH` with the script directory in front.
    pub fn path_env(&self) -> String {
        match std::env::var("PATH") {
            Ok(path) if !path.is_empty() => format!("{}:{path}", self.bin_dir().display()),
            _ => self.bin_dir().display().to_string(),
        }
    }
}

/// Inspect output for a container started as `<program> reboot`.
#[allow(dead_code)]
pub fn inspect_json(program: &str) -> String {
    serde_json::json!([{
        "Id": "4f66ad9a0b2e",
        "Path": program,
        "Args": ["reboot"],
        "Mounts": [
            {"Type": "bind", "Source": "/tmp/x/hosts", "Destination": "/etc/hosts", "RW": true},
            {"Type": "bind", "Source": "/worker", "Destination": "/worker", "Mode": "", "RW": true}
        ],
        "Config": {
            "Image": "quay.io/tinkerbell/waitdaemon:latest",
            "Env": ["PATH=/usr/local/bin:/usr/bin", "IMAGE=alpine"],
            "Cmd": [program, "reboot"],
            "Tty": false,
            "AttachStdout": true,
            "AttachStderr": true
        },
        "HostConfig": {}
    }])
    .to_string()
}
