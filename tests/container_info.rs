// ABOUTME: Property tests for the container configuration edits the stages make.
// ABOUTME: Covers environment removal and command prefix stripping.

use proptest::prelude::*;
use waitdaemon::runtime::ContainerInfo;

fn env_entry() -> impl Strategy<Value = String> {
    prop_oneof![
        "PATH=[a-z/:]{0,12}",
        Just("PATH".to_string()),
        "PATHS=[a-z]{0,4}",
        "[A-Z_]{1,8}=[a-z0-9]{0,6}",
        "[A-Z_]{1,8}",
    ]
}

proptest! {
    #[test]
    fn removing_path_drops_only_path_entries(env in prop::collection::vec(env_entry(), 0..12)) {
        let mut info = ContainerInfo { env: env.clone(), ..Default::default() };

        info.remove_env("PATH");

        let expected: Vec<String> = env
            .into_iter()
            .filter(|entry| entry.split('=').next() != Some("PATH"))
            .collect();
        prop_assert_eq!(&info.env, &expected);

        info.remove_env("PATH");
        prop_assert_eq!(info.env, expected);
    }

    #[test]
    fn stripping_removes_exactly_one_leading_program(
        program in "/[a-z]{1,8}",
        args in prop::collection::vec("[a-z-]{1,6}", 0..4),
    ) {
        let mut cmd = vec![program.clone()];
        cmd.extend(args.iter().cloned());
        let mut info = ContainerInfo { cmd, ..Default::default() };

        prop_assert!(info.strip_command_prefix(&program));
        prop_assert_eq!(&info.cmd, &args);
    }

    #[test]
    fn stripping_leaves_other_commands_alone(
        program in "/[a-z]{1,8}",
        cmd in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut info = ContainerInfo { cmd: cmd.clone(), ..Default::default() };

        prop_assert!(!info.strip_command_prefix(&program));
        prop_assert_eq!(info.cmd, cmd);
    }
}

#[test]
fn push_env_appends() {
    let mut info = ContainerInfo {
        env: vec!["IMAGE=alpine".to_string()],
        ..Default::default()
    };

    info.push_env("PHASE", "SECOND_FORK");

    assert_eq!(info.env, vec!["IMAGE=alpine", "PHASE=SECOND_FORK"]);
}
