use super::*;

#[test]
fn command_builder_accumulates_settings() {
    let cmd = EngineCommand::new("./tangerine")
        .with_leading_args(["--verbose"])
        .with_timeout(Duration::from_secs(30));
    assert_eq!(cmd.program, PathBuf::from("./tangerine"));
    assert_eq!(cmd.leading_args, vec!["--verbose".to_string()]);
    assert_eq!(cmd.timeout, Some(Duration::from_secs(30)));
}

#[test]
fn canned_runner_records_mode_contract() {
    let mut runner = CannedRunner::new(b"BEGIN RAW IMAGE".to_vec());
    let piped = InvocationMode::PipedSource {
        scene: b"(box 1 1 1)".to_vec(),
        iterations: 10,
    };

    let out = runner.run(&piped, 4, 2).unwrap();
    assert_eq!(out, b"BEGIN RAW IMAGE");
    runner.run(&InvocationMode::BuiltinScene, 8, 8).unwrap();

    let calls = runner.invocations();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].args,
        vec!["--cin", "--headless", "4", "2", "--iterations", "10"]
    );
    assert_eq!(calls[0].stdin.as_deref(), Some(&b"(box 1 1 1)"[..]));
    assert_eq!(calls[1].args, vec!["--builtin-scene", "8", "8"]);
    assert_eq!(calls[1].stdin, None);
}

#[test]
fn missing_program_is_invocation_failure() {
    let mut runner = ProcessRunner::new(EngineCommand::new(
        "./definitely-not-an-engine-binary-7c1f",
    ));
    let err = runner.run(&InvocationMode::BuiltinScene, 2, 2).unwrap_err();
    assert!(matches!(err, CaptureError::InvocationFailure(_)));
    assert!(err.to_string().contains("failed to spawn engine"));
}

#[test]
fn stdout_excerpt_is_bounded_and_trimmed() {
    assert_eq!(stdout_excerpt(b""), "(no output)");
    assert_eq!(stdout_excerpt(b"  oops\n"), "oops");
    let long = vec![b'x'; STDOUT_EXCERPT_BYTES * 2];
    assert_eq!(stdout_excerpt(&long).len(), STDOUT_EXCERPT_BYTES);
}
