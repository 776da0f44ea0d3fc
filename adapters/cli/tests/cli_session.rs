use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn run(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_geocache"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch geocache binary");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write commands");
    child.wait_with_output().expect("failed to wait for geocache")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("geocache-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("failed to write scratch file");
    path
}

#[test]
fn text_session_greets_and_reports_status() {
    let output = run(&[], "status\nquit\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Geocache."));
    assert!(stdout.contains("You are at 36.997937, -122.057035"));
    assert!(stdout.contains("No points yet..."));
    assert!(stdout.contains("Requesting location..."));
}

#[test]
fn json_session_streams_events() {
    let output = run(&["--json"], "e\nquit\n");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("at least one event");
    assert!(first.contains(r#""event":"player_relocated""#), "{first}");
    assert!(first.contains(r#""cause":"load""#), "{first}");
    assert!(stdout.contains(r#""cause":"manual""#));
    assert!(stdout.contains(r#""event":"window_repopulated""#));
}

#[test]
fn scripted_fixes_are_applied_after_startup() {
    let fixes = scratch_file("fixes.txt", "# commute\n51.5 -0.12\n52.5 -0.12\n");
    let fixes_arg = fixes.to_string_lossy().into_owned();
    let output = run(&["--json", "--fixes", &fixes_arg], "quit\n");
    let _ = fs::remove_file(&fixes);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""event":"fix_accepted""#));
    assert!(stdout.contains(r#""event":"fix_rejected""#));
}

#[test]
fn unknown_config_keys_abort_startup() {
    let config = scratch_file("config.toml", "[grid]\ntile_size = 3\n");
    let config_arg = config.to_string_lossy().into_owned();
    let output = run(&["--config", &config_arg], "quit\n");
    let _ = fs::remove_file(&config);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config"), "{stderr}");
}

#[test]
fn missing_sensor_is_reported() {
    let output = run(&["--no-sensor"], "status\nquit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Geolocation not supported (using fallback)"));
}

#[test]
fn malformed_view_spans_are_refused() {
    for span in ["NaN", "-0.5", "inf"] {
        let output = run(
            &["--view-lat-span", span, "--view-lng-span", "0.004"],
            "quit\n",
        );
        assert!(!output.status.success(), "span {span} accepted");
    }
}

#[test]
fn oversized_neighborhood_is_refused() {
    let config = scratch_file("radius.toml", "[registry]\nneighborhood_radius = 100000\n");
    let config_arg = config.to_string_lossy().into_owned();
    let output = run(&["--config", &config_arg], "quit\n");
    let _ = fs::remove_file(&config);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid config"), "{stderr}");
}
