use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_grid_traffic_sim"))
        .args(args)
        .env("RUST_LOG", "warn,grid_traffic_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the headless run completes and logs its statistics
#[test]
fn test_headless_simulation_logs_statistics() {
    let output = run_cli(&[
        "--duration", "20", "--vehicles", "40", "--seed", "7", "--quiet",
    ]);

    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    for expected in [
        "SIMULATION COMPLETE",
        "Vehicles: 40",
        "Trips completed:",
        "Average travel time:",
        "Emergency preemptions:",
    ] {
        assert!(stderr.contains(expected), "Missing '{}' in: {}", expected, stderr);
    }

    // Quiet mode prints nothing on stdout
    assert!(output.stdout.is_empty());
}

/// Test that snapshots are printed for the visualizer
#[test]
fn test_headless_simulation_prints_snapshots() {
    let output = run_cli(&[
        "--rows", "2", "--cols", "3", "--duration", "2", "--vehicles", "5", "--seed", "1",
    ]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("NODES\n"));
    assert!(stdout.contains("END_GRAPH"));

    // 20 ticks at a 0.5 s cadence starting with the first tick
    let states = stdout.lines().filter(|line| line.starts_with("STATE ")).count();
    assert_eq!(states, 4);
    assert_eq!(stdout.matches("END_STATE").count(), states);
}

/// Test that bad parameters abort startup
#[test]
fn test_invalid_parameters_fail_startup() {
    let output = run_cli(&["--speed-limit", "0", "--quiet"]);
    assert!(!output.status.success());

    let output = run_cli(&["--policy", "fixed-time"]);
    assert!(!output.status.success());
}
