use std::process::Command;

fn run(bin: &str, args: &[&str]) -> String {
    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to run probe binary");
    assert!(
        output.status.success(),
        "{bin} exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-utf8 output")
}

fn is_kb_figure(s: &str) -> bool {
    let Some(number) = s.strip_suffix(" kb") else {
        return false;
    };
    number.parse::<f64>().is_ok() && number.split('.').nth(1).map(str::len) == Some(3)
}

#[test]
fn task_footprint_prints_one_line() {
    let stdout = run(env!("CARGO_BIN_EXE_task-footprint"), &["--count", "500"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    let figure = lines[0]
        .strip_suffix(" memory used per goroutine")
        .expect("unexpected report line");
    assert!(is_kb_figure(figure), "{figure}");
}

#[test]
fn timer_leak_prints_before_and_after() {
    let stdout = run(env!("CARGO_BIN_EXE_timer-leak"), &["--count", "500"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "{stdout}");
    assert_eq!(lines[0], "Before:");
    assert_eq!(lines[2], "After:");
    for line in [lines[1], lines[3]] {
        let figure = line.strip_suffix(" allocated").expect("unexpected report line");
        assert!(is_kb_figure(figure), "{figure}");
    }
}

#[test]
fn json_output_is_parseable() {
    let stdout = run(
        env!("CARGO_BIN_EXE_task-footprint"),
        &["--count", "100", "--json"],
    );
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert_eq!(value["tasks"], 100);
    assert!(value["before"]["live_bytes"].is_u64());
}

#[test]
fn zero_tasks_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_task-footprint"))
        .args(["--count", "0"])
        .output()
        .expect("failed to run probe binary");
    assert!(!output.status.success());
}
