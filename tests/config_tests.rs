use predicates::prelude::*;
use test_env::{TestEnv, SAMPLE_ROWS};

#[test]
fn test_phases_default_legend() {
    let env = TestEnv::new();

    env.cmd()
        .arg("phases")
        .assert()
        .success()
        .stdout(predicate::str::contains("Released"))
        .stdout(predicate::str::contains("#FFA500"))
        .stdout(predicate::str::contains("Panel Turned Over"))
        .stdout(predicate::str::contains("Not Started"));
}

#[test]
fn test_phases_json_from_rc_preset() {
    let env = TestEnv::new();
    env.write_rc("phases=legacy\n");

    let output = env.cmd().args(["phases", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let phases = value.as_array().unwrap();
    assert_eq!(phases.len(), 6);
    assert_eq!(phases[4]["name"], "On Site");
    assert_eq!(phases[4]["column"], "OnSite");
    assert_eq!(phases[4]["order"], 5);
}

#[test]
fn test_phase_file_relative_to_rc() {
    let env = TestEnv::new();
    let rc = env.write_rc("phases=custom.json\npolicy=exclusive\n");
    std::fs::write(
        rc.parent().unwrap().join("custom.json"),
        r##"{"phases": [
            {"name": "Cut", "color": "#FF0000"},
            {"name": "Welded", "color": "#00FF00", "column": "Weld Date"}
        ]}"##,
    )
    .unwrap();
    let rows = env.write(
        "rows.json",
        r#"[{"PID": "a", "Cut": "x", "Weld Date": "2024-10-01"}, {"PID": "b", "Cut": "x"}]"#,
    );

    let output = env.cmd().args(["report", rows.to_str().unwrap(), "--json"]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["phaseCounts"]["Cut"], 1);
    assert_eq!(value["phaseCounts"]["Welded"], 1);
    assert_eq!(value["policy"], "exclusive");
}

#[test]
fn test_flag_overrides_rc_policy() {
    let env = TestEnv::new();
    env.write_rc("policy=exclusive\n");
    let rows = env.write("rows.json", SAMPLE_ROWS);

    env.cmd()
        .args(["report", rows.to_str().unwrap(), "--policy", "cumulative", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"policy\": \"cumulative\""));
}

#[test]
fn test_config_command_shows_effective_settings() {
    let env = TestEnv::new();

    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"))
        .stdout(predicate::str::contains("production (preset) (7 phases)"))
        .stdout(predicate::str::contains("Policy:      cumulative"))
        .stdout(predicate::str::contains("PID field:   PID"));

    env.write_rc("pid.field=Panel ID\ncolor.neutral=#202020\n");
    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(".phasemap"))
        .stdout(predicate::str::contains("PID field:   Panel ID"))
        .stdout(predicate::str::contains("Neutral:     #202020"));
}

#[test]
fn test_unknown_rc_key_warns() {
    let env = TestEnv::new();
    env.write_rc("colour=red\n");

    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring unknown config key 'colour'"));
}
