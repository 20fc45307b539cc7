use assert_cmd::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

#[test]
fn run_default_experiment_to_stdout() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("hhsim")?;
    cmd.args(["run", "--total-time", "1", "--dt", "0.25"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output)?;

    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 5, "one row per time point");
    assert_eq!(rows[0], "0,0,0,0");
    for row in &rows {
        assert_eq!(row.split(',').count(), 4, "time plus three neurons: {}", row);
    }
    assert!(rows[4].starts_with("1,"));
    Ok(())
}

#[test]
fn init_then_run_to_file() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let experiment = tmp.path().join("exp.toml");
    let csv = tmp.path().join("out.csv");

    Command::cargo_bin("hhsim")?
        .args(["init", experiment.to_str().expect("temp path to UTF-8")])
        .assert()
        .success();
    assert!(experiment.exists(), "experiment file should exist");
    let written = fs::read_to_string(&experiment)?;
    assert!(written.contains("[[synapses]]"));
    assert!(written.contains("[[stimulus]]"));

    Command::cargo_bin("hhsim")?
        .args([
            "run",
            experiment.to_str().expect("temp path to UTF-8"),
            "--total-time", "10",
            "--header",
            "-o", csv.to_str().expect("temp path to UTF-8"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&csv)?;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("time,N0,N1,N2"));
    assert!(lines.count() > 400);
    Ok(())
}

#[test]
fn init_refuses_to_overwrite() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let experiment = tmp.path().join("exp.toml");
    let path = experiment.to_str().expect("temp path to UTF-8");

    Command::cargo_bin("hhsim")?.args(["init", path]).assert().success();
    Command::cargo_bin("hhsim")?
        .args(["init", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Command::cargo_bin("hhsim")?.args(["init", path, "--force"]).assert().success();
    Ok(())
}

#[test]
fn run_rejects_zero_time_step() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("hhsim")?
        .args(["run", "--dt", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time step"));
    Ok(())
}

#[test]
fn run_rejects_oversized_time_axis() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("hhsim")?
        .args(["run", "--dt", "1e-12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time step"));
    Ok(())
}

#[test]
fn run_rejects_unknown_synapse_target() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let experiment = tmp.path().join("bad.toml");
    fs::write(
        &experiment,
        r#"
[neurons]
count = 2

[[synapses]]
pre = 0
post = 5
weight = 0.5
"#,
    )?;

    Command::cargo_bin("hhsim")?
        .args(["run", experiment.to_str().expect("temp path to UTF-8")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("N5 not found"));
    Ok(())
}

#[test]
fn single_neuron_spikes_under_pulse() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let experiment = tmp.path().join("single.toml");
    fs::write(
        &experiment,
        r#"
[simulation]
total_time_ms = 20.0

[neurons]
count = 1

[[stimulus]]
neuron = 0
amplitude = 10.0
start_ms = 5.0
end_ms = 30.0
"#,
    )?;

    let output = Command::cargo_bin("hhsim")?
        .args(["run", experiment.to_str().expect("temp path to UTF-8")])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output)?;
    let peak = text
        .lines()
        .filter_map(|line| line.split(',').nth(1))
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(peak > 90.0, "peak {}", peak);
    Ok(())
}
