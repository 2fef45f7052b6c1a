use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> String {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_vaxsim"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        String::from_utf8(output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );

    stdout_str
}

fn write_config(name: &str, contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    fs::write(&config_path, contents).expect("failed to write config file");
    config_path
}

#[test]
fn basic_workflow() {
    let config_contents = String::new()
        + "[init]\n"
        + "n_agents = 120\n"
        + "width = 10\n"
        + "height = 10\n"
        + "initial_infection = 0.1\n"
        + "\n"
        + "[model]\n"
        + "transmissibility = 0.5\n"
        + "mean_length_of_disease = 5.0\n"
        + "global_pro_factor = 1.05\n"
        + "global_pro_factor_threshold = 0.1\n"
        + "\n"
        + "[output]\n"
        + "n_steps = 25\n"
        + "seed = 34\n";
    let config_path = write_config("basic_workflow", &config_contents);
    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let history = run_bin(&["--config", config_str, "run"]);
    assert_eq!(history.matches("[[records]]").count(), 25);
    assert!(history.contains("Total_Infected"));
    assert!(history.contains("Total_Vaccinated"));

    let again = run_bin(&["--config", config_str, "run"]);
    assert_eq!(history, again, "seeded runs should be reproducible");

    let shorter = run_bin(&["--config", config_str, "--steps", "5", "run"]);
    assert_eq!(shorter.matches("[[records]]").count(), 5);

    let report = run_bin(&["--config", config_str, "--seed", "7", "analyze"]);
    assert!(report.contains("[final]"));
    assert!(report.contains("[peak]"));
    assert!(report.contains("[series.Total_Susceptible]"));

    let shown = run_bin(&["--config", config_str, "show-config"]);
    assert!(shown.contains("n_agents = 120"));
    assert!(shown.contains("seed = 34"));

    fs::remove_dir_all(config_path.parent().expect("config has a parent")).ok();
}

#[test]
fn runs_with_defaults() {
    let history = run_bin(&["--seed", "1", "--steps", "3", "run"]);
    assert_eq!(history.matches("[[records]]").count(), 3);

    let shown = run_bin(&["show-config"]);
    assert!(shown.contains("prevalence = \"round-start\""));
}

#[test]
fn invalid_config_fails() {
    let config_path = write_config("invalid_config", "[model]\ntransmissibility = 2.0\n");
    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let bin = PathBuf::from(env!("CARGO_BIN_EXE_vaxsim"));
    let output = Command::new(bin)
        .args(["--config", config_str, "run"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());

    fs::remove_dir_all(config_path.parent().expect("config has a parent")).ok();
}
