//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `preptest` command isolated from any real config or key.
fn preptest(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("preptest").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn mock_test(dir: &TempDir) -> Command {
    let mut cmd = preptest(dir);
    cmd.args([
        "test",
        "--mock",
        "--subject",
        "Physics",
        "--topic",
        "Kinematics",
        "--duration",
        "5",
    ]);
    cmd
}

fn single_report(dir: &std::path::Path, ext: &str) -> std::path::PathBuf {
    let mut found: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    assert_eq!(found.len(), 1, "expected one .{ext} report in {}", dir.display());
    found.remove(0)
}

#[test]
fn mock_test_all_correct() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    mock_test(&dir)
        .arg("--output")
        .arg(&out)
        .args(["--format", "all"])
        .write_stdin("a\nn\nb\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1 / 2"))
        .stdout(predicate::str::contains("Question 2 / 2"))
        .stdout(predicate::str::contains("Physics - Kinematics"))
        .stdout(predicate::str::contains("8 / 8"))
        .stdout(predicate::str::contains("Practice feedback generated offline"));

    let json = std::fs::read_to_string(single_report(&out, "json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(report["summary"]["score"], 8);
    assert_eq!(report["summary"]["correctCount"], 2);
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(report["feedback"]["status"], "generated");

    let html = std::fs::read_to_string(single_report(&out, "html")).unwrap();
    assert!(html.contains("8 / 8"));
}

#[test]
fn wrong_answer_costs_a_mark() {
    let dir = TempDir::new().unwrap();

    mock_test(&dir)
        .args(["--format", "none"])
        .write_stdin("b\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("-1 / 8"));
}

#[test]
fn end_of_input_submits() {
    let dir = TempDir::new().unwrap();

    mock_test(&dir)
        .args(["--format", "none"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 / 8"));
}

#[test]
fn navigation_keeps_answers() {
    let dir = TempDir::new().unwrap();

    // Answer q1, move to q2 and back, then submit from q1.
    mock_test(&dir)
        .args(["--format", "none"])
        .write_stdin("a\nn\np\np\nzz\ns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 / 8"))
        .stderr(predicate::str::contains("This is the first question."))
        .stderr(predicate::str::contains("Unknown command: zz"));
}

#[test]
fn quit_abandons_without_report() {
    let dir = TempDir::new().unwrap();

    mock_test(&dir)
        .write_stdin("a\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test abandoned."));

    assert!(!dir.path().join("preptest-results").exists());
}

#[test]
fn default_output_is_json() {
    let dir = TempDir::new().unwrap();

    mock_test(&dir).write_stdin("s\n").assert().success();

    let results = dir.path().join("preptest-results");
    single_report(&results, "json");
}

#[test]
fn empty_topic_is_rejected() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args(["test", "--mock", "--subject", "Physics", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please fill in all fields"));
}

#[test]
fn short_duration_is_rejected() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args([
            "test", "--mock", "--subject", "Physics", "--topic", "Optics", "--duration", "4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 5 minutes"));
}

#[test]
fn overlong_duration_is_rejected() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args([
            "test", "--mock", "--subject", "Physics", "--topic", "Optics", "--duration",
            "4000000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 180 minutes"));
}

#[test]
fn generate_hides_solutions_by_default() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args([
            "generate", "--mock", "--subject", "Physics", "--topic", "Kinematics", "--count", "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 3"))
        .stdout(predicate::str::contains("Kinematics practice problem 1 (JEE Main)"))
        .stdout(predicate::str::contains("answer hidden"))
        .stdout(predicate::str::contains("Step-by-Step").not());
}

#[test]
fn generate_with_solutions_and_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("set.json");

    preptest(&dir)
        .args([
            "generate", "--mock", "--subject", "Biology", "--topic", "Genetics", "--exam", "NEET",
            "--count", "2", "--solutions", "--output",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct Answer: (B)"))
        .stdout(predicate::str::contains("Worked offline for Biology"));

    let json = std::fs::read_to_string(&out).unwrap();
    let set: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(set.as_array().unwrap().len(), 2);
    assert_eq!(set[1]["number"], 2);
    assert!(set[0]["body"].as_str().unwrap().contains("(NEET)"));
}

#[test]
fn generate_requires_a_topic() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args(["generate", "--mock", "--subject", "Physics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a topic."));
}

#[test]
fn missing_api_key_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args(["test", "--subject", "Physics", "--topic", "Optics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load API configuration"));
}

#[test]
fn config_defaults_fill_the_form() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("preptest.toml"),
        "[test]\ndefault_subject = \"Chemistry\"\ndefault_duration_minutes = 12\n",
    )
    .unwrap();

    // 12 minutes gives 5 questions.
    preptest(&dir)
        .args(["test", "--mock", "--topic", "Bonding", "--format", "none"])
        .write_stdin("s\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1 / 5"))
        .stdout(predicate::str::contains("Chemistry - Bonding"))
        .stdout(predicate::str::contains("0 / 20"));
}

#[test]
fn check_config_accepts_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[gemini]\napi_key = \"AIza-test\"\n").unwrap();

    preptest(&dir)
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-1.5-flash-latest"))
        .stdout(predicate::str::contains("API key: OK"))
        .stdout(predicate::str::contains("AIza-test").not());
}

#[test]
fn check_config_rejects_placeholder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[gemini]\napi_key = \"your_gemini_api_key_here\"\n").unwrap();

    preptest(&dir)
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("placeholder"));
}

#[test]
fn check_config_missing_file() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .args(["check-config", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created preptest.toml"));

    assert!(dir.path().join("preptest.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    preptest(&dir).arg("init").assert().success();

    preptest(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timed JEE-style mock tests"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();

    preptest(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("preptest"));
}
