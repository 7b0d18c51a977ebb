use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_artifact_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("diabetes-predictor").unwrap();
    cmd.env("MODEL_PATH", dir.path().join("XGBM_model.json"))
        .env("PORT", "0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load model artifact"));
}

#[test]
fn corrupt_artifact_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, "{\"learner\": ").unwrap();

    let mut cmd = Command::cargo_bin("diabetes-predictor").unwrap();
    cmd.env("MODEL_PATH", &path)
        .env("PORT", "0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid XGBoost JSON"));
}
