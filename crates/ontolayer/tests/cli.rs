use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ontolayer() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ontolayer").into();
    cmd.env_remove("ONTOLAYER_FRAMEWORK");
    cmd.env_remove("ONTOLAYER_GROUP_ID");
    cmd.env_remove("ONTOLAYER_FRAMEWORK_NAME");
    cmd.env_remove("ONTOLAYER_RELATIONSHIP_THRESHOLD");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../ontolayer-core/tests/fixtures")
        .join(name)
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    ontolayer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ontolayer"));
}

// --- Classify ---

#[test]
fn classify_prints_model_json() {
    ontolayer()
        .arg("classify")
        .arg(fixture("cobit5.ttl"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"local_name\":\"GovernanceControl\"")
                .and(predicate::str::contains("\"primary_layer\":\"business\""))
                .and(predicate::str::contains("\"layer_statistics\"")),
        );
}

#[test]
fn classify_with_framework_adds_tags() {
    ontolayer()
        .args(["classify", "--framework", "iso17025"])
        .arg(fixture("lab.ttl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"iso17025_clause\":\"7\""));
}

#[test]
fn classify_missing_file_fails() {
    ontolayer()
        .args(["classify", "/nonexistent/onto.ttl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn classify_missing_owl_file_fails_as_not_found() {
    ontolayer()
        .args(["classify", "/nonexistent/onto.owl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn classify_reads_turtle_with_any_extension() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("onto.owl");
    fs::copy(fixture("cobit5.ttl"), &path).unwrap();

    ontolayer()
        .arg("classify")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"local_name\":\"GovernanceControl\""));
}

#[test]
fn classify_resolves_relative_iris() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("onto.ttl");
    fs::write(
        &path,
        "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n<#Audit> a owl:Class .\n",
    )
    .unwrap();

    ontolayer()
        .arg("classify")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"local_name\":\"Audit\"")
                .and(predicate::str::contains("onto.ttl#Audit")),
        );
}

#[test]
fn classify_rejects_unknown_framework() {
    ontolayer()
        .args(["classify", "--framework", "itil"])
        .arg(fixture("cobit5.ttl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid framework"));
}

#[test]
fn framework_from_environment() {
    ontolayer()
        .env("ONTOLAYER_FRAMEWORK", "cobit5")
        .arg("classify")
        .arg(fixture("cobit5.ttl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cobit5_domain\":\"EDM\""));
}

// --- Stats ---

#[test]
fn stats_reports_counts() {
    ontolayer()
        .arg("stats")
        .arg(fixture("cobit5.ttl"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Triples: 18")
                .and(predicate::str::contains("Classes: 4"))
                .and(predicate::str::contains("Relationships: 1"))
                .and(predicate::str::contains("Framework:").not()),
        );
}

#[test]
fn stats_on_empty_ontology() {
    ontolayer()
        .arg("stats")
        .arg(fixture("empty.ttl"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Ontology: (undeclared)")
                .and(predicate::str::contains("Triples: 0")),
        );
}

// --- Import ---

#[test]
fn import_dry_run_prints_episodes() {
    ontolayer()
        .args(["import", "--framework", "cobit5", "--group-id", "kb-test"])
        .arg(fixture("cobit5.ttl"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"name\":\"COBIT5 Ontology Metadata\"")
                .and(predicate::str::contains("\"group_id\":\"kb-test\""))
                .and(predicate::str::contains("COBIT5 Framework Analysis")),
        )
        .stderr(predicate::str::contains("Submitted"));
}

#[test]
fn import_directory_reports_bad_files() {
    let tmp = TempDir::new().unwrap();
    fs::copy(fixture("lab.ttl"), tmp.path().join("lab.ttl")).unwrap();
    fs::write(tmp.path().join("broken.ttl"), "lab:Oops a ").unwrap();

    ontolayer()
        .args(["import", "--framework-name", "Lab"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Lab Ontology Metadata"))
        .stderr(predicate::str::contains("broken.ttl"));
}
