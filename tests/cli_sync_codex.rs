mod common;

use common::TestEnv;
use predicates::prelude::*;

fn write(path: &std::path::Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn sync_missing_source_fails_and_leaves_dest_alone() {
    let env = TestEnv::new();
    let source = env.dir.path().join("nope.toml");
    let dest = env.dir.path().join("codex").join("config.toml");
    write(&dest, "model = \"old\"\n");

    env.chime()
        .args(["sync-codex"])
        .arg("--source")
        .arg(&source)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "model = \"old\"\n");
    assert!(!dest.with_file_name("config.toml.backup").exists());
}

#[test]
fn sync_preserves_destination_projects() {
    let env = TestEnv::new();
    let source = env.dir.path().join("dotfiles.toml");
    let dest = env.dir.path().join("codex").join("config.toml");
    write(
        &source,
        r#"
model = "gpt-5"
projects = {}

[model_providers.local]
base_url = "http://localhost:1234/v1"
"#,
    );
    write(
        &dest,
        r#"
model = "gpt-4"

[projects."/a"]
trust = "full"
"#,
    );

    env.chime()
        .args(["sync-codex"])
        .arg("--source")
        .arg(&source)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Preserved 1 project trust setting"));

    let merged: toml::value::Table =
        toml::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(merged["model"].as_str(), Some("gpt-5"));
    assert_eq!(merged["projects"]["/a"]["trust"].as_str(), Some("full"));
    assert_eq!(
        merged["model_providers"]["local"]["base_url"].as_str(),
        Some("http://localhost:1234/v1")
    );
}

#[test]
fn sync_backs_up_existing_destination() {
    let env = TestEnv::new();
    let source = env.dir.path().join("dotfiles.toml");
    let dest = env.dir.path().join("codex").join("config.toml");
    write(&source, "model = \"gpt-5\"\n");
    write(&dest, "model = \"gpt-4\"\n");

    env.chime()
        .args(["sync-codex"])
        .arg("--source")
        .arg(&source)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));

    let backup = dest.with_file_name("config.toml.backup");
    assert_eq!(
        std::fs::read_to_string(&backup).unwrap(),
        "model = \"gpt-4\"\n"
    );
}

#[test]
fn sync_creates_destination_when_absent() {
    let env = TestEnv::new();
    let source = env.dir.path().join("dotfiles.toml");
    let dest = env.dir.path().join("fresh").join("config.toml");
    write(
        &source,
        r#"
model = "gpt-5"

[mcp_servers.files]
command = "mcp-files"
args = ["--root", "/tmp"]
"#,
    );

    env.chime()
        .args(["sync-codex"])
        .arg("--source")
        .arg(&source)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success();

    let merged: toml::value::Table =
        toml::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(merged["mcp_servers"]["files"]["command"].as_str(), Some("mcp-files"));
}

#[test]
fn sync_json_output_reports_outcome() {
    let env = TestEnv::new();
    let source = env.dir.path().join("dotfiles.toml");
    let dest = env.dir.path().join("codex").join("config.toml");
    write(&source, "model = \"gpt-5\"\n[profiles.fast]\nmodel = \"gpt-5-mini\"\n");

    let output = env
        .chime()
        .args(["sync-codex", "--json"])
        .arg("--source")
        .arg(&source)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(outcome["preserved_projects"].as_i64(), Some(0));
    let sections: Vec<&str> = outcome["synced_sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert!(sections.contains(&"model"));
    assert!(sections.contains(&"profiles"));
}
