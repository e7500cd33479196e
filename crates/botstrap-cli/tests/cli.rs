use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `botstrap` with an isolated config dir and no inherited overrides.
fn botstrap(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("botstrap").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("BOTSTRAP_TEMPLATES_DIR")
        .env_remove("BOTSTRAP_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    botstrap(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("--no-interactive"));
}

#[test]
fn test_list_prints_bundled_templates() {
    let home = TempDir::new().unwrap();
    botstrap(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Templates:"))
        .stdout(predicate::str::contains("minimal-ts"))
        .stdout(predicate::str::contains("minimal-js"))
        .stdout(predicate::str::contains("deno, node, bun"));
}

#[test]
fn test_list_json() {
    let home = TempDir::new().unwrap();
    let output = botstrap(home.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["minimal-ts", "minimal-js"]);
}

#[test]
fn test_list_empty_catalog() {
    let home = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    fs::write(templates.path().join("catalog.toml"), "").unwrap();

    botstrap(home.path())
        .arg("list")
        .arg("--templates-dir")
        .arg(templates.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates available."));
}

#[test]
fn test_list_reports_invalid_catalog() {
    let home = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    fs::write(
        templates.path().join("catalog.toml"),
        r#"
[[templates]]
name = "Bad Name"
description = "x"
runtimes = ["deno"]
files = [{ path = "bot.ts" }]
"#,
    )
    .unwrap();

    botstrap(home.path())
        .args(["list", "--templates-dir"])
        .arg(templates.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Bad Name"));
}

#[test]
fn test_new_generates_project_without_prompts() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    botstrap(home.path())
        .current_dir(work.path())
        .args([
            "new",
            "echo-bot",
            "--template",
            "minimal-ts",
            "--runtime",
            "deno",
            "--no-interactive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project generated at"));

    let project = work.path().join("echo-bot");
    let bot = fs::read_to_string(project.join("src/bot.ts")).unwrap();
    assert!(bot.starts_with("// echo-bot: grammY bot (minimal-ts, deno)"));
    assert!(bot.contains("Deno.env.get(\"BOT_TOKEN\")"));
    assert!(project.join("tsconfig.json").is_file());
    assert!(project.join(".gitignore").is_file());
    assert!(!project.join("_partials").exists());

    let deno_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(project.join("deno.json")).unwrap()).unwrap();
    assert_eq!(deno_json["name"], "echo-bot");
    let package_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(project.join("package.json")).unwrap()).unwrap();
    assert_eq!(package_json["name"], "echo-bot");
}

#[test]
fn test_new_refuses_non_empty_directory() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("keep.txt"), "x").unwrap();

    botstrap(home.path())
        .args(["new", "bot", "-t", "minimal-js", "-r", "node", "--no-interactive", "--dir"])
        .arg(work.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not empty"));
}

#[test]
fn test_new_unknown_template() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    botstrap(home.path())
        .current_dir(work.path())
        .args(["new", "bot", "-t", "fancy", "--no-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown template 'fancy'"));
}

#[test]
fn test_user_config_supplies_runtime() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("botstrap")).unwrap();
    fs::write(
        home.path().join("botstrap/config.toml"),
        "default_runtime = \"bun\"\ninteractive = false\n",
    )
    .unwrap();

    botstrap(home.path())
        .current_dir(work.path())
        .args(["new", "bun-bot", "-t", "minimal-js"])
        .assert()
        .success();

    let package = fs::read_to_string(work.path().join("bun-bot/package.json")).unwrap();
    assert!(package.contains("bun --watch src/bot.js"));
}

#[test]
fn test_malformed_user_config_fails() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("botstrap")).unwrap();
    fs::write(home.path().join("botstrap/config.toml"), "interactive = [").unwrap();

    botstrap(home.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_doctor_prints_grouped_report() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    botstrap(home.path())
        .current_dir(work.path())
        .arg("doctor")
        .assert()
        .stdout(predicate::str::contains("Runtime Environment:"))
        .stdout(predicate::str::contains("Project Configuration:"))
        .stdout(predicate::str::contains("deno.json not found"))
        .stdout(predicate::str::contains("Summary:"));
}
