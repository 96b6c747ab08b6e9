//! Drives the compiled `wiregen` binary against temporary Go projects.

use anyhow::Result;
use assert_cmd::Command;
use camino::Utf8PathBuf;
use predicates::prelude::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::fs;

const DB_SOURCE: &str = r#"package config

// DBCfg is database configuration
// @app-cfg (prefix:"DB" ctor_name:"NewDBCfg")
type DBCfg struct {
	Host string `default:"localhost"`
}
"#;

struct Project {
    _guard: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn project() -> Project {
    let (guard, root) = fs::temp_dir().expect("temporary directory");
    fs::write_file(&root, "go.mod", "module example.com/shop\n\ngo 1.21\n").expect("go.mod");
    fs::write_file(&root, "internal/config/db.go", DB_SOURCE).expect("source");
    Project {
        _guard: guard,
        root,
    }
}

fn wiregen(root: &str) -> Result<Command> {
    let mut cmd = Command::cargo_bin("wiregen")?;
    cmd.args(["--root", root])
        .env_remove("RUST_LOG")
        .env_remove("DB_HOST")
        .env_remove("WIREGEN_ENV_FILE")
        .env_remove("WIREGEN_DOTENV");
    Ok(cmd)
}

#[rstest]
fn generate_writes_wiring_and_env_file(project: Project) -> Result<()> {
    wiregen(project.root.as_str())?
        .args(["generate", "--no-format"])
        .assert()
        .success()
        .stderr(predicate::str::contains("generated @app-cfg wiring"));

    let generated = fs::read_file(&project.root, "internal/generated/app_cfg_annotated.go")?;
    assert!(generated.contains("Name: \"NewDBCfg\""));
    assert_eq!(fs::read_file(&project.root, ".env")?, "DB_HOST=localhost\n");
    Ok(())
}

#[rstest]
fn settings_file_and_flags_are_layered(project: Project) -> Result<()> {
    fs::write_file(
        &project.root,
        "wiregen.toml",
        "destination = \"cmd/shop\"\nformat = false\n",
    )?;
    wiregen(project.root.as_str())?
        .args(["generate", "--env-file", "config/local.env"])
        .assert()
        .success();

    let generated = fs::read_file(&project.root, "cmd/shop/app_cfg_annotated.go")?;
    assert!(generated.starts_with("package shop\n"));
    assert_eq!(
        fs::read_file(&project.root, "config/local.env")?,
        "DB_HOST=localhost\n"
    );
    assert!(!project.root.join(".env").exists());
    Ok(())
}

#[rstest]
#[case::name(None, "", "Invalid Context: Name can't be empty")]
#[case::root(Some(""), "shop", "Invalid Context: Root can't be empty")]
fn invalid_context_fails_before_any_command(
    project: Project,
    #[case] root: Option<&str>,
    #[case] name: &str,
    #[case] message: &str,
) -> Result<()> {
    wiregen(root.unwrap_or(project.root.as_str()))?
        .args(["--name", name, "generate", "--no-format"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));

    assert!(!project.root.join("internal/generated").exists());
    assert!(!project.root.join(".env").exists());
    Ok(())
}

#[rstest]
fn scan_lists_declarations_without_writing(project: Project) -> Result<()> {
    wiregen(project.root.as_str())?
        .arg("scan")
        .assert()
        .success()
        .stderr(predicate::str::contains("DBCfg"))
        .stderr(predicate::str::contains("count=1"));

    assert!(!project.root.join("internal/generated").exists());
    assert!(!project.root.join(".env").exists());
    Ok(())
}

#[rstest]
fn env_command_only_synchronises(project: Project) -> Result<()> {
    fs::write_file(&project.root, ".env", "APP_DEBUG=true\n")?;
    wiregen(project.root.as_str())?.arg("env").assert().success();

    assert_eq!(
        fs::read_file(&project.root, ".env")?,
        "APP_DEBUG=true\nDB_HOST=localhost\n"
    );
    assert!(!project.root.join("internal/generated").exists());
    Ok(())
}

#[rstest]
fn malformed_annotation_fails_with_declaration(project: Project) -> Result<()> {
    fs::write_file(
        &project.root,
        "internal/config/bad.go",
        "package config\n\n// @app-cfg (prefix:BAD)\ntype Bad struct{}\n",
    )?;
    wiregen(project.root.as_str())?
        .args(["generate", "--no-format"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.Bad"));
    Ok(())
}
