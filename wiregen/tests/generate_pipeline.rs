//! End-to-end generation over an on-disk Go project.

use anyhow::Result;
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::{env, fs};
use wiregen::source::load_project;
use wiregen::{
    AnnotatorConfig, AppCfgAnnotator, ConfigDescriptor, CtorNamePolicy, FieldDescriptor,
    WiregenError,
};

const DB_SOURCE: &str = r#"package config

// DBCfg is database configuration
// @app-cfg (prefix:"DB" ctor_name:"NewDBCfg")
type DBCfg struct {
	Host string `default:"localhost"`
}
"#;

struct Workspace {
    _guard: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let (guard, root) = fs::temp_dir().expect("temporary directory");
    fs::write_file(&root, "go.mod", "module example.com/shop\n\ngo 1.21\n").expect("go.mod");
    Workspace {
        _guard: guard,
        root,
    }
}

fn annotator() -> AppCfgAnnotator {
    AppCfgAnnotator::new(AnnotatorConfig::default(), wiregen::render::NoopFormatter)
        .expect("default template compiles")
}

#[rstest]
fn db_config_generates_constructor_and_env_file(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["DB_HOST"]);
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;

    let project = load_project(&workspace.root)?;
    let report = annotator().annotate(&project)?;

    assert!(report.written);
    assert_eq!(
        report.target,
        workspace.root.join("internal/generated/app_cfg_annotated.go")
    );
    let generated = fs::read_file(&workspace.root, "internal/generated/app_cfg_annotated.go")?;
    assert!(generated.starts_with("package generated\n"));
    assert!(generated.contains("\"example.com/shop/internal/config\""));
    assert!(generated.contains("Name: \"NewDBCfg\""));
    assert!(generated.contains("envconfig.Process(\"DB\", &cfg)"));

    assert_eq!(fs::read_file(&workspace.root, ".env")?, "DB_HOST=localhost\n");
    let sync = report.env.expect("env sync enabled by default");
    assert_eq!(sync.added, vec!["DB_HOST"]);
    assert_eq!(std::env::var("DB_HOST").as_deref(), Ok("localhost"));
    Ok(())
}

#[rstest]
fn existing_env_value_is_preserved_and_live(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["DB_HOST"]);
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;
    fs::write_file(&workspace.root, ".env", "DB_HOST=prod.example.com\n")?;

    let report = annotator().annotate(&load_project(&workspace.root)?)?;

    let sync = report.env.expect("env sync enabled by default");
    assert!(sync.added.is_empty());
    assert!(!sync.persisted);
    assert_eq!(
        fs::read_file(&workspace.root, ".env")?,
        "DB_HOST=prod.example.com\n"
    );
    assert_eq!(std::env::var("DB_HOST").as_deref(), Ok("prod.example.com"));
    Ok(())
}

#[rstest]
fn repeated_runs_are_byte_identical(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["DB_HOST"]);
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;
    let annotator = annotator();

    annotator.annotate(&load_project(&workspace.root)?)?;
    let first = fs::read_file(&workspace.root, "internal/generated/app_cfg_annotated.go")?;
    let second_report = annotator.annotate(&load_project(&workspace.root)?)?;
    let second = fs::read_file(&workspace.root, "internal/generated/app_cfg_annotated.go")?;

    assert_eq!(first, second);
    assert!(second_report.env.is_some_and(|sync| sync.added.is_empty()));
    Ok(())
}

#[rstest]
fn removing_the_last_annotation_deletes_generated_file(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["DB_HOST"]);
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;
    let annotator = annotator();
    annotator.annotate(&load_project(&workspace.root)?)?;

    fs::write_file(
        &workspace.root,
        "internal/config/db.go",
        "package config\n\ntype DBCfg struct {\n\tHost string\n}\n",
    )?;
    let report = annotator.annotate(&load_project(&workspace.root)?)?;

    assert!(report.removed);
    assert!(!report.written);
    assert!(!report.target.exists());

    let again = annotator.annotate(&load_project(&workspace.root)?)?;
    assert!(!again.removed);
    Ok(())
}

#[rstest]
fn nothing_annotated_stops_before_env_sync(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["PIPE_EMPTY_FLAG", "PIPE_EMPTY_MODULE"]);
    fs::write_file(
        &workspace.root,
        "internal/config/db.go",
        "package config\n\ntype DBCfg struct {\n\tHost string\n}\n",
    )?;
    fs::write_file(&workspace.root, ".env", "PIPE_EMPTY_FLAG=on\n")?;
    let module_configs = [ConfigDescriptor {
        ctor_name: "NewModule".to_owned(),
        prefix: "PIPE_EMPTY".to_owned(),
        spec_type: "module.Config".to_owned(),
        fields: vec![FieldDescriptor {
            key: "PIPE_EMPTY_MODULE".to_owned(),
            default: "1".to_owned(),
        }],
    }];

    let report = annotator().annotate_with(&load_project(&workspace.root)?, &module_configs)?;

    assert!(!report.written);
    assert!(report.env.is_none());
    assert_eq!(fs::read_file(&workspace.root, ".env")?, "PIPE_EMPTY_FLAG=on\n");
    assert!(std::env::var_os("PIPE_EMPTY_FLAG").is_none());
    Ok(())
}

#[rstest]
fn side_effect_packages_are_blank_imported(workspace: Workspace) -> Result<()> {
    let _scope = env::EnvScope::cleared(["DB_HOST"]);
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;
    let config = AnnotatorConfig {
        side_effects: vec!["github.com/lib/pq".to_owned()],
        dotenv: false,
        ..AnnotatorConfig::default()
    };
    AppCfgAnnotator::new(config, wiregen::render::NoopFormatter)?
        .annotate(&load_project(&workspace.root)?)?;

    let generated = fs::read_file(&workspace.root, "internal/generated/app_cfg_annotated.go")?;
    assert!(generated.contains("\t_ \"github.com/lib/pq\"\n"));
    Ok(())
}

#[rstest]
fn dotenv_disabled_leaves_env_file_alone(workspace: Workspace) -> Result<()> {
    fs::write_file(&workspace.root, "internal/config/db.go", DB_SOURCE)?;
    let config = AnnotatorConfig {
        dotenv: false,
        destination: "cmd/shop".into(),
        ..AnnotatorConfig::default()
    };
    let report = AppCfgAnnotator::new(config, wiregen::render::NoopFormatter)?
        .annotate(&load_project(&workspace.root)?)?;

    assert!(report.env.is_none());
    assert!(!workspace.root.join(".env").exists());
    let generated = fs::read_file(&workspace.root, "cmd/shop/app_cfg_annotated.go")?;
    assert!(generated.starts_with("package shop\n"));
    Ok(())
}

#[rstest]
fn reject_policy_fails_on_unnamed_constructor(workspace: Workspace) -> Result<()> {
    fs::write_file(
        &workspace.root,
        "internal/config/server.go",
        "package config\n\n// @app-cfg\ntype Server struct {\n\tAddr string `default:\":8080\"`\n}\n",
    )?;
    let config = AnnotatorConfig {
        ctor_policy: CtorNamePolicy::Reject,
        dotenv: false,
        ..AnnotatorConfig::default()
    };
    let err = AppCfgAnnotator::new(config, wiregen::render::NoopFormatter)?
        .annotate(&load_project(&workspace.root)?)
        .expect_err("unnamed constructor rejected");

    assert!(matches!(
        err,
        WiregenError::UnnamedConstructor { ref spec_type } if spec_type == "config.Server"
    ));
    Ok(())
}

#[rstest]
fn malformed_tag_names_the_declaration(workspace: Workspace) -> Result<()> {
    fs::write_file(
        &workspace.root,
        "internal/config/bad.go",
        "package config\n\n// @app-cfg (prefix:BAD)\ntype Bad struct{}\n",
    )?;
    let err = annotator()
        .annotate(&load_project(&workspace.root)?)
        .expect_err("malformed tag");
    assert!(err.to_string().contains("config.Bad"), "unexpected error: {err}");
    Ok(())
}
