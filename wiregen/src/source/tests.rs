//! Tests for the Go source front-end.

use super::*;
use rstest::rstest;

fn parse(text: &str) -> SourceFile {
    parse_source("internal/config/config.go", text).expect("source parses")
}

fn decl<'a>(file: &'a SourceFile, name: &str) -> &'a TypeDecl {
    file.decls
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("declaration {name} missing"))
}

#[rstest]
fn parses_single_struct_with_doc_and_tags() {
    let file = parse(
        r#"package config

import "time"

// DBCfg holds database settings
// @app-cfg (prefix:"DB" ctor_name:"NewDBCfg")
type DBCfg struct {
	Host    string        `default:"localhost"`
	Port    int           `default:"5432" envconfig:"PORT_NUM"`
	Timeout time.Duration // no tag
}
"#,
    );
    assert_eq!(file.package, "config");
    let db = decl(&file, "DBCfg");
    assert_eq!(db.kind, DeclKind::Struct);
    assert_eq!(db.package, "config");
    assert_eq!(db.dir, Utf8PathBuf::from("internal/config"));
    assert_eq!(
        db.doc,
        "DBCfg holds database settings\n@app-cfg (prefix:\"DB\" ctor_name:\"NewDBCfg\")"
    );
    let fields: Vec<(&str, &str)> = db
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.tag.as_str()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("Host", "default:\"localhost\""),
            ("Port", "default:\"5432\" envconfig:\"PORT_NUM\""),
            ("Timeout", ""),
        ]
    );
}

#[rstest]
fn grouped_declarations_take_their_own_docs() {
    let file = parse(
        r#"package service

type (
	// BookSvc is an interface
	// @mock
	BookSvc interface {
		Find(ctx context.Context) ([]*Book, error)
	}
	// Settings for the service
	// @app-cfg
	Settings struct {
		dig.In
		*Embedded
		Limit, Offset uint64 `default:"10"`
		Nested struct {
			Inner string `default:"x"`
		}
	}
	Plain int
)
"#,
    );
    let names: Vec<&str> = file.decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["BookSvc", "Settings", "Plain"]);

    let svc = decl(&file, "BookSvc");
    assert_eq!(svc.kind, DeclKind::Other);
    assert_eq!(svc.doc, "BookSvc is an interface\n@mock");

    let settings = decl(&file, "Settings");
    assert_eq!(settings.doc, "Settings for the service\n@app-cfg");
    let fields: Vec<&str> = settings.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["In", "Embedded", "Limit", "Offset", "Nested"]);
    assert!(
        settings
            .fields
            .iter()
            .filter(|f| f.name == "Limit" || f.name == "Offset")
            .all(|f| f.tag == "default:\"10\"")
    );

    assert!(decl(&file, "Plain").doc.is_empty());
}

#[rstest]
fn doc_separated_by_blank_line_is_not_attached() {
    let file = parse("package a\n\n// @app-cfg\n\ntype Loose struct {\n\tA string\n}\n");
    assert!(decl(&file, "Loose").doc.is_empty());
}

#[rstest]
fn block_comment_doc_and_function_bodies() {
    let file = parse(
        r#"package a

func helper() {
	type inner struct{ X int }
	_ = "type Fake struct {}"
}

/* @app-cfg (prefix:"SRV") */
type Server struct{ Addr string; Port int }

type List []string
type Pair[K comparable, V any] struct {
	Key K
}
"#,
    );
    let names: Vec<&str> = file.decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Server", "List", "Pair"]);
    let server = decl(&file, "Server");
    assert_eq!(server.doc, "@app-cfg (prefix:\"SRV\")");
    let fields: Vec<&str> = server.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["Addr", "Port"]);
    assert_eq!(decl(&file, "List").kind, DeclKind::Other);
    assert_eq!(decl(&file, "Pair").kind, DeclKind::Struct);
}

#[rstest]
#[case::string("package a\nvar s = \"open\n")]
#[case::raw("package a\nvar s = `open\n")]
#[case::comment("package a\n/* open\n")]
fn unterminated_literals_fail_with_location(#[case] text: &str) {
    let err = parse_source("pkg/a.go", text).expect_err("parsing should fail");
    assert!(
        matches!(&err, WiregenError::Parse { declaration, .. } if declaration.starts_with("pkg/a.go:")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn trailing_comment_is_not_a_doc_comment() {
    let file = parse(
        r#"package config

var port = 8080 // @app-cfg (prefix:"X")
type Plain struct{}

type (
	Host string // @app-cfg (prefix:"Y")
	Name string
)
"#,
    );
    assert_eq!(decl(&file, "Plain").doc, "");
    assert_eq!(decl(&file, "Name").doc, "");
}

#[rstest]
#[case("module github.com/acme/shop\n\ngo 1.21\n", Some("github.com/acme/shop"))]
#[case("// comment\nmodule \"example.com/quoted\"\n", Some("example.com/quoted"))]
#[case("go 1.21\n", None)]
#[case("modules are not here\n", None)]
fn reads_module_directive(#[case] contents: &str, #[case] expected: Option<&str>) {
    let module = GoModule::parse(contents);
    assert_eq!(module.as_ref().map(|m| m.path.as_str()), expected);
}

#[rstest]
fn module_import_paths_and_name() {
    let module = GoModule {
        path: "github.com/acme/shop".to_owned(),
    };
    assert_eq!(module.import_path(Utf8Path::new("")), "github.com/acme/shop");
    assert_eq!(
        module.import_path(Utf8Path::new("internal/config")),
        "github.com/acme/shop/internal/config"
    );
    assert_eq!(module.name(), "shop");
}

#[rstest]
fn load_project_collects_sorted_non_test_sources() -> anyhow::Result<()> {
    let (_guard, root) = test_helpers::fs::temp_dir()?;
    test_helpers::fs::write_file(&root, "go.mod", "module example.com/app\n")?;
    test_helpers::fs::write_file(&root, "b/b.go", "package b\ntype B struct{}\n")?;
    test_helpers::fs::write_file(&root, "a/a.go", "package a\ntype A struct{}\n")?;
    test_helpers::fs::write_file(&root, "a/a_test.go", "package a\ntype T struct{}\n")?;
    test_helpers::fs::write_file(&root, "vendor/v/v.go", "package v\ntype V struct{}\n")?;
    test_helpers::fs::write_file(&root, ".git/x.go", "package x\ntype X struct{}\n")?;

    let project = load_project(&root)?;
    let paths: Vec<&str> = project.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["a/a.go", "b/b.go"]);
    assert_eq!(
        project.module.map(|m| m.path),
        Some("example.com/app".to_owned())
    );
    Ok(())
}
