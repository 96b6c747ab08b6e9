//! Tests for template rendering and import formatters.

use super::*;
use crate::error::WiregenError;
use crate::synth::FieldDescriptor;
use rstest::{fixture, rstest};

#[fixture]
fn db() -> ConfigDescriptor {
    ConfigDescriptor {
        ctor_name: "NewDBCfg".to_owned(),
        prefix: "DB".to_owned(),
        spec_type: "config.DBCfg".to_owned(),
        fields: vec![FieldDescriptor {
            key: "DB_HOST".to_owned(),
            default: "localhost".to_owned(),
        }],
    }
}

fn imports() -> Vec<String> {
    vec![
        "example.com/app/internal/config".to_owned(),
        "github.com/kelseyhightower/envconfig".to_owned(),
    ]
}

fn source(rendered: Rendered) -> String {
    match rendered {
        Rendered::Source(text) => text,
        Rendered::Empty => panic!("expected rendered source"),
    }
}

#[rstest]
fn renders_named_constructor_reading_prefixed_env(db: ConfigDescriptor) {
    let renderer = Renderer::new().expect("default template compiles");
    let text = source(renderer.render("app", &imports(), &[], &[db]).expect("renders"));

    assert!(text.starts_with("package app\n"));
    assert!(text.contains("\t\"example.com/app/internal/config\"\n"));
    assert!(text.contains("\t\"github.com/kelseyhightower/envconfig\"\n"));
    assert!(text.contains("\t\t\tName: \"NewDBCfg\",\n"));
    assert!(text.contains("\t\t\tFn: func() (*config.DBCfg, error) {\n"));
    assert!(text.contains("\t\t\t\tvar cfg config.DBCfg\n"));
    assert!(text.contains("envconfig.Process(\"DB\", &cfg)"));
}

#[rstest]
fn side_effect_packages_become_blank_imports(db: ConfigDescriptor) {
    let renderer = Renderer::new().expect("default template compiles");
    let side_effects = vec!["github.com/lib/pq".to_owned()];
    let text = source(
        renderer
            .render("app", &imports(), &side_effects, &[db])
            .expect("renders"),
    );

    assert!(text.contains("\t\"github.com/kelseyhightower/envconfig\"\n\t_ \"github.com/lib/pq\"\n)"));
}

#[rstest]
fn constructors_follow_descriptor_order(db: ConfigDescriptor) {
    let server = ConfigDescriptor {
        ctor_name: "NewServer".to_owned(),
        prefix: "SERVER".to_owned(),
        spec_type: "config.Server".to_owned(),
        fields: Vec::new(),
    };
    let renderer = Renderer::new().expect("default template compiles");
    let text = source(renderer.render("app", &imports(), &[], &[server, db]).expect("renders"));
    let server_at = text.find("NewServer").expect("server constructor");
    let db_at = text.find("NewDBCfg").expect("db constructor");
    assert!(server_at < db_at);
    assert_eq!(text.matches("&typapp.Constructor{").count(), 2);
}

#[rstest]
fn rendering_is_deterministic(db: ConfigDescriptor) {
    let renderer = Renderer::new().expect("default template compiles");
    let configs = [db];
    let first = renderer.render("app", &imports(), &[], &configs).expect("renders");
    let second = renderer.render("app", &imports(), &[], &configs).expect("renders");
    assert_eq!(first, second);
}

#[rstest]
fn empty_descriptor_list_renders_nothing() {
    let renderer = Renderer::new().expect("default template compiles");
    assert_eq!(
        renderer.render("app", &imports(), &[], &[]).expect("renders"),
        Rendered::Empty
    );
}

#[rstest]
fn custom_template_sees_fields(db: ConfigDescriptor) {
    let renderer = Renderer::with_template(
        "{% for c in configs %}{% for f in c.fields %}{{ f.key }}={{ f.default }};{% endfor %}{% endfor %}",
    )
    .expect("template compiles");
    let text = source(renderer.render("app", &[], &[], &[db]).expect("renders"));
    assert_eq!(text, "DB_HOST=localhost;");
}

#[rstest]
fn invalid_template_is_a_template_error() {
    let err = Renderer::with_template("{% for %}").expect_err("template must not compile");
    assert!(matches!(err, WiregenError::Template(_)));
}

#[rstest]
fn noop_formatter_succeeds() {
    assert!(NoopFormatter.format(Utf8Path::new("missing.go")).is_ok());
}

#[rstest]
fn missing_formatter_program_reports_error() {
    let formatter = GoImports::with_program("wiregen-test-no-such-formatter");
    assert!(formatter.format(Utf8Path::new("missing.go")).is_err());
}
