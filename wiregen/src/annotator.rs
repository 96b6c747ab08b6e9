//! The `@app-cfg` pipeline: scan, synthesize, render, write, sync env.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::annotation::{Annotation, DEFAULT_MARKER, Scanner};
use crate::envfile::{self, SyncReport};
use crate::error::WiregenResult;
use crate::fsutil;
use crate::render::{ImportFormatter, NoopFormatter, Rendered, Renderer};
use crate::source::Project;
use crate::synth::{ConfigDescriptor, CtorNamePolicy, Synthesizer};

/// File name written inside the destination directory by default.
pub const DEFAULT_TARGET_FILE: &str = "app_cfg_annotated.go";
/// Destination package directory used when none is configured.
pub const DEFAULT_DESTINATION: &str = "internal/generated";
/// Import path of the environment decoding package used by generated code.
pub const ENVCONFIG_IMPORT: &str = "github.com/kelseyhightower/envconfig";
/// Import path of the constructor registry used by generated code.
pub const TYPAPP_IMPORT: &str = "github.com/typical-go/typical-go/pkg/typapp";

/// Settings for [`AppCfgAnnotator`].
///
/// Relative paths are resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// Marker selecting annotated types.
    pub tag_name: String,
    /// Custom template text; `None` uses the built-in template.
    pub template: Option<String>,
    /// Directory of the generated package.
    pub destination: Utf8PathBuf,
    /// Generated file; `None` means `<destination>/app_cfg_annotated.go`.
    pub target: Option<Utf8PathBuf>,
    /// Env file to synchronise.
    pub env_file: Utf8PathBuf,
    /// Whether to synchronise the env file and export it.
    pub dotenv: bool,
    /// Handling of annotations without `ctor_name`.
    pub ctor_policy: CtorNamePolicy,
    /// Packages imported only for their side effects (`_ "path"`).
    pub side_effects: Vec<String>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            tag_name: DEFAULT_MARKER.to_owned(),
            template: None,
            destination: Utf8PathBuf::from(DEFAULT_DESTINATION),
            target: None,
            env_file: Utf8PathBuf::from(".env"),
            dotenv: true,
            ctor_policy: CtorNamePolicy::default(),
            side_effects: Vec::new(),
        }
    }
}

impl AnnotatorConfig {
    /// Generated file path relative to the project root.
    #[must_use]
    pub fn target_path(&self) -> Utf8PathBuf {
        self.target
            .clone()
            .unwrap_or_else(|| self.destination.join(DEFAULT_TARGET_FILE))
    }

    /// Package clause of the generated file: the destination's last
    /// component.
    #[must_use]
    pub fn package_name(&self) -> String {
        self.destination
            .file_name()
            .unwrap_or("generated")
            .to_owned()
    }
}

/// What a generation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Resolved generated file path.
    pub target: Utf8PathBuf,
    /// Whether the file was (re)written.
    pub written: bool,
    /// Whether a stale file was removed because nothing was annotated.
    pub removed: bool,
    /// Descriptors that drove the pass.
    pub descriptors: Vec<ConfigDescriptor>,
    /// Env-file synchronisation outcome, when enabled.
    pub env: Option<SyncReport>,
}

/// Generates constructor wiring for `@app-cfg` types.
#[derive(Debug)]
pub struct AppCfgAnnotator<F = NoopFormatter> {
    config: AnnotatorConfig,
    formatter: F,
    renderer: Renderer,
    scanner: Scanner,
    synthesizer: Synthesizer,
}

impl<F: ImportFormatter> AppCfgAnnotator<F> {
    /// Creates an annotator, compiling the configured template.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Template`] when the template is invalid.
    pub fn new(config: AnnotatorConfig, formatter: F) -> WiregenResult<Self> {
        let renderer = match &config.template {
            Some(text) => Renderer::with_template(text)?,
            None => Renderer::new()?,
        };
        Ok(Self {
            scanner: Scanner::new(config.tag_name.clone()),
            synthesizer: Synthesizer::new(config.ctor_policy),
            config,
            formatter,
            renderer,
        })
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotations carrying the configured marker, in project order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Parse`] for malformed tags.
    pub fn annotations(&self, project: &Project) -> WiregenResult<Vec<Annotation>> {
        self.scanner.scan_files(&project.files)
    }

    /// Descriptors for every annotated struct in `project`.
    ///
    /// # Errors
    ///
    /// Returns parse failures and [`crate::WiregenError::UnnamedConstructor`]
    /// under the rejecting policy.
    pub fn descriptors(&self, project: &Project) -> WiregenResult<Vec<ConfigDescriptor>> {
        self.describe(&self.annotations(project)?)
    }

    /// Types declared in the destination package are referenced unqualified.
    fn describe(&self, annotations: &[Annotation]) -> WiregenResult<Vec<ConfigDescriptor>> {
        let mut descriptors = self.synthesizer.synthesize(annotations)?;
        let structs = annotations.iter().filter(|annotation| annotation.is_struct());
        for (annotation, descriptor) in structs.zip(descriptors.iter_mut()) {
            if annotation.dir == self.config.destination {
                descriptor.spec_type.clone_from(&annotation.type_name);
            }
        }
        Ok(descriptors)
    }

    /// Runs a full generation pass over `project`.
    ///
    /// # Errors
    ///
    /// See [`AppCfgAnnotator::annotate_with`].
    pub fn annotate(&self, project: &Project) -> WiregenResult<GenerationReport> {
        self.annotate_with(project, &[])
    }

    /// Runs a full generation pass, also seeding `module_configs` into the
    /// env file.
    ///
    /// With no annotated structs the generated file is removed and the run
    /// stops there, leaving the env file alone. Otherwise the file is
    /// rendered, written atomically and handed to the import formatter;
    /// formatter failures are logged. The env file is synchronised last when
    /// enabled, annotated keys first.
    ///
    /// # Errors
    ///
    /// Returns parse, template and I/O failures.
    pub fn annotate_with(
        &self,
        project: &Project,
        module_configs: &[ConfigDescriptor],
    ) -> WiregenResult<GenerationReport> {
        let annotations = self.annotations(project)?;
        let descriptors = self.describe(&annotations)?;
        let target = resolve(&project.root, &self.config.target_path());

        let imports = self.imports(project, &annotations);
        let rendered = self.renderer.render(
            &self.config.package_name(),
            &imports,
            &self.side_effects(&imports),
            &descriptors,
        )?;
        let Rendered::Source(text) = rendered else {
            let removed = fsutil::remove_if_exists(&target)?;
            if removed {
                tracing::info!(path = %target, "removed generated file");
            }
            return Ok(GenerationReport {
                target,
                written: false,
                removed,
                descriptors,
                env: None,
            });
        };
        fsutil::write_atomic(&target, &text)?;
        tracing::info!(path = %target, configs = descriptors.len(), "generated @app-cfg wiring");
        if let Err(err) = self.formatter.format(&target) {
            tracing::warn!(path = %target, error = %err, "import formatting failed");
        }

        let env = if self.config.dotenv {
            let all: Vec<ConfigDescriptor> =
                descriptors.iter().chain(module_configs).cloned().collect();
            Some(self.sync_env(project, &all)?)
        } else {
            None
        };

        Ok(GenerationReport {
            target,
            written: true,
            removed: false,
            descriptors,
            env,
        })
    }

    /// Synchronises the configured env file with `descriptors`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Io`] when the env file cannot be
    /// written.
    pub fn sync_env(
        &self,
        project: &Project,
        descriptors: &[ConfigDescriptor],
    ) -> WiregenResult<SyncReport> {
        let path = resolve(&project.root, &self.config.env_file);
        envfile::synchronize(&path, descriptors)
    }

    /// Import paths for the generated file: the support packages plus every
    /// package declaring an annotated struct, sorted and de-duplicated.
    #[must_use]
    pub fn imports(&self, project: &Project, annotations: &[Annotation]) -> Vec<String> {
        let mut imports = BTreeSet::from([ENVCONFIG_IMPORT.to_owned(), TYPAPP_IMPORT.to_owned()]);
        for annotation in annotations.iter().filter(|a| a.is_struct()) {
            if annotation.dir == self.config.destination {
                continue;
            }
            match &project.module {
                Some(module) => {
                    imports.insert(module.import_path(&annotation.dir));
                }
                None => tracing::warn!(
                    declaration = %annotation.qualified_name(),
                    "no go.mod module path; cannot import declaring package"
                ),
            }
        }
        imports.into_iter().collect()
    }

    /// Configured side-effect packages not already imported, sorted and
    /// de-duplicated.
    fn side_effects(&self, imports: &[String]) -> Vec<String> {
        self.config
            .side_effects
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|path| !path.is_empty() && !imports.iter().any(|import| import.as_str() == *path))
            .map(str::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn resolve(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GoModule, SourceFile, parse_source};
    use rstest::rstest;

    fn project(files: Vec<SourceFile>) -> Project {
        Project {
            root: Utf8PathBuf::from("/nonexistent"),
            module: Some(GoModule {
                path: "example.com/shop".to_owned(),
            }),
            files,
        }
    }

    #[rstest]
    fn defaults_match_generated_layout() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.tag_name, "@app-cfg");
        assert_eq!(
            config.target_path(),
            Utf8PathBuf::from("internal/generated/app_cfg_annotated.go")
        );
        assert_eq!(config.package_name(), "generated");
    }

    #[rstest]
    fn explicit_target_overrides_destination() {
        let config = AnnotatorConfig {
            target: Some("cmd/shop/wiring.go".into()),
            ..AnnotatorConfig::default()
        };
        assert_eq!(config.target_path(), Utf8PathBuf::from("cmd/shop/wiring.go"));
    }

    #[rstest]
    fn imports_are_sorted_and_deduplicated() -> anyhow::Result<()> {
        let a = parse_source(
            "internal/config/a.go",
            "package config\n// @app-cfg\ntype A struct{}\n// @app-cfg\ntype B struct{}\n",
        )?;
        let b = parse_source("internal/app/b.go", "package app\n// @app-cfg\ntype C struct{}\n")?;
        let gen_pkg = parse_source(
            "internal/generated/g.go",
            "package generated\n// @app-cfg\ntype G struct{}\n",
        )?;
        let tree = project(vec![a, b, gen_pkg]);
        let annotator = AppCfgAnnotator::new(AnnotatorConfig::default(), NoopFormatter)?;
        let annotations = annotator.annotations(&tree)?;

        assert_eq!(
            annotator.imports(&tree, &annotations),
            vec![
                "example.com/shop/internal/app",
                "example.com/shop/internal/config",
                ENVCONFIG_IMPORT,
                TYPAPP_IMPORT,
            ]
        );
        Ok(())
    }

    #[rstest]
    fn destination_package_types_are_unqualified() -> anyhow::Result<()> {
        let config = parse_source("internal/config/a.go", "package config\n// @app-cfg\ntype A struct{}\n")?;
        let local = parse_source(
            "internal/generated/g.go",
            "package generated\n// @app-cfg\ntype G struct{}\n",
        )?;
        let annotator = AppCfgAnnotator::new(AnnotatorConfig::default(), NoopFormatter)?;
        let descriptors = annotator.descriptors(&project(vec![config, local]))?;

        let spec_types: Vec<&str> = descriptors.iter().map(|d| d.spec_type.as_str()).collect();
        assert_eq!(spec_types, vec!["config.A", "G"]);
        Ok(())
    }

    #[rstest]
    fn side_effects_skip_blank_and_existing_imports() -> anyhow::Result<()> {
        let config = AnnotatorConfig {
            side_effects: vec![
                "github.com/lib/pq".to_owned(),
                " ".to_owned(),
                ENVCONFIG_IMPORT.to_owned(),
                "github.com/lib/pq".to_owned(),
                "github.com/golang-migrate/migrate/v4/source/file".to_owned(),
            ],
            ..AnnotatorConfig::default()
        };
        let annotator = AppCfgAnnotator::new(config, NoopFormatter)?;
        assert_eq!(
            annotator.side_effects(&[ENVCONFIG_IMPORT.to_owned()]),
            vec![
                "github.com/golang-migrate/migrate/v4/source/file",
                "github.com/lib/pq",
            ]
        );
        Ok(())
    }

    #[rstest]
    fn invalid_custom_template_fails_construction() {
        let config = AnnotatorConfig {
            template: Some("{% if %}".to_owned()),
            ..AnnotatorConfig::default()
        };
        assert!(AppCfgAnnotator::new(config, NoopFormatter).is_err());
    }
}
