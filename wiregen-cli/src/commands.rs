//! The `@app-cfg` module: contributes `generate`, `scan` and `env`.

use std::rc::Rc;

use wiregen::capability::{BuildCommand, BuildCommander, Component};
use wiregen::render::ImportFormatter;
use wiregen::source::load_project;
use wiregen::{AppCfgAnnotator, ComponentError, Context};

/// Annotator driven by the build tool.
pub type Annotator = AppCfgAnnotator<Box<dyn ImportFormatter>>;

/// Build-tool module wrapping an [`Annotator`].
pub struct AppCfgModule {
    annotator: Rc<Annotator>,
}

impl AppCfgModule {
    /// Wraps `annotator`.
    #[must_use]
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator: Rc::new(annotator),
        }
    }
}

impl BuildCommander for AppCfgModule {
    fn commands(&self) -> Vec<BuildCommand> {
        let generating = Rc::clone(&self.annotator);
        let scanning = Rc::clone(&self.annotator);
        let syncing = Rc::clone(&self.annotator);
        vec![
            BuildCommand::new(
                "generate",
                "generate @app-cfg wiring and seed the env file",
                move |ctx, _scope| generate(&generating, ctx),
            ),
            BuildCommand::new("scan", "list @app-cfg declarations", move |ctx, _scope| {
                scan(&scanning, ctx)
            }),
            BuildCommand::new("env", "synchronise the env file", move |ctx, _scope| {
                sync_env(&syncing, ctx)
            }),
        ]
    }
}

impl Component for AppCfgModule {
    fn as_build_commander(&self) -> Option<&dyn BuildCommander> {
        Some(self)
    }
}

fn generate(annotator: &Annotator, ctx: &Context) -> Result<(), ComponentError> {
    let project = load_project(&ctx.root)?;
    let report = annotator.annotate_with(&project, &ctx.config_descriptors())?;
    if let Some(sync) = &report.env {
        tracing::info!(
            added = sync.added.len(),
            exported = sync.exported.len(),
            "env file synchronised"
        );
    }
    if !report.written && !report.removed {
        tracing::info!(project = %ctx.name, "no @app-cfg declarations");
    }
    Ok(())
}

fn scan(annotator: &Annotator, ctx: &Context) -> Result<(), ComponentError> {
    let project = load_project(&ctx.root)?;
    let annotations = annotator.annotations(&project)?;
    for annotation in &annotations {
        tracing::info!(
            tag = %annotation.tag_name,
            package = %annotation.package,
            type_name = %annotation.type_name,
            fields = annotation.fields.len(),
            "found declaration"
        );
    }
    tracing::info!(count = annotations.len(), "scan complete");
    Ok(())
}

fn sync_env(annotator: &Annotator, ctx: &Context) -> Result<(), ComponentError> {
    let project = load_project(&ctx.root)?;
    let mut descriptors = annotator.descriptors(&project)?;
    descriptors.extend(ctx.config_descriptors());
    let report = annotator.sync_env(&project, &descriptors)?;
    tracing::info!(
        added = report.added.len(),
        persisted = report.persisted,
        "env file synchronised"
    );
    Ok(())
}
