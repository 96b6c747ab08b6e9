//! Build-time wiring generator for Go projects.
//!
//! `wiregen` scans Go sources for types annotated with `@app-cfg`, renders
//! a file that registers one environment-backed constructor per type, and
//! keeps a `.env` file seeded with every variable those types read. It also
//! provides the module capability model and the per-invocation container the
//! build tool uses to run commands.
//!
//! The pipeline, leaf first:
//!
//! - [`source`] parses Go files into type declarations.
//! - [`annotation`] selects declarations carrying a marker.
//! - [`synth`] turns annotations into [`ConfigDescriptor`]s.
//! - [`render`] renders descriptors through a template.
//! - [`envfile`] reconciles the env file and the process environment.
//! - [`AppCfgAnnotator`] ties the steps together.
//!
//! Runtime composition lives in [`capability`], [`container`],
//! [`Context`] and [`BuildTool`].

pub mod annotation;
mod annotator;
mod buildtool;
pub mod capability;
pub mod container;
mod context;
pub mod envfile;
mod error;
mod fsutil;
pub mod render;
pub mod source;
pub mod synth;

pub use annotator::{
    AnnotatorConfig, AppCfgAnnotator, DEFAULT_DESTINATION, DEFAULT_TARGET_FILE, ENVCONFIG_IMPORT,
    GenerationReport, TYPAPP_IMPORT,
};
pub use buildtool::BuildTool;
pub use context::Context;
pub use error::{ComponentError, WiregenError, WiregenResult};
pub use synth::{ConfigDescriptor, CtorNamePolicy, FieldDescriptor};
