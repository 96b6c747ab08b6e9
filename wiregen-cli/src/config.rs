//! Layered settings for the build tool.
//!
//! Precedence, lowest first: built-in defaults, `wiregen.toml` in the
//! project root, `WIREGEN_*` environment variables, command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wiregen::annotation::DEFAULT_MARKER;
use wiregen::{AnnotatorConfig, CtorNamePolicy, DEFAULT_DESTINATION};

use crate::cli::{Command, GenerateArgs};
use crate::error::CliError;

/// Settings file looked up in the project root.
pub const CONFIG_FILE: &str = "wiregen.toml";
/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "WIREGEN_";

/// Resolved generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Marker selecting annotated types.
    pub tag: String,
    /// Template file replacing the built-in one.
    pub template: Option<Utf8PathBuf>,
    /// Directory of the generated package.
    pub destination: Utf8PathBuf,
    /// Generated file override.
    pub target: Option<Utf8PathBuf>,
    /// Env file to synchronise.
    pub env_file: Utf8PathBuf,
    /// Whether `generate` synchronises the env file.
    pub dotenv: bool,
    /// Whether `goimports` runs on the generated file.
    pub format: bool,
    /// Handling of annotations without `ctor_name`.
    pub ctor_policy: CtorNamePolicy,
    /// Packages the generated file imports for side effects only.
    pub side_effects: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tag: DEFAULT_MARKER.to_owned(),
            template: None,
            destination: Utf8PathBuf::from(DEFAULT_DESTINATION),
            target: None,
            env_file: Utf8PathBuf::from(".env"),
            dotenv: true,
            format: true,
            ctor_policy: CtorNamePolicy::default(),
            side_effects: Vec::new(),
        }
    }
}

/// Values given on the command line; unset fields leave lower layers alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env_file: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dotenv: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctor_policy: Option<CtorNamePolicy>,
}

impl From<&Command> for Overrides {
    fn from(command: &Command) -> Self {
        match command {
            Command::Generate(args) => Self::from(args),
            Command::Scan => Self::default(),
            Command::Env(args) => Self {
                env_file: args.env_file.clone(),
                ..Self::default()
            },
        }
    }
}

impl From<&GenerateArgs> for Overrides {
    fn from(args: &GenerateArgs) -> Self {
        Self {
            tag: args.tag.clone(),
            template: args.template.clone(),
            destination: args.destination.clone(),
            target: args.target.clone(),
            env_file: args.env.env_file.clone(),
            dotenv: args.should_skip_dotenv.then_some(false),
            format: args.should_skip_format.then_some(false),
            ctor_policy: args.ctor_policy.map(CtorNamePolicy::from),
        }
    }
}

impl Settings {
    /// Merges every layer for the project at `root`.
    ///
    /// A missing settings file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] when a layer holds malformed values.
    pub fn load(root: &Utf8Path, overrides: &Overrides) -> Result<Self, CliError> {
        let path = root.join(CONFIG_FILE);
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.is_file() {
            figment = figment.merge(Toml::file_exact(path));
        }
        let settings = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()?;
        Ok(settings)
    }

    /// Builds the annotator configuration, reading the template file when
    /// one is set.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the template cannot be read.
    pub fn annotator_config(&self, root: &Utf8Path) -> Result<AnnotatorConfig, CliError> {
        let template = self
            .template
            .as_deref()
            .map(|path| read_text(root, path))
            .transpose()?;
        Ok(AnnotatorConfig {
            tag_name: self.tag.clone(),
            template,
            destination: self.destination.clone(),
            target: self.target.clone(),
            env_file: self.env_file.clone(),
            dotenv: self.dotenv,
            ctor_policy: self.ctor_policy,
            side_effects: self.side_effects.clone(),
        })
    }
}

fn read_text(root: &Utf8Path, path: &Utf8Path) -> Result<String, CliError> {
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    let io_err = |source: std::io::Error| CliError::Io {
        path: full.clone(),
        source,
    };
    let parent = match full.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file = full
        .file_name()
        .ok_or_else(|| io_err(std::io::ErrorKind::InvalidInput.into()))?;
    Dir::open_ambient_dir(parent, ambient_authority())
        .and_then(|dir| dir.read_to_string(file))
        .map_err(io_err)
}
