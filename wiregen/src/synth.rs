//! Turns annotations into generation-ready configuration descriptors.

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, Field};
use crate::error::{WiregenError, WiregenResult};

/// Annotation parameter overriding the environment prefix.
pub const PREFIX_PARAM: &str = "prefix";
/// Annotation parameter naming the generated constructor.
pub const CTOR_NAME_PARAM: &str = "ctor_name";
/// Field tag carrying the default value.
pub const DEFAULT_TAG: &str = "default";
/// Field tag overriding the field's environment key.
pub const ALIAS_TAG: &str = "envconfig";

/// One environment variable contributed by a config field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Full variable name, `PREFIX_FIELD`.
    pub key: String,
    /// Default value, empty when the field declares none.
    pub default: String,
}

/// Generation-ready form of an `@app-cfg` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDescriptor {
    /// Constructor name; may be empty under [`CtorNamePolicy::Verbatim`].
    pub ctor_name: String,
    /// Environment namespace for the type's fields.
    pub prefix: String,
    /// Package-qualified type, `pkg.Type`.
    pub spec_type: String,
    /// Field variables in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// What to do when an annotation omits `ctor_name`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtorNamePolicy {
    /// Keep the empty name and register an unnamed constructor.
    #[default]
    Verbatim,
    /// Use `New<TypeName>`.
    #[serde(rename = "derive")]
    DeriveFromType,
    /// Fail with [`WiregenError::UnnamedConstructor`].
    Reject,
}

/// Maps annotations to [`ConfigDescriptor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    policy: CtorNamePolicy,
}

impl Synthesizer {
    /// Creates a synthesizer applying `policy` to missing constructor names.
    #[must_use]
    pub const fn new(policy: CtorNamePolicy) -> Self {
        Self { policy }
    }

    /// Describes every struct annotation, preserving input order.
    ///
    /// Non-struct declarations cannot be populated from the environment and
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WiregenError::UnnamedConstructor`] when the policy is
    /// [`CtorNamePolicy::Reject`] and an annotation lacks `ctor_name`.
    pub fn synthesize(&self, annotations: &[Annotation]) -> WiregenResult<Vec<ConfigDescriptor>> {
        annotations
            .iter()
            .filter(|annotation| {
                let keep = annotation.is_struct();
                if !keep {
                    tracing::debug!(
                        declaration = %annotation.qualified_name(),
                        "skipping non-struct annotation"
                    );
                }
                keep
            })
            .map(|annotation| self.describe(annotation))
            .collect()
    }

    /// Describes a single annotation.
    ///
    /// # Errors
    ///
    /// See [`Synthesizer::synthesize`].
    pub fn describe(&self, annotation: &Annotation) -> WiregenResult<ConfigDescriptor> {
        let spec_type = annotation.qualified_name();
        let prefix = annotation
            .params
            .non_empty(PREFIX_PARAM)
            .map_or_else(|| annotation.type_name.to_uppercase(), str::to_owned);
        let ctor_name = match (annotation.params.non_empty(CTOR_NAME_PARAM), self.policy) {
            (Some(name), _) => name.to_owned(),
            (None, CtorNamePolicy::Verbatim) => String::new(),
            (None, CtorNamePolicy::DeriveFromType) => format!("New{}", annotation.type_name),
            (None, CtorNamePolicy::Reject) => {
                return Err(WiregenError::UnnamedConstructor { spec_type });
            }
        };
        let fields = annotation
            .fields
            .iter()
            .map(|field| describe_field(&prefix, field))
            .collect();
        Ok(ConfigDescriptor {
            ctor_name,
            prefix,
            spec_type,
            fields,
        })
    }
}

fn describe_field(prefix: &str, field: &Field) -> FieldDescriptor {
    let name = field
        .tag_params
        .non_empty(ALIAS_TAG)
        .map_or_else(|| field.name.to_uppercase(), str::to_owned);
    FieldDescriptor {
        key: format!("{prefix}_{name}"),
        default: field
            .tag_params
            .get(DEFAULT_TAG)
            .unwrap_or_default()
            .to_owned(),
    }
}
