//! Constructors that populate a value from prefixed environment variables.

use figment::Figment;
use figment::providers::Serialized;
use figment::value::{Dict, Value};
use serde::de::DeserializeOwned;

use super::Constructor;

/// Builds a constructor that deserialises `T` from variables named
/// `<PREFIX>_<FIELD>`.
///
/// Keys are matched case-insensitively against `T`'s field names after the
/// prefix is stripped, so `DB_HOST` fills `host` when `prefix` is `"DB"`.
/// Fields missing from the environment fall back to `T`'s serde defaults.
/// Values stay strings unless the field asks for a number or a boolean, so
/// `DB_PASSWORD=12345` still fills a `String`.
///
/// ```
/// use serde::Deserialize;
/// use wiregen::container::{Scope, env_constructor};
///
/// #[derive(Deserialize)]
/// struct Db {
///     #[serde(default = "default_host")]
///     host: String,
/// }
///
/// fn default_host() -> String {
///     "localhost".into()
/// }
///
/// let scope = Scope::new();
/// scope.provide(env_constructor::<Db>("NewDb", "WIREGEN_DOC_DB"))?;
/// let db = scope.resolve::<Db>()?;
/// assert_eq!(db.host, "localhost");
/// # Ok::<(), wiregen::container::WiringError>(())
/// ```
pub fn env_constructor<T>(name: impl Into<String>, prefix: &str) -> Constructor
where
    T: DeserializeOwned + 'static,
{
    let namespace = format!("{}_", prefix.to_uppercase());
    Constructor::new(name, move |_| {
        Figment::from(Serialized::defaults(prefixed_vars(&namespace)))
            .extract_lossy::<T>()
            .map_err(Into::into)
    })
}

fn prefixed_vars(namespace: &str) -> Dict {
    std::env::vars()
        .filter_map(|(key, value)| {
            let head = key.get(..namespace.len())?;
            let field = key.get(namespace.len()..)?;
            (head.eq_ignore_ascii_case(namespace) && !field.is_empty())
                .then(|| (field.to_lowercase(), Value::from(value)))
        })
        .collect()
}
