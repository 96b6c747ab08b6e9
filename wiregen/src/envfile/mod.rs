//! Persisted `KEY=VALUE` environment files.
//!
//! [`EnvMap`] keeps keys in file order. Parsing follows `dotenvy` and is
//! lenient: malformed lines are dropped from the map with a warning rather
//! than failing the load. The original text is kept verbatim, so saving only
//! ever appends new `KEY=VALUE` lines after the existing content.

mod sync;

use camino::Utf8Path;
use indexmap::IndexMap;

use crate::error::WiregenResult;
use crate::fsutil;

pub use sync::{SyncReport, export, synchronize};

/// Ordered environment variable map backing an env file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    source: String,
    entries: IndexMap<String, String>,
    appended: Vec<String>,
}

impl EnvMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses env-file text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();
        for item in dotenvy::from_read_iter(text.as_bytes()) {
            match item {
                Ok((key, value)) => {
                    entries.insert(key, value);
                }
                Err(dotenvy::Error::Io(err)) => {
                    tracing::warn!(error = %err, "stopped reading env text");
                    break;
                }
                Err(err) => tracing::warn!(error = %err, "skipping malformed env line"),
            }
        }
        Self {
            source: text.to_owned(),
            entries,
            appended: Vec::new(),
        }
    }

    /// Loads `path`, treating a missing or unreadable file as empty.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Self {
        fsutil::read_optional(path).map_or_else(Self::new, |text| Self::parse(&text))
    }

    /// Atomically replaces `path` with the rendered map.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> WiregenResult<()> {
        fsutil::write_atomic(path, &self.render())
    }

    /// Renders the map as env-file text: the parsed text unchanged, then
    /// one `KEY=VALUE` line per entry added since.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.source.clone();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.extend(self.appended.iter().filter_map(|key| {
            let value = self.entries.get(key)?;
            Some(format!("{key}={}\n", quote(value)))
        }));
        out
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts `key` if absent, returning whether it was added.
    pub fn insert_missing(&mut self, key: &str, value: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        self.appended.push(key.to_owned());
        true
    }

    /// Iterates entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            let key = key.into();
            if map.entries.insert(key.clone(), value.into()).is_none() {
                map.appended.push(key);
            }
        }
        map
    }
}

/// Whether `key` can be stored in the process environment.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0']) && !key.chars().any(char::is_whitespace)
}

/// Double-quotes values `dotenvy` would otherwise split or expand.
fn quote(value: &str) -> String {
    let needs_quotes = value.chars().any(char::is_whitespace)
        || value.contains(['#', '"', '\'', '\\', '$']);
    if !needs_quotes {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
