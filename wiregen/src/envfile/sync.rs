//! Reconciles an env file with the configuration surface.

use camino::Utf8Path;

use super::{EnvMap, is_valid_key};
use crate::error::WiregenResult;
use crate::synth::ConfigDescriptor;

/// Outcome of [`synchronize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Keys appended to the file, in discovery order.
    pub added: Vec<String>,
    /// Keys exported into the process environment because it lacked them.
    pub exported: Vec<String>,
    /// Whether the file was rewritten.
    pub persisted: bool,
}

/// Adds missing keys to the env file at `path` and loads the result into the
/// process environment.
///
/// Existing entries keep their values and order; new keys take the field
/// default and are appended in descriptor order. The file is only rewritten
/// when something was added. Variables already set in the process
/// environment are left alone, so the live environment always wins over the
/// stored value.
///
/// # Errors
///
/// Returns [`crate::WiregenError::Io`] when the file cannot be written.
pub fn synchronize(path: &Utf8Path, configs: &[ConfigDescriptor]) -> WiregenResult<SyncReport> {
    let mut map = EnvMap::load(path);
    let mut added = Vec::new();
    for field in configs.iter().flat_map(|config| config.fields.iter()) {
        if !is_valid_key(&field.key) {
            tracing::warn!(key = %field.key, "skipping invalid environment key");
            continue;
        }
        if map.insert_missing(&field.key, &field.default) {
            added.push(field.key.clone());
        }
    }

    let persisted = !added.is_empty();
    if persisted {
        map.save(path)?;
        tracing::info!(path = %path, added = %added.join(" "), "updated env file");
    }

    Ok(SyncReport {
        exported: export(&map),
        added,
        persisted,
    })
}

/// Sets every entry of `map` that the process environment does not already
/// define, returning the keys that were set.
pub fn export(map: &EnvMap) -> Vec<String> {
    let mut exported = Vec::new();
    for (key, value) in map.iter() {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if !is_valid_key(key) || value.contains('\0') {
            tracing::warn!(key, "cannot export environment entry");
            continue;
        }
        // SAFETY: generation runs single-threaded before any command spawns
        // threads that read the environment.
        unsafe { std::env::set_var(key, value) };
        exported.push(key.to_owned());
    }
    exported
}
