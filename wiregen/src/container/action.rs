//! Provide, invoke and tear down one container scope.

use super::Scope;
use crate::capability::Component;
use crate::error::{ComponentError, WiregenError, WiregenResult};

/// Runs destroyers when dropped unless [`Teardown::finish`] already did.
struct Teardown<'a> {
    components: &'a [Box<dyn Component>],
    scope: &'a Scope,
    done: bool,
}

impl Teardown<'_> {
    /// Calls every destroyer in reverse component order and returns the
    /// first failure. Later destroyers still run after a failure.
    fn finish(&mut self) -> Option<ComponentError> {
        self.done = true;
        let mut first = None;
        for destroyer in self
            .components
            .iter()
            .rev()
            .filter_map(|component| component.as_destroyer())
        {
            if let Err(err) = destroyer.destroy(self.scope) {
                tracing::warn!(error = %err, "destroyer failed");
                first.get_or_insert(err);
            }
        }
        first
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.finish();
        }
    }
}

/// Runs `action` inside a fresh scope built from `components`.
///
/// Every constructor offered by a provider is registered before the action
/// runs. Destroyers run in reverse component order once the action returns,
/// fails, or panics, and also when registration fails.
///
/// # Errors
///
/// Returns [`WiregenError::Wiring`] for registration or resolution
/// failures, the action's own error otherwise, and
/// [`WiregenError::Teardown`] with the first destroyer failure when the
/// action succeeded.
pub fn run_action<R, F>(components: &[Box<dyn Component>], action: F) -> WiregenResult<R>
where
    F: FnOnce(&Scope) -> Result<R, ComponentError>,
{
    let scope = Scope::new();
    let mut teardown = Teardown {
        components,
        scope: &scope,
        done: false,
    };

    for provider in components.iter().filter_map(|component| component.as_provider()) {
        for constructor in provider.provide() {
            scope.provide(constructor)?;
        }
    }
    tracing::debug!(constructors = scope.len(), "scope provided");

    let outcome = action(&scope);
    let destroy_error = teardown.finish();
    match (outcome, destroy_error) {
        (Err(err), _) => Err(WiregenError::from_action(err)),
        (Ok(_), Some(err)) => Err(WiregenError::Teardown(err)),
        (Ok(value), None) => Ok(value),
    }
}
