//! Dispatches named commands over a [`Context`].

use crate::capability::BuildCommand;
use crate::context::Context;
use crate::error::{WiregenError, WiregenResult};

/// Runs build commands contributed by the context's modules.
#[derive(Debug)]
pub struct BuildTool {
    context: Context,
}

impl BuildTool {
    /// Wraps `context`.
    #[must_use]
    pub const fn new(context: Context) -> Self {
        Self { context }
    }

    /// The wrapped context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Names and usage lines of every available command.
    #[must_use]
    pub fn usage(&self) -> Vec<(String, String)> {
        self.context
            .commands()
            .into_iter()
            .map(|BuildCommand { name, usage, .. }| (name, usage))
            .collect()
    }

    /// Runs the `Before` hook, then the command called `name` inside a
    /// container scope provided by every module. Destroyers run once the
    /// command finishes.
    ///
    /// # Errors
    ///
    /// Returns the `Before` hook failure, [`WiregenError::UnknownCommand`]
    /// when no module offers `name`, a wiring failure, the command's own
    /// error, or the first teardown failure.
    pub fn run(&self, name: &str) -> WiregenResult<()> {
        self.context.before()?;
        let command = self
            .context
            .commands()
            .into_iter()
            .find(|command| command.name == name)
            .ok_or_else(|| WiregenError::UnknownCommand {
                name: name.to_owned(),
            })?;
        tracing::debug!(command = name, project = %self.context.name, "running command");
        self.context
            .run_action(|scope| (command.action)(&self.context, scope))
    }
}
