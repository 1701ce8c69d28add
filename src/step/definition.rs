//! Pattern step definitions.

use std::{fmt, sync::Arc};

use regex::Regex;

use super::{StepArgument, StepFailure, StepResult};
use crate::{location::RegistrationSite, panic::catch_body_panic, value::Value, world::World};

/// Callable body of a step definition.
pub type StepFn = dyn Fn(&mut World, &[Value]) -> StepResult + Send + Sync;

/// What runs when a definition is invoked.
#[derive(Clone)]
pub enum StepBody {
    /// A function over the world and the step's arguments.
    Closure(Arc<StepFn>),
    /// The name of a method installed on the world by an extension module,
    /// resolved when the step runs.
    Named(String),
}

impl StepBody {
    /// Wrap a closure.
    pub fn closure<F>(body: F) -> Self
    where
        F: Fn(&mut World, &[Value]) -> StepResult + Send + Sync + 'static,
    {
        StepBody::Closure(Arc::new(body))
    }

    /// Refer to a world method by name.
    pub fn named(name: impl Into<String>) -> Self { StepBody::Named(name.into()) }
}

impl fmt::Debug for StepBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepBody::Closure(_) => f.write_str("Closure(..)"),
            StepBody::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// Per-definition options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOptions {
    /// Text shown instead of the pattern source when the definition is listed.
    pub display: Option<String>,
    /// Number of arguments the body reads, counting a trailing table or doc
    /// string. Unchecked when `None`.
    pub arity: Option<usize>,
}

impl StepOptions {
    /// Set the display text.
    #[must_use]
    pub fn display(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }

    /// Declare how many arguments the body reads.
    #[must_use]
    pub fn arity(mut self, arguments: usize) -> Self {
        self.arity = Some(arguments);
        self
    }
}

/// An immutable pattern step definition.
#[derive(Debug)]
pub struct StepDefinition {
    id: usize,
    regex: Regex,
    body: StepBody,
    options: StepOptions,
    site: RegistrationSite,
}

impl StepDefinition {
    pub(crate) fn new(
        id: usize,
        regex: Regex,
        body: StepBody,
        options: StepOptions,
        site: RegistrationSite,
    ) -> Self {
        Self {
            id,
            regex,
            body,
            options,
            site,
        }
    }

    /// Registration index, unique within a registry.
    #[must_use]
    pub fn id(&self) -> usize { self.id }

    /// Source of the pattern.
    #[must_use]
    pub fn pattern(&self) -> &str { self.regex.as_str() }

    /// Compiled pattern.
    #[must_use]
    pub fn regex(&self) -> &Regex { &self.regex }

    /// The body run on invocation.
    #[must_use]
    pub fn body(&self) -> &StepBody { &self.body }

    /// Options supplied at registration.
    #[must_use]
    pub fn options(&self) -> &StepOptions { &self.options }

    /// Where the definition was registered.
    #[must_use]
    pub fn site(&self) -> RegistrationSite { self.site }

    /// Text used when listing the definition.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.options.display.as_deref().unwrap_or(self.pattern())
    }

    /// Number of capture groups in the pattern.
    #[must_use]
    pub fn capture_count(&self) -> usize { self.regex.captures_len() - 1 }

    /// `site:in `pattern'`, as shown in failure backtraces.
    #[must_use]
    pub fn backtrace_line(&self) -> String { self.site.backtrace_line(self.display_text()) }

    /// Extract arguments if the pattern matches `step_name`.
    ///
    /// Returns `None` when the pattern does not match. Each capture group
    /// yields one argument in group order; groups that did not participate
    /// yield an argument without value or offset.
    #[must_use]
    pub fn arguments_from(&self, step_name: &str) -> Option<Vec<StepArgument>> {
        let captures = self.regex.captures(step_name)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| match group {
                    Some(m) => StepArgument::new(Some(m.as_str().to_owned()), Some(m.start())),
                    None => StepArgument::new(None, None),
                })
                .collect(),
        )
    }

    /// Run the body against `world` with already-transformed arguments.
    pub(crate) fn call(&self, world: &mut World, args: &[Value]) -> StepResult {
        let outcome = match &self.body {
            StepBody::Closure(body) => catch_body_panic(|| body(world, args)),
            StepBody::Named(name) => catch_body_panic(|| world.call_method(name, args)),
        };
        outcome.unwrap_or_else(|panic| Err(StepFailure::Panicked(panic)))
    }
}

impl fmt::Display for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  # {}", self.display_text(), self.site)
    }
}
