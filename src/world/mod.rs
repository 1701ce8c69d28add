//! The per-scenario execution context.
//!
//! A [`World`] is created when a scenario begins and dropped when it ends.
//! Step bodies receive it mutably; it carries the scenario's state, the
//! methods contributed by [`WorldModule`]s, the assertion capability, and a
//! [`Facade`] through which steps reach the orchestrator and the user
//! interface.

mod assertions;
mod capabilities;
mod error;
mod manager;
mod module;

use std::{
    any::type_name,
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};

pub use assertions::{AssertionStyle, Assertions};
pub use capabilities::CapabilityStore;
pub use error::WorldError;
use manager::ScenarioLease;
pub use manager::{WorldFactoryFn, WorldManager};
pub use module::{WorldExtender, WorldModule};

use crate::{
    collaborators::Attachment,
    facade::Facade,
    step::{StepFailure, StepResult},
    table::{DataTable, DocString, MultilineArg, TableError},
    value::Value,
};

/// A method contributed to the world by a module, callable by name.
pub type WorldMethod = dyn Fn(&mut World, &[Value]) -> StepResult + Send + Sync;

/// Lifecycle phase of a live world.
///
/// A scenario with no world is idle; a world moves through these phases in
/// order before its first step runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldPhase {
    /// No world exists.
    Idle,
    /// Produced by the factory or synthesised as an empty default.
    Created,
    /// Assertion capability and modules installed.
    Extended,
    /// Orchestrator and natural language attached.
    Bound,
}

impl fmt::Display for WorldPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorldPhase::Idle => "idle",
            WorldPhase::Created => "created",
            WorldPhase::Extended => "extended",
            WorldPhase::Bound => "bound",
        })
    }
}

/// Name under which the assertion capability is listed.
pub const ASSERTIONS_CAPABILITY: &str = "assertions";

/// Scenario-scoped execution context.
pub struct World {
    capabilities: CapabilityStore,
    methods: HashMap<String, Arc<WorldMethod>>,
    installed: Vec<String>,
    assertions: Assertions,
    facade: Option<Facade>,
    natural_language: Option<String>,
    phase: WorldPhase,
    lease: Option<ScenarioLease>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            capabilities: CapabilityStore::default(),
            methods: HashMap::new(),
            installed: Vec::new(),
            assertions: Assertions::default(),
            facade: None,
            natural_language: None,
            phase: WorldPhase::Created,
            lease: None,
        }
    }
}

impl World {
    /// Create a world holding `state`.
    #[must_use]
    pub fn from_state<T: Send + 'static>(state: T) -> Self { Self::default().with(state) }

    /// Add `state`, replacing any value of the same type.
    #[must_use]
    pub fn with<T: Send + 'static>(mut self, state: T) -> Self {
        self.capabilities.insert(state);
        self
    }

    /// Borrow state of type `T`, if present.
    #[must_use]
    pub fn get<T: Send + 'static>(&self) -> Option<&T> { self.capabilities.get::<T>() }

    /// Mutably borrow state of type `T`, if present.
    pub fn get_mut<T: Send + 'static>(&mut self) -> Option<&mut T> {
        self.capabilities.get_mut::<T>()
    }

    /// Borrow state of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingState`] if the world holds no `T`.
    pub fn state<T: Send + 'static>(&self) -> Result<&T, WorldError> {
        self.get::<T>()
            .ok_or(WorldError::MissingState(type_name::<T>()))
    }

    /// Mutably borrow state of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingState`] if the world holds no `T`.
    pub fn state_mut<T: Send + 'static>(&mut self) -> Result<&mut T, WorldError> {
        self.get_mut::<T>()
            .ok_or(WorldError::MissingState(type_name::<T>()))
    }

    /// Store `state`, replacing any value of the same type.
    pub fn insert<T: Send + 'static>(&mut self, state: T) { self.capabilities.insert(state); }

    /// The type-keyed state store.
    #[must_use]
    pub fn store(&self) -> &CapabilityStore { &self.capabilities }

    /// Names of installed capabilities, in installation order.
    #[must_use]
    pub fn capabilities(&self) -> &[String] { &self.installed }

    /// Whether a method named `name` is available.
    #[must_use]
    pub fn responds_to(&self, name: &str) -> bool { self.methods.contains_key(name) }

    /// Call a module-provided method.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::UnknownMethod`] if no method is named `name`,
    /// otherwise whatever the method reports.
    pub fn call_method(&mut self, name: &str, args: &[Value]) -> StepResult {
        let method = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| StepFailure::UnknownMethod(name.to_owned()))?;
        method(self, args)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> WorldPhase { self.phase }

    /// Natural language of the running scenario.
    #[must_use]
    pub fn natural_language(&self) -> Option<&str> { self.natural_language.as_deref() }

    /// The bound facade, if any.
    #[must_use]
    pub fn facade(&self) -> Option<&Facade> { self.facade.as_ref() }

    /// The assertion capability.
    #[must_use]
    pub fn assertions(&self) -> &Assertions { &self.assertions }

    /// Assert `condition`, failing with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::Assertion`] in strict style when `condition`
    /// is false.
    pub fn assert(&mut self, condition: bool, message: impl Into<String>) -> StepResult {
        self.assertions.check(condition, message)
    }

    /// Assert that `left == right`.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::Assertion`] in strict style when the values
    /// differ.
    pub fn assert_eq<T: PartialEq + Debug + ?Sized>(&mut self, left: &T, right: &T) -> StepResult {
        self.assertions.check_eq(left, right)
    }

    /// Mark the current step pending.
    ///
    /// # Errors
    ///
    /// Always returns [`StepFailure::Pending`].
    pub fn pending(&self, message: Option<&str>) -> StepResult {
        Err(StepFailure::Pending(message.map(str::to_owned)))
    }

    /// Run another step by name.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotBound`] outside a scenario, otherwise whatever
    /// the orchestrator reports.
    pub fn step(&mut self, name: &str) -> StepResult { self.step_with(name, None) }

    /// Run another step with a multiline argument.
    ///
    /// # Errors
    ///
    /// See [`World::step`].
    pub fn step_with(&mut self, name: &str, multiline_arg: Option<MultilineArg>) -> StepResult {
        let facade = self.bound_facade()?;
        facade.invoke(self, name, multiline_arg)
    }

    /// Run several steps given as text, one per line.
    ///
    /// # Errors
    ///
    /// See [`World::step`].
    pub fn steps(&mut self, steps_text: &str) -> StepResult {
        let facade = self.bound_facade()?;
        let language = self.natural_language.clone();
        facade.invoke_steps(self, steps_text, language.as_deref())
    }

    /// Parse a pipe-delimited table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the rows are malformed.
    pub fn table(&self, text: &str) -> Result<DataTable, TableError> {
        Facade::table(text, None, 0)
    }

    /// Build a doc string.
    #[must_use]
    pub fn doc_string(&self, content: &str, content_type: &str) -> DocString {
        Facade::doc_string(content, content_type)
    }

    /// Attach a file or bytes to the report.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotBound`] outside a scenario.
    pub fn embed(
        &self,
        attachment: &Attachment,
        mime_type: &str,
        label: Option<&str>,
    ) -> Result<(), WorldError> {
        self.bound_facade()?.embed(attachment, mime_type, label);
        Ok(())
    }

    /// Ask the user a question and wait for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotBound`] outside a scenario.
    pub fn ask(&self, prompt: &str) -> Result<String, WorldError> {
        Ok(self.bound_facade()?.ask(prompt))
    }

    /// Print text to the report.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotBound`] outside a scenario.
    pub fn puts(&self, text: &str) -> Result<(), WorldError> {
        self.bound_facade()?.puts(text);
        Ok(())
    }

    fn bound_facade(&self) -> Result<Facade, WorldError> {
        self.facade.clone().ok_or(WorldError::NotBound)
    }

    pub(crate) fn extend_with(&mut self, assertions: Assertions, modules: &[Arc<dyn WorldModule>]) {
        self.assertions = assertions;
        self.installed.push(ASSERTIONS_CAPABILITY.to_owned());
        for module in modules {
            module.install(&mut WorldExtender::new(self));
            self.installed.push(module.name().to_owned());
        }
        self.phase = WorldPhase::Extended;
    }

    pub(crate) fn bind(&mut self, facade: Facade, natural_language: &str) {
        self.facade = Some(facade);
        self.natural_language = Some(natural_language.to_owned());
        self.phase = WorldPhase::Bound;
    }

    pub(crate) fn take_assertion_failures(&mut self) -> Vec<String> {
        self.assertions.take_failures()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("phase", &self.phase)
            .field("capabilities", &self.installed)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("natural_language", &self.natural_language)
            .finish_non_exhaustive()
    }
}
