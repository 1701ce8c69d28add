//! The step language: every registry plus the load and execution APIs.
//!
//! A run has two phases. During *load*, each [`StepPlugin`] receives a
//! [`Registrar`] and registers its steps, sequences, transforms, hooks, and
//! world setup; this needs `&mut StepLanguage`. During *execution* the
//! language is only read, so a host may share it behind an `Arc` while worlds
//! are created and steps run.

use std::{any::type_name, sync::Arc};

use tracing::{info, warn};

use crate::{
    collaborators::{Orchestrator, ScenarioNode},
    config::EngineConfig,
    error::Result,
    facade::Facade,
    hooks::{Hook, HookPhase, HookScheduler},
    location::RegistrationSite,
    sequence::{Sequence, SequenceRegistry},
    snippet,
    step::{
        BoxError,
        MatchError,
        StepArgument,
        StepBody,
        StepDefinition,
        StepMatch,
        StepOptions,
        StepRegistry,
        StepResult,
        resolve,
    },
    table::{MultilineArg, MultilineKind},
    transform::{Transform, TransformEngine, TransformError},
    value::Value,
    world::{World, WorldError, WorldManager, WorldModule},
};

/// A unit of step code registered during the load phase.
pub trait StepPlugin {
    /// Name used in logs and load reports.
    fn name(&self) -> &str { type_name::<Self>() }

    /// Register everything this plugin provides.
    ///
    /// # Errors
    ///
    /// Returns the first registration error; the load stops there.
    fn register_steps(&self, registrar: &mut Registrar<'_>) -> Result<()>;
}

impl<F> StepPlugin for F
where
    F: Fn(&mut Registrar<'_>) -> Result<()>,
{
    fn register_steps(&self, registrar: &mut Registrar<'_>) -> Result<()> { self(registrar) }
}

/// What a load phase registered.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    /// Names of the plugins loaded.
    pub plugins: Vec<String>,
    /// Pattern step definitions.
    pub step_definitions: Vec<Arc<StepDefinition>>,
    /// Sequences.
    pub sequences: Vec<Arc<Sequence>>,
    /// Argument transforms.
    pub transforms: Vec<Arc<Transform>>,
    /// Hooks of every phase.
    pub hooks: Vec<Arc<Hook>>,
    /// Site of the world factory, if one was registered.
    pub world_factory: Option<RegistrationSite>,
    /// Names of world modules.
    pub world_modules: Vec<String>,
}

impl LoadReport {
    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.step_definitions.len()
            + self.sequences.len()
            + self.transforms.len()
            + self.hooks.len()
            + usize::from(self.world_factory.is_some())
            + self.world_modules.len()
    }

    /// Whether nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Append `other` to this report.
    pub fn merge(&mut self, other: LoadReport) {
        self.plugins.extend(other.plugins);
        self.step_definitions.extend(other.step_definitions);
        self.sequences.extend(other.sequences);
        self.transforms.extend(other.transforms);
        self.hooks.extend(other.hooks);
        self.world_factory = self.world_factory.or(other.world_factory);
        self.world_modules.extend(other.world_modules);
    }
}

/// Registration API handed to [`StepPlugin::register_steps`].
///
/// Every method records the caller's source location, so errors and
/// listings point at plugin code.
pub struct Registrar<'a> {
    language: &'a mut StepLanguage,
    report: &'a mut LoadReport,
}

impl Registrar<'_> {
    /// Register a pattern step with a closure body.
    ///
    /// # Errors
    ///
    /// Returns [`LucidError::Pattern`](crate::LucidError::Pattern) if the
    /// pattern does not compile.
    #[track_caller]
    pub fn step<F>(&mut self, pattern: &str, body: F) -> Result<Arc<StepDefinition>>
    where
        F: Fn(&mut World, &[Value]) -> StepResult + Send + Sync + 'static,
    {
        self.step_with(pattern, StepBody::closure(body), StepOptions::default())
    }

    /// Register a pattern step whose body is a world method.
    ///
    /// # Errors
    ///
    /// See [`Registrar::step`].
    #[track_caller]
    pub fn named_step(&mut self, pattern: &str, method: &str) -> Result<Arc<StepDefinition>> {
        self.step_with(pattern, StepBody::named(method), StepOptions::default())
    }

    /// Register a pattern step with explicit body and options.
    ///
    /// # Errors
    ///
    /// See [`Registrar::step`].
    #[track_caller]
    pub fn step_with(
        &mut self,
        pattern: &str,
        body: StepBody,
        options: StepOptions,
    ) -> Result<Arc<StepDefinition>> {
        let site = RegistrationSite::caller();
        let definition = self
            .language
            .steps
            .register_at(pattern, body, options, site)?;
        self.report.step_definitions.push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Register a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`LucidError::Sequence`](crate::LucidError::Sequence) if the
    /// phrase is taken or the template is invalid.
    #[track_caller]
    pub fn sequence(&mut self, phrase: &str, template: &str) -> Result<Arc<Sequence>> {
        let site = RegistrationSite::caller();
        let sequence = self.language.sequences.register_at(phrase, template, site)?;
        self.report.sequences.push(Arc::clone(&sequence));
        Ok(sequence)
    }

    /// Register an argument transform.
    ///
    /// # Errors
    ///
    /// Returns [`LucidError::Pattern`](crate::LucidError::Pattern) if the
    /// pattern does not compile.
    #[track_caller]
    pub fn transform<F>(&mut self, pattern: &str, body: F) -> Result<Arc<Transform>>
    where
        F: Fn(&[&str]) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        let site = RegistrationSite::caller();
        let transform = self
            .language
            .transforms
            .register_at(pattern, Arc::new(body), site)?;
        self.report.transforms.push(Arc::clone(&transform));
        Ok(transform)
    }

    /// Register a hook for `phase`, gated by `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`LucidError::Tags`](crate::LucidError::Tags) if the tag
    /// expression is malformed.
    #[track_caller]
    pub fn hook<F>(&mut self, phase: HookPhase, tags: &[&str], body: F) -> Result<Arc<Hook>>
    where
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        let site = RegistrationSite::caller();
        let hook = self
            .language
            .hooks
            .register_at(phase, tags, Arc::new(body), site)?;
        self.report.hooks.push(Arc::clone(&hook));
        Ok(hook)
    }

    /// Register a before-scenario hook.
    ///
    /// # Errors
    ///
    /// See [`Registrar::hook`].
    #[track_caller]
    pub fn before<F>(&mut self, tags: &[&str], body: F) -> Result<Arc<Hook>>
    where
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        self.hook(HookPhase::BeforeScenario, tags, body)
    }

    /// Register an after-scenario hook.
    ///
    /// # Errors
    ///
    /// See [`Registrar::hook`].
    #[track_caller]
    pub fn after<F>(&mut self, tags: &[&str], body: F) -> Result<Arc<Hook>>
    where
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        self.hook(HookPhase::AfterScenario, tags, body)
    }

    /// Register a hook run before each step.
    ///
    /// # Errors
    ///
    /// See [`Registrar::hook`].
    #[track_caller]
    pub fn before_step<F>(&mut self, tags: &[&str], body: F) -> Result<Arc<Hook>>
    where
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        self.hook(HookPhase::BeforeStep, tags, body)
    }

    /// Register a hook run after each step.
    ///
    /// # Errors
    ///
    /// See [`Registrar::hook`].
    #[track_caller]
    pub fn after_step<F>(&mut self, tags: &[&str], body: F) -> Result<Arc<Hook>>
    where
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        self.hook(HookPhase::AfterStep, tags, body)
    }

    /// Register the factory producing each scenario's state.
    ///
    /// # Errors
    ///
    /// Returns [`LucidError::World`](crate::LucidError::World) naming both
    /// sites if a factory is already registered.
    #[track_caller]
    pub fn world<T, F>(&mut self, factory: F) -> Result<()>
    where
        T: Send + 'static,
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        let site = RegistrationSite::caller();
        self.language
            .worlds
            .register_factory_at(Arc::new(move || factory().map(World::from_state)), site)?;
        self.report.world_factory = Some(site);
        Ok(())
    }

    /// Register a module installed into every world.
    pub fn world_module<M: WorldModule + 'static>(&mut self, module: M) {
        self.report.world_modules.push(module.name().to_owned());
        self.language.worlds.register_module(Arc::new(module));
    }
}

/// Registries and lifecycle of one run.
#[derive(Debug)]
pub struct StepLanguage {
    config: EngineConfig,
    steps: StepRegistry,
    sequences: SequenceRegistry,
    transforms: TransformEngine,
    hooks: HookScheduler,
    worlds: WorldManager,
}

impl Default for StepLanguage {
    fn default() -> Self { Self::new(EngineConfig::default()) }
}

impl StepLanguage {
    /// Create an empty language using `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let worlds = WorldManager::new(config.assertion_style);
        Self {
            config,
            steps: StepRegistry::default(),
            sequences: SequenceRegistry::default(),
            transforms: TransformEngine::default(),
            hooks: HookScheduler::default(),
            worlds,
        }
    }

    /// Run `plugin`'s registrations.
    ///
    /// # Errors
    ///
    /// Returns the first registration error. Registrations made before it
    /// remain; the failed one leaves no trace.
    pub fn load(&mut self, plugin: &dyn StepPlugin) -> Result<LoadReport> {
        let mut report = LoadReport {
            plugins: vec![plugin.name().to_owned()],
            ..LoadReport::default()
        };
        let mut registrar = Registrar {
            language: self,
            report: &mut report,
        };
        if let Err(error) = plugin.register_steps(&mut registrar) {
            warn!(plugin = plugin.name(), %error, "step plugin failed to load");
            return Err(error);
        }
        info!(
            plugin = plugin.name(),
            registrations = report.len(),
            "loaded step plugin"
        );
        Ok(report)
    }

    /// Load every plugin in order, then notify `orchestrator`.
    ///
    /// # Errors
    ///
    /// Returns the first registration error without notifying.
    pub fn load_all(
        &mut self,
        plugins: &[&dyn StepPlugin],
        orchestrator: &dyn Orchestrator,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for plugin in plugins {
            report.merge(self.load(*plugin)?);
        }
        orchestrator.code_loaded(&report);
        Ok(report)
    }

    /// Every definition matching `name_to_match`.
    #[must_use]
    pub fn step_matches(&self, name_to_match: &str, name_to_format: Option<&str>) -> Vec<StepMatch> {
        self.steps.match_all(name_to_match, name_to_format)
    }

    /// The single definition for `name_to_match` under the configured
    /// [`MatchPolicy`](crate::step::MatchPolicy).
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] for undefined or ambiguous steps.
    pub fn find_match(
        &self,
        name_to_match: &str,
        name_to_format: Option<&str>,
    ) -> std::result::Result<StepMatch, MatchError> {
        resolve(
            name_to_match,
            self.step_matches(name_to_match, name_to_format),
            self.config.match_policy,
        )
    }

    /// Run a matched step and record its definition as used.
    ///
    /// # Errors
    ///
    /// Returns the step's failure.
    pub fn invoke(
        &self,
        world: &mut World,
        step_match: &StepMatch,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult {
        self.steps.mark_invoked(step_match.definition());
        step_match.invoke(world, &self.transforms, multiline_arg)
    }

    /// Expand the sequence invoked by `text` and run its steps through the
    /// world's orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::Sequence`](crate::step::StepFailure::Sequence)
    /// for unknown phrases or blank values, otherwise the first failing
    /// step's failure.
    pub fn invoke_sequence(&self, world: &mut World, text: &str) -> StepResult {
        let steps = self.sequences.expand(text)?;
        world.steps(&steps)
    }

    /// Run `step_name`, as a sequence if one has that phrase and as a pattern
    /// step otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] failures for unresolvable steps, otherwise the
    /// step's failure.
    pub fn execute(
        &self,
        world: &mut World,
        step_name: &str,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult {
        if self.sequences.lookup(step_name).is_ok() {
            return self.invoke_sequence(world, step_name);
        }
        let step_match = self.find_match(step_name, None)?;
        self.invoke(world, &step_match, multiline_arg)
    }

    /// Hooks of `phase` that apply to `scenario`, in registration order.
    #[must_use]
    pub fn hooks_for(&self, phase: HookPhase, scenario: &dyn ScenarioNode) -> Vec<Arc<Hook>> {
        self.hooks.applicable(phase, scenario.tags())
    }

    /// Convert raw arguments with the registered transforms.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransformError`].
    pub fn execute_transforms(
        &self,
        arguments: &[StepArgument],
    ) -> std::result::Result<Vec<Value>, TransformError> {
        self.transforms.apply(arguments)
    }

    /// Create the world for `scenario`.
    ///
    /// # Errors
    ///
    /// See [`WorldManager::begin_scenario`].
    pub fn begin_scenario(
        &self,
        scenario: &dyn ScenarioNode,
        facade: Facade,
    ) -> std::result::Result<World, WorldError> {
        self.worlds.begin_scenario(scenario, facade)
    }

    /// Release the scenario's world.
    ///
    /// # Errors
    ///
    /// See [`WorldManager::end_scenario`].
    pub fn end_scenario(&self, world: World) -> std::result::Result<(), WorldError> {
        self.worlds.end_scenario(world)
    }

    /// Definitions never invoked so far.
    #[must_use]
    pub fn unmatched_step_definitions(&self) -> Vec<Arc<StepDefinition>> { self.steps.unused() }

    /// Suggested registration for an undefined step.
    #[must_use]
    pub fn snippet_text(
        &self,
        keyword: &str,
        step_name: &str,
        multiline: Option<MultilineKind>,
    ) -> String {
        snippet::snippet_text(keyword, step_name, multiline, self.config.snippet_type)
    }

    /// Remove every hook.
    pub fn clear_hooks(&mut self) { self.hooks.clear(); }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Pattern step registry.
    #[must_use]
    pub fn steps(&self) -> &StepRegistry { &self.steps }

    /// Sequence registry.
    #[must_use]
    pub fn sequences(&self) -> &SequenceRegistry { &self.sequences }

    /// Transform engine.
    #[must_use]
    pub fn transforms(&self) -> &TransformEngine { &self.transforms }

    /// Hook scheduler.
    #[must_use]
    pub fn hooks(&self) -> &HookScheduler { &self.hooks }

    /// World lifecycle manager.
    #[must_use]
    pub fn worlds(&self) -> &WorldManager { &self.worlds }
}
