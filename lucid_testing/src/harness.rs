//! Drive whole scenarios through a loaded [`StepLanguage`].
//!
//! [`Harness`] plays the host's part: it loads plugins, wires the facade, and
//! runs scenarios the way a runner would, with scenario hooks around the
//! steps, step hooks around each step, and remaining steps skipped after the
//! first failure.

use std::sync::Arc;

use lucid::{
    DataTable,
    DocString,
    EngineConfig,
    Facade,
    HookPhase,
    LucidError,
    MultilineArg,
    ScenarioNode,
    StepLanguage,
    StepPlugin,
    World,
    WorldError,
    step::{MatchError, StepFailure},
};

use crate::{EngineOrchestrator, ScriptedInterface, split_keyword};

/// One line of a scenario, with its optional multiline argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    text: String,
    multiline_arg: Option<MultilineArg>,
}

impl Step {
    /// A step line such as `Given I have 3 cukes`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            multiline_arg: None,
        }
    }

    /// Attach a data table.
    #[must_use]
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.multiline_arg = Some(MultilineArg::Table(table));
        self
    }

    /// Attach a doc string.
    #[must_use]
    pub fn with_doc_string(mut self, doc_string: DocString) -> Self {
        self.multiline_arg = Some(MultilineArg::DocString(doc_string));
        self
    }
}

impl From<&str> for Step {
    fn from(text: &str) -> Self { Step::new(text) }
}

/// How a step ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The step passed.
    Passed,
    /// The step or one of its step hooks failed.
    Failed(String),
    /// The step asked to be marked pending.
    Pending(String),
    /// No definition matched; carries the suggested snippet.
    Undefined(String),
    /// An earlier step did not pass.
    Skipped,
}

/// Outcome of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step line as written.
    pub text: String,
    /// How it ended.
    pub status: StepStatus,
}

/// Everything that happened in one scenario.
#[derive(Debug, Default)]
pub struct ScenarioRun {
    /// Step outcomes in order.
    pub steps: Vec<StepOutcome>,
    /// Failed hooks with their phase.
    pub hook_failures: Vec<(HookPhase, String)>,
    /// Failure to create the world; no step ran.
    pub world_error: Option<WorldError>,
    /// Failure reported when the world was released.
    pub end_error: Option<WorldError>,
}

impl ScenarioRun {
    /// Whether every step and hook passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.world_error.is_none()
            && self.end_error.is_none()
            && self.hook_failures.is_empty()
            && self
                .steps
                .iter()
                .all(|step| step.status == StepStatus::Passed)
    }

    /// Step statuses in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<&StepStatus> { self.steps.iter().map(|step| &step.status).collect() }
}

/// A loaded language plus the collaborators needed to run scenarios.
#[derive(Debug)]
pub struct Harness {
    language: Arc<StepLanguage>,
    orchestrator: Arc<EngineOrchestrator>,
    interface: Arc<ScriptedInterface>,
}

impl Harness {
    /// Load `plugins` into a new language configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn load(config: EngineConfig, plugins: &[&dyn StepPlugin]) -> Result<Self, LucidError> {
        let orchestrator = Arc::new(EngineOrchestrator::default());
        let interface = Arc::new(ScriptedInterface::new(config.specs_paths.clone()));
        let mut language = StepLanguage::new(config);
        language.load_all(plugins, orchestrator.as_ref())?;
        let language = Arc::new(language);
        orchestrator.attach(Arc::clone(&language));
        interface.attach(Arc::clone(&language));
        Ok(Self {
            language,
            orchestrator,
            interface,
        })
    }

    /// The loaded language.
    #[must_use]
    pub fn language(&self) -> &StepLanguage { &self.language }

    /// The orchestrator double.
    #[must_use]
    pub fn orchestrator(&self) -> &EngineOrchestrator { &self.orchestrator }

    /// The interface double.
    #[must_use]
    pub fn interface(&self) -> &ScriptedInterface { &self.interface }

    /// A facade over this harness's collaborators.
    #[must_use]
    pub fn facade(&self) -> Facade {
        Facade::new(self.orchestrator.clone(), self.interface.clone())
    }

    /// Run `steps` as `scenario`.
    pub fn run_scenario<S: Into<Step>>(
        &self,
        scenario: &dyn ScenarioNode,
        steps: impl IntoIterator<Item = S>,
    ) -> ScenarioRun {
        self.run_scenario_inspect(scenario, steps, |_| {})
    }

    /// Run `steps` as `scenario`, handing the world to `inspect` after the
    /// after-scenario hooks and before it is released.
    pub fn run_scenario_inspect<S: Into<Step>>(
        &self,
        scenario: &dyn ScenarioNode,
        steps: impl IntoIterator<Item = S>,
        inspect: impl FnOnce(&World),
    ) -> ScenarioRun {
        let mut run = ScenarioRun::default();
        let mut world = match self.language.begin_scenario(scenario, self.facade()) {
            Ok(world) => world,
            Err(error) => {
                run.world_error = Some(error);
                return run;
            }
        };

        let mut blocked = !self.run_hooks(HookPhase::BeforeScenario, &mut world, scenario, &mut run);
        for step in steps.into_iter().map(Into::into) {
            let status = if blocked {
                StepStatus::Skipped
            } else {
                self.run_step(&mut world, scenario, &step, &mut run)
            };
            blocked |= status != StepStatus::Passed;
            run.steps.push(StepOutcome {
                text: step.text,
                status,
            });
        }
        self.run_hooks(HookPhase::AfterScenario, &mut world, scenario, &mut run);

        inspect(&world);
        run.end_error = self.language.end_scenario(world).err();
        run
    }

    fn run_step(
        &self,
        world: &mut World,
        scenario: &dyn ScenarioNode,
        step: &Step,
        run: &mut ScenarioRun,
    ) -> StepStatus {
        if !self.run_hooks(HookPhase::BeforeStep, world, scenario, run) {
            return StepStatus::Skipped;
        }
        let (keyword, name) = split_keyword(&step.text);
        let status = match self
            .language
            .execute(world, name, step.multiline_arg.clone())
        {
            Ok(()) => StepStatus::Passed,
            Err(StepFailure::Pending(message)) => {
                StepStatus::Pending(message.unwrap_or_else(|| "TODO".to_owned()))
            }
            Err(StepFailure::Match(MatchError::Undefined { .. })) => {
                StepStatus::Undefined(self.language.snippet_text(
                    keyword,
                    name,
                    step.multiline_arg.as_ref().map(MultilineArg::kind),
                ))
            }
            Err(failure) => StepStatus::Failed(failure.to_string()),
        };
        if !self.run_hooks(HookPhase::AfterStep, world, scenario, run) && status == StepStatus::Passed {
            return StepStatus::Failed("after-step hook failed".to_owned());
        }
        status
    }

    /// Run every applicable hook of `phase`; returns `false` if any failed.
    fn run_hooks(
        &self,
        phase: HookPhase,
        world: &mut World,
        scenario: &dyn ScenarioNode,
        run: &mut ScenarioRun,
    ) -> bool {
        let mut passed = true;
        for hook in self.language.hooks_for(phase, scenario) {
            if let Err(failure) = hook.invoke(world, scenario) {
                run.hook_failures.push((phase, failure.to_string()));
                passed = false;
            }
        }
        passed
    }
}
