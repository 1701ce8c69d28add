//! Interfaces the engine requires from its host.
//!
//! The engine does not parse feature files, run scenarios, or talk to the
//! user. A host supplies those through the traits below: scenario nodes from
//! its parser, an [`Orchestrator`] that runs steps, and an [`Interface`] that
//! owns reporting and prompting.

use std::path::PathBuf;

use crate::{
    language::LoadReport,
    step::{StepMatch, StepResult},
    table::MultilineArg,
    world::World,
};

/// A scenario as seen by hooks and the world lifecycle.
pub trait ScenarioNode: Send + Sync {
    /// Scenario title.
    fn name(&self) -> &str;

    /// Tags applied to the scenario, including inherited feature tags.
    fn tags(&self) -> &[String];

    /// Natural-language identifier of the source, such as `en`.
    fn language(&self) -> &str;
}

/// Plain [`ScenarioNode`] for hosts without their own node type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioInfo {
    name: String,
    tags: Vec<String>,
    language: String,
}

impl ScenarioInfo {
    /// Create an untagged English scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            language: "en".to_owned(),
        }
    }

    /// Replace the scenario's tags.
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the scenario's natural language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl ScenarioNode for ScenarioInfo {
    fn name(&self) -> &str { &self.name }

    fn tags(&self) -> &[String] { &self.tags }

    fn language(&self) -> &str { &self.language }
}

/// Runs steps on behalf of step code and learns when loading finishes.
pub trait Orchestrator: Send + Sync {
    /// Run a single step by name against `world`.
    ///
    /// # Errors
    ///
    /// Returns the step's failure.
    fn invoke(
        &self,
        world: &mut World,
        step_name: &str,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult;

    /// Run several steps given as text, one per line, in `natural_language`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's failure.
    fn invoke_steps(
        &self,
        world: &mut World,
        steps_text: &str,
        natural_language: Option<&str>,
    ) -> StepResult;

    /// Called once a load phase has registered everything.
    fn code_loaded(&self, report: &LoadReport) { let _ = report; }
}

/// Something to attach to the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// A file on disk.
    Path(PathBuf),
    /// Raw bytes.
    Data(Vec<u8>),
}

/// Reporting and prompting surface of the host.
pub trait Interface: Send + Sync {
    /// Attach a file or bytes to the report.
    fn embed(&self, attachment: &Attachment, mime_type: &str, label: Option<&str>);

    /// Ask the user a question and return the answer.
    fn ask(&self, prompt: &str) -> String;

    /// Print text to the report.
    fn puts(&self, text: &str);

    /// Paths searched for feature files.
    fn specs_paths(&self) -> Vec<PathBuf>;

    /// Every definition matching `name_to_match`, formatted with
    /// `name_to_format` when given.
    fn step_match(&self, name_to_match: &str, name_to_format: Option<&str>) -> Vec<StepMatch>;
}
