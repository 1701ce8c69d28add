//! The narrow surface step code uses to reach the host.
//!
//! A [`Facade`] pairs an [`Orchestrator`] with an [`Interface`] and forwards
//! to them. It keeps no state of its own, so cloning one is cheap and every
//! world of a run can hold a copy.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    collaborators::{Attachment, Interface, Orchestrator},
    language::LoadReport,
    step::{StepMatch, StepResult},
    table::{DataTable, DocString, MultilineArg, TableError},
    world::World,
};

/// Delegating handle to the run's orchestrator and interface.
#[derive(Clone)]
pub struct Facade {
    orchestrator: Arc<dyn Orchestrator>,
    interface: Arc<dyn Interface>,
}

impl Facade {
    /// Pair an orchestrator with an interface.
    #[must_use]
    pub fn new(orchestrator: Arc<dyn Orchestrator>, interface: Arc<dyn Interface>) -> Self {
        Self {
            orchestrator,
            interface,
        }
    }

    /// Parse pipe-delimited table text.
    ///
    /// `file` and `line_offset` locate the text in its source so errors
    /// point at the right line.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if a row lacks pipes or has the wrong width.
    pub fn table(
        text: &str,
        file: Option<&Path>,
        line_offset: usize,
    ) -> Result<DataTable, TableError> {
        DataTable::parse(text, file, line_offset)
    }

    /// Build a table from rows of cells.
    #[must_use]
    pub fn table_from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> DataTable
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DataTable::new(rows)
    }

    /// Build a doc string with a content type such as `json`.
    #[must_use]
    pub fn doc_string(content: &str, content_type: &str) -> DocString {
        DocString::new(content, content_type)
    }

    /// Run a step through the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns whatever the orchestrator reports.
    pub fn invoke(
        &self,
        world: &mut World,
        step_name: &str,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult {
        self.orchestrator.invoke(world, step_name, multiline_arg)
    }

    /// Run several steps through the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns whatever the orchestrator reports.
    pub fn invoke_steps(
        &self,
        world: &mut World,
        steps_text: &str,
        natural_language: Option<&str>,
    ) -> StepResult {
        self.orchestrator
            .invoke_steps(world, steps_text, natural_language)
    }

    /// Tell the orchestrator a load phase finished.
    pub fn code_loaded(&self, report: &LoadReport) { self.orchestrator.code_loaded(report); }

    /// Attach a file or bytes to the report.
    pub fn embed(&self, attachment: &Attachment, mime_type: &str, label: Option<&str>) {
        self.interface.embed(attachment, mime_type, label);
    }

    /// Ask the user a question.
    #[must_use]
    pub fn ask(&self, prompt: &str) -> String { self.interface.ask(prompt) }

    /// Print text to the report.
    pub fn puts(&self, text: &str) { self.interface.puts(text); }

    /// Paths searched for feature files.
    #[must_use]
    pub fn specs_paths(&self) -> Vec<PathBuf> { self.interface.specs_paths() }

    /// Definitions matching `name_to_match`.
    #[must_use]
    pub fn step_match(&self, name_to_match: &str, name_to_format: Option<&str>) -> Vec<StepMatch> {
        self.interface.step_match(name_to_match, name_to_format)
    }
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade").finish_non_exhaustive()
    }
}
