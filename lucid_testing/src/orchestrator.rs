//! An orchestrator that runs steps against a loaded [`StepLanguage`].

use std::sync::{Arc, Mutex, OnceLock};

use lucid::{
    LoadReport,
    MultilineArg,
    Orchestrator,
    StepLanguage,
    World,
    step::{StepFailure, StepResult},
};

/// Split a step line into its Gherkin keyword and step text.
///
/// Lines without a recognised keyword are returned with an empty keyword.
///
/// ```
/// use lucid_testing::split_keyword;
///
/// assert_eq!(split_keyword("Given I have 3 cukes"), ("Given", "I have 3 cukes"));
/// assert_eq!(split_keyword("* a step"), ("*", "a step"));
/// assert_eq!(split_keyword("no keyword"), ("", "no keyword"));
/// ```
#[must_use]
pub fn split_keyword(line: &str) -> (&str, &str) {
    const KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];
    let line = line.trim();
    for keyword in KEYWORDS {
        if let Some(rest) = line.strip_prefix(keyword)
            && rest.starts_with(' ')
        {
            return (keyword, rest.trim_start());
        }
    }
    ("", line)
}

/// Runs nested steps through the attached language and records what ran.
///
/// The language is attached after loading, since loading needs an
/// orchestrator to notify. Until then every invocation succeeds without
/// running anything.
#[derive(Debug, Default)]
pub struct EngineOrchestrator {
    language: OnceLock<Arc<StepLanguage>>,
    invoked: Mutex<Vec<String>>,
    loads: Mutex<Vec<usize>>,
}

impl EngineOrchestrator {
    /// Attach the language used to run steps. Later calls are ignored.
    pub fn attach(&self, language: Arc<StepLanguage>) { let _ = self.language.set(language); }

    /// Step names invoked so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    #[must_use]
    pub fn invoked(&self) -> Vec<String> { self.invoked.lock().expect("orchestrator lock poisoned").clone() }

    /// Registration counts reported by each completed load phase.
    ///
    /// # Panics
    ///
    /// Panics if the record lock is poisoned.
    #[must_use]
    pub fn loads(&self) -> Vec<usize> { self.loads.lock().expect("orchestrator lock poisoned").clone() }
}

impl Orchestrator for EngineOrchestrator {
    fn invoke(
        &self,
        world: &mut World,
        step_name: &str,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult {
        self.invoked
            .lock()
            .map_err(|_| StepFailure::Failed("orchestrator lock poisoned".into()))?
            .push(step_name.to_owned());
        match self.language.get() {
            Some(language) => language.execute(world, step_name, multiline_arg),
            None => Ok(()),
        }
    }

    fn invoke_steps(
        &self,
        world: &mut World,
        steps_text: &str,
        _natural_language: Option<&str>,
    ) -> StepResult {
        steps_text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .try_for_each(|line| self.invoke(world, split_keyword(line).1, None))
    }

    fn code_loaded(&self, report: &LoadReport) {
        if let Ok(mut loads) = self.loads.lock() {
            loads.push(report.len());
        }
    }
}
