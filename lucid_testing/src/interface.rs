//! A user interface double with scripted answers and captured output.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
};

use lucid::{Attachment, Interface, StepLanguage, step::StepMatch};

/// One captured call to [`Interface::embed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Embedded {
    /// What was attached.
    pub attachment: Attachment,
    /// Declared MIME type.
    pub mime_type: String,
    /// Optional label.
    pub label: Option<String>,
}

/// Answers prompts from a queue and records everything printed or embedded.
#[derive(Debug, Default)]
pub struct ScriptedInterface {
    language: OnceLock<Arc<StepLanguage>>,
    answers: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
    embedded: Mutex<Vec<Embedded>>,
    specs_paths: Vec<PathBuf>,
}

impl ScriptedInterface {
    /// Create an interface reporting `specs_paths`.
    #[must_use]
    pub fn new(specs_paths: Vec<PathBuf>) -> Self {
        Self {
            specs_paths,
            ..Self::default()
        }
    }

    /// Attach the language used for [`Interface::step_match`].
    pub fn attach(&self, language: Arc<StepLanguage>) { let _ = self.language.set(language); }

    /// Queue an answer for the next prompt.
    ///
    /// # Panics
    ///
    /// Panics if the answer lock is poisoned.
    pub fn answer(&self, text: impl Into<String>) {
        self.answers
            .lock()
            .expect("interface lock poisoned")
            .push_back(text.into());
    }

    /// Everything printed so far, prompts included.
    ///
    /// # Panics
    ///
    /// Panics if the output lock is poisoned.
    #[must_use]
    pub fn output(&self) -> Vec<String> { self.output.lock().expect("interface lock poisoned").clone() }

    /// Everything embedded so far.
    ///
    /// # Panics
    ///
    /// Panics if the embed lock is poisoned.
    #[must_use]
    pub fn embedded(&self) -> Vec<Embedded> {
        self.embedded.lock().expect("interface lock poisoned").clone()
    }

    fn print(&self, text: &str) {
        if let Ok(mut output) = self.output.lock() {
            output.push(text.to_owned());
        }
    }
}

impl Interface for ScriptedInterface {
    fn embed(&self, attachment: &Attachment, mime_type: &str, label: Option<&str>) {
        if let Ok(mut embedded) = self.embedded.lock() {
            embedded.push(Embedded {
                attachment: attachment.clone(),
                mime_type: mime_type.to_owned(),
                label: label.map(str::to_owned),
            });
        }
    }

    fn ask(&self, prompt: &str) -> String {
        self.print(prompt);
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or_default()
    }

    fn puts(&self, text: &str) { self.print(text); }

    fn specs_paths(&self) -> Vec<PathBuf> { self.specs_paths.clone() }

    fn step_match(&self, name_to_match: &str, name_to_format: Option<&str>) -> Vec<StepMatch> {
        self.language
            .get()
            .map(|language| language.step_matches(name_to_match, name_to_format))
            .unwrap_or_default()
    }
}
