//! Test-only collaborators for unit tests.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    collaborators::{Attachment, Interface, Orchestrator},
    facade::Facade,
    step::{StepMatch, StepResult},
    table::MultilineArg,
    world::World,
};

/// Orchestrator that records step names and succeeds.
#[derive(Debug, Default)]
pub struct RecordingOrchestrator {
    pub invoked: Mutex<Vec<String>>,
}

impl Orchestrator for RecordingOrchestrator {
    fn invoke(&self, _world: &mut World, step_name: &str, _: Option<MultilineArg>) -> StepResult {
        self.invoked
            .lock()
            .expect("orchestrator lock poisoned")
            .push(step_name.to_owned());
        Ok(())
    }

    fn invoke_steps(&self, world: &mut World, steps_text: &str, _: Option<&str>) -> StepResult {
        steps_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .try_for_each(|line| self.invoke(world, line, None))
    }
}

/// Interface that ignores output and answers every prompt with `"yes"`.
#[derive(Debug, Default)]
pub struct SilentInterface;

impl Interface for SilentInterface {
    fn embed(&self, _: &Attachment, _: &str, _: Option<&str>) {}

    fn ask(&self, _: &str) -> String { "yes".to_owned() }

    fn puts(&self, _: &str) {}

    fn specs_paths(&self) -> Vec<PathBuf> { vec![PathBuf::from("features")] }

    fn step_match(&self, _: &str, _: Option<&str>) -> Vec<StepMatch> { Vec::new() }
}

/// Facade over a fresh [`RecordingOrchestrator`] and [`SilentInterface`].
pub fn facade() -> (Facade, Arc<RecordingOrchestrator>) {
    let orchestrator = Arc::new(RecordingOrchestrator::default());
    let facade = Facade::new(orchestrator.clone(), Arc::new(SilentInterface));
    (facade, orchestrator)
}
