//! Test doubles and a scenario runner for [`lucid`].
//!
//! [`Harness`] loads step plugins into a [`lucid::StepLanguage`] wired to an
//! [`EngineOrchestrator`] and a [`ScriptedInterface`], then runs scenarios
//! step by step with hooks applied.
//!
//! ```rust
//! use lucid::{EngineConfig, Registrar, ScenarioInfo};
//! use lucid_testing::{Harness, StepStatus};
//!
//! fn plugin(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
//!     registrar.world(|| Some(0_i64))?;
//!     registrar.step(r"^I add (\d+)$", |world, args| {
//!         *world.state_mut::<i64>()? += args[0].parse::<i64>()?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! }
//!
//! let harness = Harness::load(EngineConfig::default(), &[&plugin]).expect("plugin loads");
//! let run = harness.run_scenario(&ScenarioInfo::new("adding"), ["When I add 3"]);
//! assert_eq!(run.statuses(), [&StepStatus::Passed]);
//! ```

pub mod harness;
pub mod interface;
pub mod logging;
pub mod metrics;
pub mod orchestrator;

pub use harness::{Harness, ScenarioRun, Step, StepOutcome, StepStatus};
pub use interface::{Embedded, ScriptedInterface};
pub use logging::{CapturedEvent, EngineLog, engine_log};
pub use metrics::{CounterSnapshot, debugging_recorder_setup};
pub use orchestrator::{EngineOrchestrator, split_keyword};
