#![doc(html_root_url = "https://docs.rs/lucid/latest")]
//! Public API for the `lucid` library.
//!
//! This crate is the execution core of a behaviour-driven test runner. It
//! matches scenario step text against registered definitions, converts
//! captured arguments, schedules tag-gated hooks, and manages the world each
//! scenario runs against. Parsing feature files, running scenarios, and
//! reporting results belong to the host, which plugs in through the
//! [`collaborators`] traits.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod facade;
pub mod hooks;
pub mod language;
pub mod location;
pub mod metrics;
pub mod panic;
pub mod prelude;
pub mod sequence;
pub mod snippet;
pub mod step;
pub mod table;
pub mod tags;
pub mod transform;
pub mod value;
pub mod world;

#[cfg(test)]
mod test_helpers;

pub use collaborators::{Attachment, Interface, Orchestrator, ScenarioInfo, ScenarioNode};
pub use config::EngineConfig;
/// Result type alias for registration APIs.
pub use error::{LucidError, PatternError, Result};
pub use facade::Facade;
pub use hooks::{Hook, HookPhase, HookScheduler};
pub use language::{LoadReport, Registrar, StepLanguage, StepPlugin};
pub use location::RegistrationSite;
pub use metrics::{REGISTRATIONS_TOTAL, SCENARIOS_STARTED, STEP_MATCHES_TOTAL, WORLD_FAILURES_TOTAL};
pub use sequence::{Sequence, SequenceError, SequenceRegistry};
pub use table::{DataTable, DocString, MultilineArg, TableError};
pub use tags::{TagExpression, TagExpressionError};
pub use transform::{Transform, TransformEngine, TransformError};
pub use value::Value;
pub use world::{World, WorldError, WorldManager, WorldModule};
