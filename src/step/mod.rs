//! Pattern step definitions and matching.
//!
//! [`StepRegistry`] stores definitions whose regular expressions are matched
//! against step text. Matching returns every candidate as a [`StepMatch`];
//! [`resolve`] applies a [`MatchPolicy`] when exactly one is required.

mod argument;
mod definition;
mod error;
mod registry;
mod resolve;
mod step_match;

pub use argument::StepArgument;
pub use definition::{StepBody, StepDefinition, StepFn, StepOptions};
pub use error::{BoxError, MatchError, StepFailure, StepResult};
pub use registry::StepRegistry;
pub use resolve::{MatchPolicy, resolve};
pub use step_match::StepMatch;
