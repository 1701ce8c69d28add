//! Optional convenience imports for writing step plugins.
//!
//! This module is intentionally small and focused on the types plugin code
//! touches on every registration. Prefer importing specialised APIs directly
//! from their owning modules.
//!
//! # Examples
//!
//! ```rust
//! use lucid::prelude::*;
//!
//! fn cukes(registrar: &mut Registrar<'_>) -> Result<()> {
//!     registrar.step(r"^I have (\d+) cukes$", |world, args| {
//!         let count: u32 = args[0].parse()?;
//!         world.insert(count);
//!         Ok(())
//!     })?;
//!     Ok(())
//! }
//!
//! let mut language = StepLanguage::default();
//! language.load(&cukes).expect("plugin loads");
//! ```

pub use crate::{
    error::{LucidError, Result},
    hooks::HookPhase,
    language::{Registrar, StepLanguage, StepPlugin},
    step::{StepFailure, StepResult},
    value::Value,
    world::{World, WorldExtender, WorldModule},
};
