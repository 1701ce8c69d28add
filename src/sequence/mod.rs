//! Sequences: exact phrases that expand into several steps.
//!
//! A sequence phrase such as `<user> logs in with <password>` is invoked by
//! step text that supplies each parameter as a double-quoted value:
//! `"alice" logs in with "s3cret"`. The registry enforces phrase uniqueness at
//! registration and rejects blank values when invoked.

mod error;
mod phrase;
mod registry;

pub use error::SequenceError;
pub use phrase::parse_parameters;
pub use registry::{Sequence, SequenceRegistry};
