//! Errors raised by the sequence registry.

use thiserror::Error;

use crate::location::RegistrationSite;

/// Errors raised while registering, finding, or invoking a sequence.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequenceError {
    /// A sequence with the same phrase is already registered.
    #[error(
        "A sequence with phrase '{phrase}' already exists.\nFirst registered at {first}\nRegistered again at {second}"
    )]
    DuplicateSequence {
        /// The phrase as given to the second registration.
        phrase: String,
        /// Site of the registration that won.
        first: RegistrationSite,
        /// Site of the rejected registration.
        second: RegistrationSite,
    },
    /// No sequence has the requested phrase.
    #[error("Unknown sequence step with phrase: '{0}'.")]
    UnknownSequence(String),
    /// A parameter was empty or only whitespace.
    #[error("An empty or blank parameter occurred in '{0}'.")]
    EmptyParameter(String),
    /// The phrase could never be matched by invocation text.
    #[error("Sequence phrase '{phrase}' cannot be invoked: {reason}.")]
    UnreachablePhrase {
        /// The rejected phrase.
        phrase: String,
        /// What makes the phrase unreachable.
        reason: &'static str,
    },
    /// The template refers to a placeholder the phrase does not declare.
    #[error("Sequence '{phrase}' uses placeholder <{placeholder}> that its phrase does not declare.")]
    UndeclaredPlaceholder {
        /// The sequence phrase.
        phrase: String,
        /// The unknown placeholder name.
        placeholder: String,
    },
}
