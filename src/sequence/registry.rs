//! Exact-phrase registry of step sequences.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

use tracing::{debug, warn};

use super::{
    SequenceError,
    phrase::{self, Segment},
};
use crate::{
    location::RegistrationSite,
    metrics::{self, RegistrationKind},
};

/// A phrase bound to a template of steps.
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    phrase: String,
    key: String,
    parameters: Vec<String>,
    template: String,
    site: RegistrationSite,
}

impl Sequence {
    /// The phrase as registered, placeholders included.
    #[must_use]
    pub fn phrase(&self) -> &str { &self.phrase }

    /// Declared parameter names in phrase order.
    #[must_use]
    pub fn parameters(&self) -> &[String] { &self.parameters }

    /// Unrendered step template.
    #[must_use]
    pub fn template(&self) -> &str { &self.template }

    /// Where the sequence was registered.
    #[must_use]
    pub fn site(&self) -> RegistrationSite { self.site }

    /// Substitute `values` for the declared placeholders in the template.
    ///
    /// Values pair with [`Sequence::parameters`] by position; a placeholder
    /// without a value renders as empty text.
    #[must_use]
    pub fn render(&self, values: &[String]) -> String {
        phrase::placeholder_segments(&self.template)
            .into_iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text,
                Segment::Slot(name) => self
                    .parameters
                    .iter()
                    .position(|parameter| *parameter == name)
                    .and_then(|index| values.get(index))
                    .map_or("", String::as_str),
            })
            .collect()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("phrase", &self.phrase)
            .field("parameters", &self.parameters)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

/// Stores sequences keyed by phrase.
///
/// Lookups are exact: text is compared verbatim after quoted values are
/// reduced to slots, with no trimming or case folding.
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    sequences: HashMap<String, Arc<Sequence>>,
}

impl SequenceRegistry {
    /// Register a sequence, attributing it to the caller.
    ///
    /// # Errors
    ///
    /// See [`SequenceRegistry::register_at`].
    #[track_caller]
    pub fn register(&mut self, phrase: &str, template: &str) -> Result<Arc<Sequence>, SequenceError> {
        self.register_at(phrase, template, RegistrationSite::caller())
    }

    /// Register a sequence attributed to `site`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::DuplicateSequence`] if the phrase is taken,
    /// [`SequenceError::EmptyParameter`] if the phrase declares a blank
    /// placeholder, [`SequenceError::UnreachablePhrase`] if no invocation
    /// could reach the phrase, or [`SequenceError::UndeclaredPlaceholder`] if the
    /// template uses a name the phrase does not declare. The registry is
    /// unchanged on error.
    pub fn register_at(
        &mut self,
        phrase: &str,
        template: &str,
        site: RegistrationSite,
    ) -> Result<Arc<Sequence>, SequenceError> {
        let parameters = phrase::declared_parameters(phrase)?;
        if let Some(reason) = phrase::unreachable_reason(phrase) {
            return Err(SequenceError::UnreachablePhrase {
                phrase: phrase.to_owned(),
                reason,
            });
        }
        for segment in phrase::placeholder_segments(template) {
            if let Segment::Slot(name) = segment
                && !parameters.iter().any(|parameter| *parameter == name)
            {
                return Err(SequenceError::UndeclaredPlaceholder {
                    phrase: phrase.to_owned(),
                    placeholder: name.into_owned(),
                });
            }
        }
        let key = phrase::key_of(&phrase::placeholder_segments(phrase));
        let slot = match self.sequences.entry(key.clone()) {
            Entry::Occupied(existing) => {
                let first = existing.get().site;
                warn!(phrase, %first, second = %site, "duplicate sequence phrase");
                return Err(SequenceError::DuplicateSequence {
                    phrase: phrase.to_owned(),
                    first,
                    second: site,
                });
            }
            Entry::Vacant(slot) => slot,
        };
        let sequence = Arc::new(Sequence {
            phrase: phrase.to_owned(),
            key,
            parameters,
            template: template.to_owned(),
            site,
        });
        slot.insert(Arc::clone(&sequence));
        metrics::inc_registrations(RegistrationKind::Sequence);
        debug!(phrase, %site, "registered sequence");
        Ok(sequence)
    }

    /// Find the sequence invoked by `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::UnknownSequence`] if no phrase matches.
    pub fn lookup(&self, text: &str) -> Result<&Arc<Sequence>, SequenceError> {
        let key = phrase::key_of(&phrase::quoted_segments(text));
        self.sequences
            .get(&key)
            .ok_or_else(|| SequenceError::UnknownSequence(text.to_owned()))
    }

    /// Parameter values supplied by `text`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::EmptyParameter`] if any value is blank.
    pub fn parse_parameters(text: &str) -> Result<Vec<String>, SequenceError> {
        phrase::parse_parameters(text)
    }

    /// Look up `text` and render the matching template with its values.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::UnknownSequence`] or
    /// [`SequenceError::EmptyParameter`].
    pub fn expand(&self, text: &str) -> Result<String, SequenceError> {
        let sequence = self.lookup(text)?;
        let values = Self::parse_parameters(text)?;
        Ok(sequence.render(&values))
    }

    /// All sequences, in no particular order.
    pub fn sequences(&self) -> impl Iterator<Item = &Arc<Sequence>> { self.sequences.values() }

    /// Number of registered sequences.
    #[must_use]
    pub fn len(&self) -> usize { self.sequences.len() }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.sequences.is_empty() }
}
