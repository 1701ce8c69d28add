//! Raw arguments captured from step text.

/// A capture group's text and its byte offset in the matched step name.
///
/// Both are `None` for an optional group that did not participate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepArgument {
    value: Option<String>,
    byte_offset: Option<usize>,
}

impl StepArgument {
    /// Create an argument.
    #[must_use]
    pub fn new(value: Option<String>, byte_offset: Option<usize>) -> Self {
        Self { value, byte_offset }
    }

    /// Captured text.
    #[must_use]
    pub fn value(&self) -> Option<&str> { self.value.as_deref() }

    /// Byte offset of the capture in the matched text.
    #[must_use]
    pub fn byte_offset(&self) -> Option<usize> { self.byte_offset }

    /// Length of the captured text in bytes, zero when absent.
    #[must_use]
    pub fn len(&self) -> usize { self.value.as_ref().map_or(0, String::len) }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
