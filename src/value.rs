//! Argument values handed to step bodies.
//!
//! Captured text reaches a body as [`Value::Text`] unless a transform
//! converted it; optional capture groups that did not participate arrive as
//! [`Value::Missing`]. A multiline argument is appended as the last value.

use std::{any::Any, fmt, str::FromStr, sync::Arc};

use crate::{
    step::StepFailure,
    table::{DataTable, DocString, MultilineArg},
};

/// A single argument passed to a step body.
#[derive(Clone, Debug)]
pub enum Value {
    /// An optional capture group that matched nothing.
    Missing,
    /// Raw or transformed text.
    Text(String),
    /// A signed integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A data table.
    Table(DataTable),
    /// A doc string.
    DocString(DocString),
    /// Any other value produced by a transform.
    Custom(CustomValue),
}

/// Shared, type-erased value produced by a transform.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn Any + Send + Sync>);

impl CustomValue {
    /// Wrap `value`.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self { Self(Arc::new(value)) }

    /// Borrow the value as `T`, if it has that type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> { self.0.downcast_ref::<T>() }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("CustomValue(..)") }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::DocString(a), Value::DocString(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl Value {
    /// Wrap an arbitrary value.
    pub fn custom<T: Send + Sync + 'static>(value: T) -> Self { Value::Custom(CustomValue::new(value)) }

    /// Text content, if this is [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content, if this is [`Value::Integer`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Float content; integers widen.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "widening step integers to floats mirrors numeric literals in step text"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Boolean content, if this is [`Value::Boolean`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Table content, if this is [`Value::Table`].
    #[must_use]
    pub fn as_table(&self) -> Option<&DataTable> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Doc string content, if this is [`Value::DocString`].
    #[must_use]
    pub fn as_doc_string(&self) -> Option<&DocString> {
        match self {
            Value::DocString(doc) => Some(doc),
            _ => None,
        }
    }

    /// Borrow a [`Value::Custom`] payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Custom(custom) => custom.downcast_ref(),
            _ => None,
        }
    }

    /// Whether this is [`Value::Missing`].
    #[must_use]
    pub fn is_missing(&self) -> bool { matches!(self, Value::Missing) }

    /// Parse text content with [`FromStr`].
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::Failed`] when the value is not text or does not
    /// parse as `T`.
    ///
    /// ```
    /// use lucid::Value;
    ///
    /// let cukes: u32 = Value::Text("42".into()).parse().expect("numeric capture");
    /// assert_eq!(cukes, 42);
    /// ```
    pub fn parse<T>(&self) -> Result<T, StepFailure>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let text = self
            .as_str()
            .ok_or_else(|| StepFailure::Failed(format!("expected text argument, got {self:?}")))?;
        text.parse::<T>()
            .map_err(|e| StepFailure::Failed(format!("cannot parse {text:?}: {e}")))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self { Value::Text(text) }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self { Value::Text(text.to_owned()) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Integer(n) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Float(n) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Boolean(b) }
}

impl From<MultilineArg> for Value {
    fn from(arg: MultilineArg) -> Self {
        match arg {
            MultilineArg::Table(table) => Value::Table(table),
            MultilineArg::DocString(doc) => Value::DocString(doc),
        }
    }
}
