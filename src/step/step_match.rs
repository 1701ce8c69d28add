//! The result of matching step text against one definition.

use std::sync::Arc;

use super::{StepArgument, StepDefinition, StepFailure, StepResult};
use crate::{table::MultilineArg, transform::TransformEngine, value::Value, world::World};

/// A definition paired with the text it matched and the raw captures.
///
/// Step matches are recomputed for every invocation and never stored.
#[derive(Clone, Debug)]
pub struct StepMatch {
    definition: Arc<StepDefinition>,
    name_to_match: String,
    name_to_report: String,
    arguments: Vec<StepArgument>,
}

impl StepMatch {
    /// Create a match. `name_to_report` defaults to `name_to_match`.
    #[must_use]
    pub fn new(
        definition: Arc<StepDefinition>,
        name_to_match: &str,
        name_to_report: Option<&str>,
        arguments: Vec<StepArgument>,
    ) -> Self {
        Self {
            definition,
            name_to_match: name_to_match.to_owned(),
            name_to_report: name_to_report.unwrap_or(name_to_match).to_owned(),
            arguments,
        }
    }

    /// The matched definition.
    #[must_use]
    pub fn definition(&self) -> &Arc<StepDefinition> { &self.definition }

    /// Text the pattern was matched against.
    #[must_use]
    pub fn name(&self) -> &str { &self.name_to_match }

    /// Text shown to the user.
    #[must_use]
    pub fn name_to_report(&self) -> &str { &self.name_to_report }

    /// Raw captured arguments.
    #[must_use]
    pub fn arguments(&self) -> &[StepArgument] { &self.arguments }

    /// Captured values in group order.
    #[must_use]
    pub fn args(&self) -> Vec<Option<&str>> {
        self.arguments.iter().map(StepArgument::value).collect()
    }

    /// Length of the definition's pattern source.
    #[must_use]
    pub fn text_length(&self) -> usize { self.definition.pattern().len() }

    /// The definition's backtrace line.
    #[must_use]
    pub fn backtrace_line(&self) -> String { self.definition.backtrace_line() }

    /// Rewrite each captured span of the reported text through `format`.
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lucid::step::{StepBody, StepOptions, StepRegistry};
    ///
    /// let mut registry = StepRegistry::default();
    /// registry
    ///     .register(r"^I have (\d+) cukes in my (\w+)$", StepBody::named("cukes"), StepOptions::default())
    ///     .expect("valid pattern");
    /// let matched = registry.match_all("I have 42 cukes in my belly", None);
    /// assert_eq!(
    ///     matched[0].format_args(|arg| format!("[{arg}]")),
    ///     "I have [42] cukes in my [belly]"
    /// );
    /// ```
    #[must_use]
    pub fn format_args(&self, format: impl Fn(&str) -> String) -> String {
        let report = self.name_to_report.as_str();
        let mut out = String::with_capacity(report.len());
        let mut cursor = 0;
        for argument in &self.arguments {
            let (Some(value), Some(start)) = (argument.value(), argument.byte_offset()) else {
                continue;
            };
            let end = start + value.len();
            if start < cursor {
                // nested group, already covered by its parent
                continue;
            }
            let (Some(before), Some(_)) = (report.get(cursor..start), report.get(start..end))
            else {
                continue;
            };
            out.push_str(before);
            out.push_str(&format(value));
            cursor = end;
        }
        out.push_str(report.get(cursor..).unwrap_or_default());
        out
    }

    /// Transform the captured arguments, append `multiline_arg`, and run the
    /// definition's body against `world`.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure::Transform`] if a transform fails,
    /// [`StepFailure::Arity`] if the body declared an arity the captures and
    /// multiline argument do not fill, or whatever the body itself reports.
    pub fn invoke(
        &self,
        world: &mut World,
        transforms: &TransformEngine,
        multiline_arg: Option<MultilineArg>,
    ) -> StepResult {
        let actual = self.arguments.len() + usize::from(multiline_arg.is_some());
        if let Some(expected) = self.definition.options().arity
            && expected != actual
        {
            return Err(StepFailure::Arity { expected, actual });
        }
        let mut values = transforms.apply(&self.arguments)?;
        values.extend(multiline_arg.map(Value::from));
        self.definition.call(world, &values)
    }
}
