//! Registration snippets suggested for undefined steps.
//!
//! Quoted strings and digit runs in the step text become capture groups;
//! everything else is escaped literally.

use serde::Deserialize;

use crate::table::MultilineKind;

/// Shape of the pattern literal in a snippet.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SnippetType {
    /// Raw string literal, `r#"^…$"#`.
    #[default]
    Regexp,
    /// Ordinary string literal with escaped backslashes and quotes.
    Classic,
    /// Raw string literal using the fewest `#` marks that keep it valid.
    Percent,
}

impl SnippetType {
    /// The library default (currently [`SnippetType::Regexp`]).
    pub const DEFAULT: SnippetType = SnippetType::Regexp;
}

const QUOTED_CAPTURE: &str = r#""([^"]*)""#;
const NUMBER_CAPTURE: &str = r"(\d+)";

/// Build a pattern matching `step_name`, returning it with its capture count.
#[must_use]
pub fn pattern_for(step_name: &str) -> (String, usize) {
    let mut pattern = String::from("^");
    let mut captures = 0;
    let mut rest = step_name;
    while let Some(c) = rest.chars().next() {
        if c == '"'
            && let Some(close) = rest[1..].find('"')
        {
            pattern.push_str(QUOTED_CAPTURE);
            captures += 1;
            rest = &rest[close + 2..];
        } else if c.is_ascii_digit() {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            pattern.push_str(NUMBER_CAPTURE);
            captures += 1;
            rest = &rest[end..];
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            rest = &rest[c.len_utf8()..];
        }
    }
    pattern.push('$');
    (pattern, captures)
}

fn literal(pattern: &str, snippet_type: SnippetType) -> String {
    match snippet_type {
        SnippetType::Regexp => format!("r#\"{pattern}\"#"),
        SnippetType::Classic => format!("{pattern:?}"),
        SnippetType::Percent => {
            let mut hashes = String::new();
            while pattern.contains(&format!("\"{hashes}")) {
                hashes.push('#');
            }
            format!("r{hashes}\"{pattern}\"{hashes}")
        }
    }
}

/// Suggested registration for an undefined step.
///
/// ```
/// use lucid::snippet::{SnippetType, snippet_text};
///
/// let snippet = snippet_text("Given", "I have 42 cukes", None, SnippetType::Percent);
/// assert!(snippet.contains(r#"registrar.step(r"^I have (\d+) cukes$", |world, args| {"#));
/// ```
#[must_use]
pub fn snippet_text(
    keyword: &str,
    step_name: &str,
    multiline: Option<MultilineKind>,
    snippet_type: SnippetType,
) -> String {
    let (pattern, captures) = pattern_for(step_name);
    let mut arguments: Vec<String> = (1..=captures).map(|n| format!("arg{n}")).collect();
    match multiline {
        Some(MultilineKind::Table) => arguments.push("table".to_owned()),
        Some(MultilineKind::DocString) => arguments.push("doc_string".to_owned()),
        None => {}
    }
    let args_comment = if arguments.is_empty() {
        String::new()
    } else {
        format!("    // args: {}\n", arguments.join(", "))
    };
    format!(
        "// {keyword} {step_name}\nregistrar.step({}, |world, args| {{\n{args_comment}    world.pending(Some(\"Write code here that turns the phrase above into concrete actions\"))\n}})?;",
        literal(&pattern, snippet_type)
    )
}
