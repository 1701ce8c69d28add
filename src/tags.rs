//! Tag predicates gating hooks on a scenario's tags.
//!
//! A [`TagExpression`] is built from a list of strings. The list is a
//! conjunction; each string is a comma-separated disjunction of terms, and a
//! term is either `@tag` or its negation `~@tag`. The empty list accepts every
//! scenario.
//!
//! ```
//! use lucid::TagExpression;
//!
//! let expr = TagExpression::parse(&["@slow,@db", "~@wip"]).expect("valid tags");
//! assert!(expr.accepts(&["@db"]));
//! assert!(!expr.accepts(&["@db", "@wip"]));
//! assert!(!expr.accepts::<&str>(&[]));
//! ```

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a tag expression.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagExpressionError {
    /// A clause contained no terms.
    #[error("tag expression {0:?} contains an empty clause")]
    EmptyClause(String),
    /// A term was not of the form `@tag` or `~@tag`.
    #[error("invalid tag {term:?} in {clause:?}: tags must look like @name or ~@name")]
    InvalidTag {
        /// The offending term.
        term: String,
        /// The clause containing it.
        clause: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TagTerm {
    name: String,
    negated: bool,
}

impl TagTerm {
    fn parse(term: &str, clause: &str) -> Result<Self, TagExpressionError> {
        let invalid = || TagExpressionError::InvalidTag {
            term: term.to_owned(),
            clause: clause.to_owned(),
        };
        let (negated, name) = match term.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, term),
        };
        let bare = name.strip_prefix('@').ok_or_else(invalid)?;
        if bare.is_empty() || bare.chars().any(|c| c.is_whitespace() || c == '@') {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_owned(),
            negated,
        })
    }

    fn accepts<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        let present = tags.iter().any(|tag| tag.as_ref() == self.name);
        present != self.negated
    }
}

impl fmt::Display for TagTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("~")?;
        }
        f.write_str(&self.name)
    }
}

/// Boolean predicate over a scenario's tag set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagExpression {
    clauses: Vec<Vec<TagTerm>>,
}

impl TagExpression {
    /// Parse a list of clauses.
    ///
    /// # Errors
    ///
    /// Returns [`TagExpressionError`] if a clause is empty or a term is not a
    /// well-formed tag.
    pub fn parse<S: AsRef<str>>(clauses: &[S]) -> Result<Self, TagExpressionError> {
        let clauses = clauses
            .iter()
            .map(|clause| {
                let clause = clause.as_ref();
                let terms = clause
                    .split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(|term| TagTerm::parse(term, clause))
                    .collect::<Result<Vec<_>, _>>()?;
                if terms.is_empty() {
                    return Err(TagExpressionError::EmptyClause(clause.to_owned()));
                }
                Ok(terms)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    /// Whether the expression always accepts.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.clauses.is_empty() }

    /// Evaluate the expression against a tag set.
    #[must_use]
    pub fn accepts<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|term| term.accepts(tags)))
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            for (j, term) in clause.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{term}")?;
            }
        }
        Ok(())
    }
}
