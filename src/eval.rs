//! The host evaluator seen from the command parser.

use crate::error::EvaluationError;
use std::collections::HashMap;

/// Evaluates embedded `#{...}` expressions in the host's current context.
///
/// Implementations return the printable string form of the value. The parser takes care of
/// quoting it before tokenization, so the returned text should not be pre-escaped.
pub trait Evaluator {
    fn evaluate(&mut self, expression: &str) -> Result<String, EvaluationError>;
}

impl<F> Evaluator for F
where
    F: FnMut(&str) -> Result<String, EvaluationError>,
{
    fn evaluate(&mut self, expression: &str) -> Result<String, EvaluationError> {
        self(expression)
    }
}

/// A name-to-value table that evaluates an expression by looking up its trimmed text.
///
/// This is the smallest useful host context: enough for the bundled REPL and for tests.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl Evaluator for Bindings {
    fn evaluate(&mut self, expression: &str) -> Result<String, EvaluationError> {
        let name = expression.trim();
        self.get(name)
            .map(str::to_owned)
            .ok_or_else(|| EvaluationError::new(expression, format!("undefined variable `{name}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_lookup_trims_expression() {
        let mut b = Bindings::default();
        b.set("x", "42");
        assert_eq!(b.evaluate(" x ").unwrap(), "42");
    }

    #[test]
    fn bindings_report_undefined_names() {
        let mut b = Bindings::default();
        let err = b.evaluate("nope").unwrap_err();
        assert_eq!(err.expression, "nope");
        assert!(err.message.contains("undefined"));
    }

    #[test]
    fn closures_are_evaluators() {
        let mut upper = |e: &str| Ok::<_, EvaluationError>(e.to_uppercase());
        assert_eq!(upper.evaluate("abc").unwrap(), "ABC");
    }
}
