//! Errors that interrupt the processing of a single line.
//!
//! Only malformed command text and failing embedded expressions are errors. Everything that
//! goes wrong later (unknown names, failing builtins, failing programs) is reported through
//! [`Outcome`](crate::Outcome) so the host loop keeps running.

use thiserror::Error;

/// Errors that can occur during lexical analysis of a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `'` was opened but never closed.
    #[error("unterminated single quote")]
    UnfinishedSingleQuote,
    /// A `"` was opened but never closed.
    #[error("unterminated double quote")]
    UnfinishedDoubleQuote,
    /// The command ends with a lone backslash.
    #[error("unterminated escape at end of input")]
    UnfinishedEscape,
    /// Nothing left to run after tokenizing.
    #[error("missing command name")]
    MissingCommand,
    /// A substituted value cannot be represented as a shell word.
    #[error("value of `#{{{expression}}}` cannot be quoted: {reason}")]
    Unquotable { expression: String, reason: String },
}

/// The host evaluator rejected an embedded expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (in `#{{{expression}}}`)")]
pub struct EvaluationError {
    /// The expression text found between `#{` and `}`.
    pub expression: String,
    /// What the host reported.
    pub message: String,
}

impl EvaluationError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}
