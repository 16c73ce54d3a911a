//! Template compile and render errors

use thiserror::Error;

/// Errors raised while compiling or rendering a template
///
/// Line numbers are one-based positions in the template text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `[col,name]` names a transform that does not exist
    #[error("line {line}: unsupported transform '{name}'")]
    UnknownTransform { line: usize, name: String },

    /// `=name(...)` names a function that does not exist
    #[error("line {line}: unsupported function '{name}'")]
    UnknownFunction { line: usize, name: String },

    /// A function was called with the wrong number of arguments
    #[error("line {line}: {function} expects {expected} argument(s), found {found}")]
    Arity {
        line: usize,
        function: &'static str,
        expected: usize,
        found: usize,
    },

    /// More than one function call on a single line
    #[error("line {line}: only one function call is allowed per line")]
    MultipleFunctions { line: usize },

    /// A function call is missing its closing parenthesis
    #[error("line {line}: unterminated call to {function}")]
    UnterminatedCall { line: usize, function: String },

    /// The row has no column with this name
    #[error("line {line}: unknown column '{column}'")]
    UnknownColumn { line: usize, column: String },

    /// A function received a value it cannot interpret
    #[error("line {line}: invalid argument '{value}' for {function}: {reason}")]
    InvalidArgument {
        line: usize,
        function: &'static str,
        value: String,
        reason: String,
    },
}

impl TemplateError {
    /// Template line the error refers to
    pub fn line(&self) -> usize {
        match self {
            TemplateError::UnknownTransform { line, .. }
            | TemplateError::UnknownFunction { line, .. }
            | TemplateError::Arity { line, .. }
            | TemplateError::MultipleFunctions { line }
            | TemplateError::UnterminatedCall { line, .. }
            | TemplateError::UnknownColumn { line, .. }
            | TemplateError::InvalidArgument { line, .. } => *line,
        }
    }

    pub(crate) fn invalid_argument(
        line: usize,
        function: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        TemplateError::InvalidArgument {
            line,
            function,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
