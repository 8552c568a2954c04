use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::operator::Op;
use crate::parser::Parsed;
use crate::time::TimeError;

/// A clause remainder that does not decode into its condition's kind
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum DecodeError {
    #[error("malformed integer '{text}'")]
    #[diagnostic(
        code(condq::malformed_int),
        help("expected a base-10 integer such as 42 or -7")
    )]
    MalformedInt {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("malformed float '{text}'")]
    #[diagnostic(
        code(condq::malformed_float),
        help("expected a number such as 2.5 or -1e3")
    )]
    MalformedFloat {
        text: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("malformed boolean '{text}'")]
    #[diagnostic(
        code(condq::malformed_bool),
        help("expected one of true, false, 1, 0, t, f")
    )]
    MalformedBool { text: String },

    #[error("malformed timestamp '{text}'")]
    #[diagnostic(
        code(condq::malformed_timestamp),
        help("expected YYYY-MM-DD HH:MM:SS, e.g. 2020-12-26 14:20:33")
    )]
    MalformedTimestamp {
        text: String,
        #[source]
        source: TimeError,
    },
}

impl DecodeError {
    /// The offending text, trimmed
    pub fn text(&self) -> &str {
        match self {
            DecodeError::MalformedInt { text, .. }
            | DecodeError::MalformedFloat { text, .. }
            | DecodeError::MalformedBool { text }
            | DecodeError::MalformedTimestamp { text, .. } => text,
        }
    }
}

/// The first decode failure of a parse, located in the input.
///
/// Values decoded from earlier clauses are kept: see [`ParseError::partial`].
#[derive(Debug, Error, Diagnostic)]
#[error("invalid value for condition '{key}' (operator '{op}') in clause {clause}")]
pub struct ParseError {
    pub key: String,
    pub op: Op,
    /// Zero-based index of the clause in split order
    pub clause: usize,
    #[source]
    #[diagnostic_source]
    pub cause: DecodeError,
    #[source_code]
    src: String,
    #[label("{cause}")]
    span: SourceSpan,
    partial: Option<Box<Parsed>>,
}

impl ParseError {
    pub(crate) fn new(
        key: &str,
        op: &Op,
        clause: usize,
        cause: DecodeError,
        src: &str,
        span: SourceSpan,
    ) -> Self {
        ParseError {
            key: key.to_owned(),
            op: op.clone(),
            clause,
            cause,
            src: src.to_owned(),
            span,
            partial: None,
        }
    }

    pub(crate) fn with_partial(mut self, parsed: Parsed) -> Self {
        self.partial = Some(Box::new(parsed));
        self
    }

    /// Byte offset and length of the undecodable text in the input
    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// Results decoded before the failure. Only set by [`crate::Parser::parse`];
    /// `parse_into` leaves them in the caller's own result set.
    pub fn partial(&self) -> Option<&Parsed> {
        self.partial.as_deref()
    }
}
