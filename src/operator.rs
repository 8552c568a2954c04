//! Operator tokens and ordered operator sets

use std::borrow::Cow;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// An opaque comparison token such as `=` or `<=`.
///
/// Operators carry no semantics of their own; they are matched by prefix
/// against clause text and attached to whatever value is decoded after them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Op(Cow<'static, str>);

pub const EQUAL: Op = Op::from_static("=");
pub const NOT_EQUAL: Op = Op::from_static("!=");
pub const LESS_THAN: Op = Op::from_static("<");
pub const LESS_THAN_OR_EQUAL: Op = Op::from_static("<=");
pub const GREATER_THAN: Op = Op::from_static(">");
pub const GREATER_THAN_OR_EQUAL: Op = Op::from_static(">=");

impl Op {
    pub const fn from_static(token: &'static str) -> Self {
        Op(Cow::Borrowed(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Op {
    fn from(token: &'static str) -> Self {
        Op::from_static(token)
    }
}

impl From<String> for Op {
    fn from(token: String) -> Self {
        Op(Cow::Owned(token))
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for Op {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Rejected operator set, only produced by [`OpSet::strict`]
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum OpSetError {
    #[error("empty operator token at position {position}")]
    #[diagnostic(code(condq::empty_operator))]
    Empty { position: usize },

    #[error("operator '{longer}' can never match: it is declared after its prefix '{shorter}'")]
    #[diagnostic(
        code(condq::shadowed_operator),
        help("declare longer operators before the shorter operators they start with")
    )]
    Shadowed { shorter: Op, longer: Op },
}

/// Ordered operators scoped to one condition.
///
/// Order is matching precedence. Every operator is tried in turn against the
/// shrinking clause remainder, so a shorter token declared before a longer
/// token it prefixes (`<` before `<=`) will consume only its own characters
/// and leave the rest in the value text. [`OpSet::new`] keeps that behavior;
/// [`OpSet::strict`] refuses such sets up front.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpSet(Vec<Op>);

impl OpSet {
    pub fn new<I, O>(ops: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Op>,
    {
        OpSet(ops.into_iter().map(Into::into).collect())
    }

    pub fn strict<I, O>(ops: I) -> Result<Self, OpSetError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Op>,
    {
        let set = OpSet::new(ops);

        for (position, op) in set.0.iter().enumerate() {
            if op.is_empty() {
                return Err(OpSetError::Empty { position });
            }

            if let Some(shorter) = set.0[..position]
                .iter()
                .find(|earlier| op.as_str().starts_with(earlier.as_str()))
            {
                return Err(OpSetError::Shadowed {
                    shorter: shorter.clone(),
                    longer: op.clone(),
                });
            }
        }

        Ok(set)
    }

    /// `<=, >=, !=, =, <, >`, longest tokens first
    pub fn comparison() -> Self {
        OpSet(vec![
            LESS_THAN_OR_EQUAL,
            GREATER_THAN_OR_EQUAL,
            NOT_EQUAL,
            EQUAL,
            LESS_THAN,
            GREATER_THAN,
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a OpSet {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for OpSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_order() {
        let set = OpSet::new(["<", "<=", "="]);
        let tokens: Vec<&str> = set.iter().map(Op::as_str).collect();
        assert_eq!(tokens, vec!["<", "<=", "="]);
    }

    #[test]
    fn test_strict_rejects_shadowed() {
        assert_eq!(
            OpSet::strict(["=", "<", "<="]),
            Err(OpSetError::Shadowed {
                shorter: LESS_THAN,
                longer: LESS_THAN_OR_EQUAL,
            })
        );
        assert_eq!(
            OpSet::strict(["=", ""]),
            Err(OpSetError::Empty { position: 1 })
        );
    }

    #[test]
    fn test_strict_accepts_longest_first() {
        let set = OpSet::strict(["<=", ">=", "!=", "=", "<", ">"]).unwrap();
        assert_eq!(set, OpSet::comparison());
        assert_eq!(set.to_string(), "<=,>=,!=,=,<,>");
    }

    #[test]
    fn test_owned_and_static_tokens_compare_equal() {
        assert_eq!(Op::from("<=".to_string()), LESS_THAN_OR_EQUAL);
        assert_eq!(Op::default().as_str(), "");
    }
}
