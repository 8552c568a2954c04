//! Typed values and the closed family of decoders producing them
//!
//! Every condition declares a [`Kind`]. Decoding turns the clause text left
//! after the key and operator into the matching [`Value`] variant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use crate::error::DecodeError;
use crate::time::{self, Zone};

/// What a condition's value decodes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    TextList,
    Int,
    IntList,
    Float,
    Bool,
    Timestamp(Zone),
}

/// A decoded value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum Value {
    Text(String),
    TextList(Vec<String>),
    Int(i64),
    IntList(Vec<i64>),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
}

impl Kind {
    /// Decode `text`, which is the clause remainder with leading whitespace
    /// already removed. Text values are taken verbatim; every other kind
    /// trims before parsing.
    pub fn decode(&self, text: &str) -> Result<Value, DecodeError> {
        match self {
            Kind::Text => Ok(Value::Text(text.to_owned())),
            Kind::TextList => Ok(Value::TextList(
                text.split(',').map(|s| s.trim().to_owned()).collect(),
            )),
            Kind::Int => parse_int(text).map(Value::Int),
            Kind::IntList => text
                .split(',')
                .map(parse_int)
                .collect::<Result<_, _>>()
                .map(Value::IntList),
            Kind::Float => {
                let trimmed = text.trim();
                trimmed
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|source| DecodeError::MalformedFloat {
                        text: trimmed.to_owned(),
                        source,
                    })
            }
            Kind::Bool => parse_bool(text.trim()).map(Value::Bool),
            Kind::Timestamp(zone) => time::parse_timestamp(text, zone)
                .map(Value::Timestamp)
                .map_err(|source| DecodeError::MalformedTimestamp {
                    text: text.trim().to_owned(),
                    source,
                }),
        }
    }

    /// Value held by a condition that never matched
    pub fn zero(&self) -> Value {
        match self {
            Kind::Text => Value::Text(String::new()),
            Kind::TextList => Value::TextList(Vec::new()),
            Kind::Int => Value::Int(0),
            Kind::IntList => Value::IntList(Vec::new()),
            Kind::Float => Value::Float(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::Timestamp(_) => Value::Timestamp(time::epoch()),
        }
    }
}

fn parse_int(text: &str) -> Result<i64, DecodeError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|source| DecodeError::MalformedInt {
            text: trimmed.to_owned(),
            source,
        })
}

fn parse_bool(text: &str) -> Result<bool, DecodeError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(DecodeError::MalformedBool {
            text: text.to_owned(),
        }),
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Text => f.write_str("text"),
            Kind::TextList => f.write_str("list"),
            Kind::Int => f.write_str("int"),
            Kind::IntList => f.write_str("ints"),
            Kind::Float => f.write_str("float"),
            Kind::Bool => f.write_str("bool"),
            Kind::Timestamp(zone) => write!(f, "time({})", zone),
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Timestamps parsed this way are in UTC
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "string" | "str" => Ok(Kind::Text),
            "list" | "strings" => Ok(Kind::TextList),
            "int" => Ok(Kind::Int),
            "ints" => Ok(Kind::IntList),
            "float" => Ok(Kind::Float),
            "bool" => Ok(Kind::Bool),
            "time" | "timestamp" => Ok(Kind::Timestamp(Zone::Utc)),
            other => Err(format!(
                "unknown kind '{}' (expected text, list, int, ints, float, bool or time)",
                other
            )),
        }
    }
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Value::TextList(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            Value::IntList(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::TextList(xs) => write!(f, "[{}]", xs.join(", ")),
            Value::Int(n) => write!(f, "{}", n),
            Value::IntList(xs) => {
                let parts: Vec<String> = xs.iter().map(i64::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S %:z")),
        }
    }
}
