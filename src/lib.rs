//! Typed filter conditions from delimited query strings.
//!
//! Declare the keys you expect, the operators each accepts and the type each
//! value decodes to, then parse strings such as `status=open&age>=30`:
//!
//! ```
//! use condq::{OpSet, Parser, Value};
//!
//! let mut parser = Parser::new("&");
//! let status = parser.text("status", OpSet::new(["=", "!="]));
//! let age = parser.int("age", OpSet::comparison());
//!
//! let parsed = parser.parse("status=open&age>=30").unwrap();
//! assert_eq!(parsed.value(status), Some(&Value::Text("open".into())));
//! assert_eq!(parsed[age].op().as_str(), ">=");
//! assert_eq!(parsed.value(age), Some(&Value::Int(30)));
//! ```
//!
//! Clauses are split on the delimiter outside double quotes, and a backslash
//! escapes the next character. Clauses that match no condition are ignored.

mod config;
mod error;
pub mod operator;
mod parser;
pub mod splitter;
pub mod time;
mod value;

pub use config::ParserConfig;
pub use error::{DecodeError, ParseError};
pub use operator::{Op, OpSet, OpSetError};
pub use parser::{Condition, Handle, Parsed, Parser, Sink};
pub use splitter::split;
pub use time::Zone;
pub use value::{Kind, Value};
