//! Condition registry and clause matching
//!
//! A [`Parser`] holds conditions in registration order. Parsing splits the
//! input into clauses and offers every clause to every condition; there is no
//! early exit, so two conditions whose keys both prefix a clause each see it.

use std::ops::Index;

use slog::{debug, trace};

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::operator::{Op, OpSet};
use crate::splitter::split_spans;
use crate::time::Zone;
use crate::value::{Kind, Value};

/// Refers to one registered condition and to its slot in a [`Parsed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    key: String,
    set: OpSet,
    kind: Kind,
}

impl Condition {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ops(&self) -> &OpSet {
        &self.set
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// The decoded state of one condition.
///
/// Until a clause matches, key and operator are empty and the value is the
/// kind's zero value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Sink {
    key: String,
    op: Op,
    value: Value,
    matched: bool,
}

impl Sink {
    fn zero(kind: Kind) -> Self {
        Sink {
            key: String::new(),
            op: Op::default(),
            value: kind.zero(),
            matched: false,
        }
    }

    fn fill(&mut self, key: &str, op: &Op, value: Value) {
        self.key.clear();
        self.key.push_str(key);
        self.op = op.clone();
        self.value = value;
        self.matched = true;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }
}

/// Results of parsing, one [`Sink`] per registered condition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parsed {
    sinks: Vec<Sink>,
}

impl Parsed {
    pub fn get(&self, handle: Handle) -> Option<&Sink> {
        self.sinks.get(handle.0)
    }

    pub fn is_set(&self, handle: Handle) -> bool {
        self.get(handle).map_or(false, Sink::is_matched)
    }

    /// The value of a matched condition
    pub fn value(&self, handle: Handle) -> Option<&Value> {
        self.get(handle)
            .filter(|sink| sink.is_matched())
            .map(Sink::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Sink)> {
        self.sinks.iter().enumerate().map(|(i, s)| (Handle(i), s))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    // conditions registered after this set was created get zero slots
    fn cover(&mut self, conditions: &[Condition]) {
        for cond in conditions.iter().skip(self.sinks.len()) {
            self.sinks.push(Sink::zero(cond.kind));
        }
    }
}

/// # Panics
///
/// Panics if `handle` has no slot here, which happens with a handle from a
/// different [`Parser`]. Use [`Parsed::get`] when that is possible.
impl Index<Handle> for Parsed {
    type Output = Sink;

    fn index(&self, handle: Handle) -> &Sink {
        &self.sinks[handle.0]
    }
}

/// Extracts typed `key operator value` conditions from delimited text.
///
/// Register every condition first, then parse as often as needed; `parse`
/// only reads the registry and may run from several threads at once.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    conditions: Vec<Condition>,
}

impl Parser {
    pub fn new(delimiter: &str) -> Self {
        Parser::with_config(ParserConfig::default().delimiter(delimiter))
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Parser {
            config,
            conditions: Vec::new(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.config.delimiter
    }

    /// Append a condition. Keys match clauses by case-sensitive prefix.
    pub fn register(&mut self, key: impl Into<String>, set: OpSet, kind: Kind) -> Handle {
        let key = key.into();
        debug!(self.config.logger, "register condition";
            "key" => %key, "ops" => %set, "kind" => %kind);

        self.conditions.push(Condition { key, set, kind });
        Handle(self.conditions.len() - 1)
    }

    pub fn text(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::Text)
    }

    pub fn text_list(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::TextList)
    }

    pub fn int(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::Int)
    }

    pub fn int_list(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::IntList)
    }

    pub fn float(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::Float)
    }

    pub fn bool(&mut self, key: impl Into<String>, set: OpSet) -> Handle {
        self.register(key, set, Kind::Bool)
    }

    /// `None` falls back to the configured default zone
    pub fn timestamp(&mut self, key: impl Into<String>, set: OpSet, zone: Option<Zone>) -> Handle {
        let zone = zone.unwrap_or(self.config.default_zone);
        self.register(key, set, Kind::Timestamp(zone))
    }

    pub fn condition(&self, handle: Handle) -> Option<&Condition> {
        self.conditions.get(handle.0)
    }

    pub fn conditions(&self) -> impl Iterator<Item = (Handle, &Condition)> {
        self.conditions.iter().enumerate().map(|(i, c)| (Handle(i), c))
    }

    /// A result set with every condition unmatched
    pub fn results(&self) -> Parsed {
        let mut parsed = Parsed::default();
        parsed.cover(&self.conditions);
        parsed
    }

    /// Parse `text` into a fresh result set.
    ///
    /// On failure the error carries whatever was decoded before it.
    pub fn parse(&self, text: &str) -> Result<Parsed, ParseError> {
        let mut parsed = self.results();
        match self.parse_into(text, &mut parsed) {
            Ok(()) => Ok(parsed),
            Err(e) => Err(e.with_partial(parsed)),
        }
    }

    /// Parse `text`, overwriting the sinks of matched conditions in `parsed`
    /// and leaving the others untouched. Stops at the first decode failure
    /// without rolling back earlier clauses.
    pub fn parse_into(&self, text: &str, parsed: &mut Parsed) -> Result<(), ParseError> {
        parsed.cover(&self.conditions);
        let logger = &self.config.logger;

        for (index, span) in split_spans(text, &self.config.delimiter)
            .into_iter()
            .enumerate()
        {
            let raw = &text[span.clone()];
            let clause = raw.trim();
            let clause_start = span.start + (raw.len() - raw.trim_start().len());
            trace!(logger, "clause"; "index" => index, "text" => clause);

            for (slot, cond) in self.conditions.iter().enumerate() {
                let Some(rest) = clause.strip_prefix(cond.key.as_str()) else {
                    continue;
                };

                // each matched operator is consumed, so later ones test what is left
                let mut rest = rest.trim_start();
                for op in &cond.set {
                    let Some(tail) = rest.strip_prefix(op.as_str()) else {
                        continue;
                    };
                    rest = tail.trim_start();

                    match cond.kind.decode(rest) {
                        Ok(value) => {
                            debug!(logger, "matched condition";
                                "clause" => index, "key" => %cond.key, "op" => %op, "value" => %value);
                            parsed.sinks[slot].fill(&cond.key, op, value);
                        }
                        Err(cause) => {
                            debug!(logger, "decode failed";
                                "clause" => index, "key" => %cond.key, "op" => %op, "error" => %cause);
                            let offset = clause_start + (clause.len() - rest.len());
                            return Err(ParseError::new(
                                &cond.key,
                                op,
                                index,
                                cause,
                                text,
                                (offset, rest.len()).into(),
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
