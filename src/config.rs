use slog::{o, Discard, Logger};

use crate::time::Zone;

/// Parser construction settings
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Clause separator, `&` unless set
    pub delimiter: String,
    /// Zone for timestamp conditions registered without one
    pub default_zone: Zone,
    pub logger: Logger,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            delimiter: "&".to_owned(),
            default_zone: Zone::Utc,
            logger: Logger::root(Discard, o!()),
        }
    }
}

impl ParserConfig {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn default_zone(mut self, zone: Zone) -> Self {
        self.default_zone = zone;
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }
}
