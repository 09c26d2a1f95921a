//! Configuration for the chart parser

use crate::error::GrammarError;

/// How much of the chart is dumped through `tracing` while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DebugLevel {
    /// No chart dumps
    #[default]
    Silent,
    /// Dump the chart once, after the last column
    Final,
    /// Dump the chart after every column
    EveryColumn,
}

impl TryFrom<u8> for DebugLevel {
    type Error = GrammarError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Silent),
            1 => Ok(Self::Final),
            2 => Ok(Self::EveryColumn),
            other => Err(GrammarError::InvalidDebugLevel(other)),
        }
    }
}

impl From<DebugLevel> for u8 {
    fn from(level: DebugLevel) -> Self {
        match level {
            DebugLevel::Silent => 0,
            DebugLevel::Final => 1,
            DebugLevel::EveryColumn => 2,
        }
    }
}

/// Configuration options for the chart parser
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Chart dump verbosity. Has no effect on parse results.
    pub debug: DebugLevel,
}

impl ParserConfig {
    /// Create a new configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart dump verbosity
    #[must_use]
    pub const fn with_debug(mut self, level: DebugLevel) -> Self {
        self.debug = level;
        self
    }
}
