//! Core types for nowexpr.
//!
//! These types are shared by the expression scanner, the absolute-date
//! recognizer and the normalizer.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// An absolute point in time without timezone identity.
///
/// Year, month, day, hour, minute and second are kept exactly as they were
/// written or computed; nothing here ever converts between zones.
pub type Instant = NaiveDateTime;

/// Result of evaluating an expression.
pub type ParseOutcome = Result<Instant, ParseError>;

/// Keyword standing for the caller-supplied anchor instant.
pub const ANCHOR: &str = "now";

/// Calendar unit of a relative expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    /// All units, largest first.
    pub const ALL: [Unit; 7] = [
        Unit::Year,
        Unit::Month,
        Unit::Week,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
    ];

    /// Look up a unit by its letter. Case-sensitive: `M` is month, `m` is minute.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Year),
            'M' => Some(Self::Month),
            'w' => Some(Self::Week),
            'd' => Some(Self::Day),
            'h' => Some(Self::Hour),
            'm' => Some(Self::Minute),
            's' => Some(Self::Second),
            _ => None,
        }
    }

    /// The letter used for this unit in expressions.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Year => 'y',
            Self::Month => 'M',
            Self::Week => 'w',
            Self::Day => 'd',
            Self::Hour => 'h',
            Self::Minute => 'm',
            Self::Second => 's',
        }
    }

    /// Human-readable name (e.g. "day").
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Operation symbol of a relative expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `/` - truncate to a unit boundary
    Divide,
    /// `+`
    Add,
    /// `-`
    Subtract,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Divide, Operation::Add, Operation::Subtract];

    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '/' => Some(Self::Divide),
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Divide => '/',
            Self::Add => '+',
            Self::Subtract => '-',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Which boundary a divide operation rounds to.
///
/// The mode is chosen once per evaluation and applies to every `/unit` in the
/// expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationMode {
    #[default]
    StartOf,
    EndOf,
}

impl FromStr for TruncationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "startof" | "start_of" | "start-of" => Ok(Self::StartOf),
            "end" | "endof" | "end_of" | "end-of" => Ok(Self::EndOf),
            other => Err(format!(
                "unknown truncation mode '{}', expected 'start' or 'end'",
                other
            )),
        }
    }
}

impl fmt::Display for TruncationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOf => write!(f, "start"),
            Self::EndOf => write!(f, "end"),
        }
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Operation,
    Value,
    Unit,
}

/// One lexical unit of a relative expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw characters of the token (a run of digits for values).
    pub text: String,
    /// Character index of the first character, counted from the start of the
    /// whole expression (the anchor keyword included).
    pub index: usize,
}

impl Token {
    /// First character of the token. Tokens are never empty.
    #[must_use]
    pub fn first_char(&self) -> char {
        self.text.chars().next().unwrap_or_default()
    }
}

/// Which absolute-date rule recognized an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsoluteFormat {
    /// RFC 2822 (e.g. `Tue, 5 Mar 2024 10:15:00 +0200`)
    Rfc2822,
    /// ISO 8601 (e.g. `2024-03-05T10:15:00+02:00`)
    Iso8601,
    /// `YYYY-MM-DD HH:mm`
    Custom,
}

impl fmt::Display for AbsoluteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfc2822 => write!(f, "RFC 2822"),
            Self::Iso8601 => write!(f, "ISO 8601"),
            Self::Custom => write!(f, "YYYY-MM-DD HH:mm"),
        }
    }
}

/// Classification of a free-text date input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InputKind {
    /// An anchored expression such as `now-7d/d`.
    Relative,
    /// A concrete date in one of the recognized formats.
    Absolute(AbsoluteFormat),
    /// Neither; carries the error the evaluator would report.
    Invalid(ParseError),
}

impl InputKind {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

/// Calendar settings that influence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalOptions {
    /// First day of the week for `/w` truncation.
    pub week_start: Weekday,
}

impl EvalOptions {
    #[must_use]
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
        }
    }
}
