//! Error taxonomy for expression parsing.
//!
//! Malformed input is an expected outcome, so every failure is a value that
//! carries a display-ready message and the character index it refers to.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token kind the scanner was waiting for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// One of `/ + -`
    Operation,
    /// An ASCII digit
    Number,
    /// One of `y M w d h m s`
    Unit,
}

impl Expected {
    /// Characters that would have been accepted.
    #[must_use]
    pub fn symbols(self) -> &'static [char] {
        match self {
            Self::Operation => &['/', '+', '-'],
            Self::Number => &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'],
            Self::Unit => &['y', 'M', 'w', 'd', 'h', 'm', 's'],
        }
    }

    /// Short name used in end-of-input messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::Number => "number",
            Self::Unit => "unit",
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation => write!(f, "one of / + -"),
            Self::Number => write!(f, "number"),
            Self::Unit => write!(f, "unit (y,M,w,d,h,m,s)"),
        }
    }
}

/// Why an input could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    /// The character at `index` is not the token kind the grammar needs there.
    #[error("expected {expected} at index {index} but was {found}")]
    UnexpectedToken {
        expected: Expected,
        found: char,
        index: usize,
    },

    /// Input ended after an operation symbol or a number.
    #[error("expected {} at the end but got nothing", .expected.name())]
    IncompleteExpression { expected: Expected, index: usize },

    /// The anchor keyword appears, but not as the first three characters.
    #[error("'now' must be at the start")]
    MisplacedAnchor { index: usize },

    /// Neither an anchored expression nor a recognized absolute date.
    #[error("expected valid date or 'now' at index 0")]
    UnrecognizedInput,

    /// A number or the resulting date does not fit the calendar range.
    #[error("value at index {index} is out of range")]
    OutOfRange { index: usize },
}

impl ParseError {
    /// Character index the error points at.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::UnexpectedToken { index, .. }
            | Self::IncompleteExpression { index, .. }
            | Self::MisplacedAnchor { index }
            | Self::OutOfRange { index } => *index,
            Self::UnrecognizedInput => 0,
        }
    }
}
