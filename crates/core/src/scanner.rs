//! Single-pass scanner for the relative expression grammar.
//!
//! ```text
//! relative_expr := "now" { operation }
//! operation     := "/" unit | ("+" | "-") integer unit
//! unit          := "y" | "M" | "w" | "d" | "h" | "m" | "s"
//! integer       := one or more ASCII digits
//! ```
//!
//! [`Scanner`] splits the text after the anchor into tokens; [`transition`]
//! is the state machine that decides whether a token is acceptable and which
//! [`Step`] it completes. The two are kept apart so every transition can be
//! tested without going through a string.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Expected, ParseError};
use crate::types::{Operation, Token, TokenKind, Unit};

/// Direction of an arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// An operation that has seen its symbol (and number) but not its unit yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Divide,
    Shift { sign: Sign, amount: u64 },
}

/// A complete operation, ready to be applied to the running instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Round to the start or end of `unit`.
    Truncate(Unit),
    /// Move by `amount` units in the direction of `sign`.
    Shift { sign: Sign, amount: u64, unit: Unit },
}

/// Scanner state: which token kind is acceptable next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    ExpectOperation,
    ExpectValue { sign: Sign },
    ExpectUnit { pending: Pending },
}

impl State {
    /// Token kind this state accepts.
    #[must_use]
    pub fn expected(self) -> Expected {
        match self {
            Self::ExpectOperation => Expected::Operation,
            Self::ExpectValue { .. } => Expected::Number,
            Self::ExpectUnit { .. } => Expected::Unit,
        }
    }

    /// Check that input may end in this state. `index` is the input length.
    pub fn finish(self, index: usize) -> Result<(), ParseError> {
        match self {
            Self::ExpectOperation => Ok(()),
            Self::ExpectValue { .. } | Self::ExpectUnit { .. } => {
                Err(ParseError::IncompleteExpression {
                    expected: self.expected(),
                    index,
                })
            }
        }
    }

    fn reject(self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            expected: self.expected(),
            found: token.first_char(),
            index: token.index,
        }
    }
}

/// Feed one token to the state machine.
///
/// Returns the next state and, when the token is a unit closing an
/// operation, the step to apply.
pub fn transition(state: State, token: &Token) -> Result<(State, Option<Step>), ParseError> {
    match (state, token.kind) {
        (State::ExpectOperation, TokenKind::Operation) => {
            let next = match Operation::from_char(token.first_char()) {
                Some(Operation::Divide) => State::ExpectUnit {
                    pending: Pending::Divide,
                },
                Some(Operation::Add) => State::ExpectValue { sign: Sign::Plus },
                Some(Operation::Subtract) => State::ExpectValue { sign: Sign::Minus },
                None => return Err(state.reject(token)),
            };
            Ok((next, None))
        }
        (State::ExpectValue { sign }, TokenKind::Value) => {
            let amount = token
                .text
                .parse::<u64>()
                .map_err(|_| ParseError::OutOfRange { index: token.index })?;
            Ok((
                State::ExpectUnit {
                    pending: Pending::Shift { sign, amount },
                },
                None,
            ))
        }
        (State::ExpectUnit { pending }, TokenKind::Unit) => {
            let unit = Unit::from_char(token.first_char()).ok_or_else(|| state.reject(token))?;
            let step = match pending {
                Pending::Divide => Step::Truncate(unit),
                Pending::Shift { sign, amount } => Step::Shift { sign, amount, unit },
            };
            Ok((State::ExpectOperation, Some(step)))
        }
        _ => Err(state.reject(token)),
    }
}

/// Splits the text after the anchor keyword into tokens.
///
/// Digits are read greedily into one value token; operation symbols and unit
/// letters are single-character tokens.
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    index: usize,
}

impl<'a> Scanner<'a> {
    /// `offset` is the character index of the first character of `body`
    /// within the whole expression.
    #[must_use]
    pub fn new(body: &'a str, offset: usize) -> Self {
        Self {
            chars: body.chars().peekable(),
            index: offset,
        }
    }

    /// Character index of the next unread character.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read the next token. `expected` is only used to describe a character
    /// that cannot start any token.
    pub fn next_token(&mut self, expected: Expected) -> Option<Result<Token, ParseError>> {
        let ch = *self.chars.peek()?;
        let index = self.index;

        let kind = if Operation::from_char(ch).is_some() {
            TokenKind::Operation
        } else if Unit::from_char(ch).is_some() {
            TokenKind::Unit
        } else if ch.is_ascii_digit() {
            TokenKind::Value
        } else {
            return Some(Err(ParseError::UnexpectedToken {
                expected,
                found: ch,
                index,
            }));
        };

        let mut text = String::new();
        if kind == TokenKind::Value {
            while let Some(digit) = self.chars.next_if(char::is_ascii_digit) {
                text.push(digit);
            }
        } else {
            text.push(ch);
            self.chars.next();
        }
        self.index += text.chars().count();

        Some(Ok(Token { kind, text, index }))
    }
}
