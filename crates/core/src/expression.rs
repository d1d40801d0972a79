//! Relative time expressions.
//!
//! An expression is either an absolute date (see [`crate::absolute`]) or the
//! anchor keyword `now` followed by any number of operations:
//!
//! - `/d` rounds to the start (or end) of the current day
//! - `+2w` moves two weeks forward
//! - `-7d/d` moves seven days back, then rounds to the day
//!
//! Operations apply left to right. The anchor is always passed in by the
//! caller; nothing in here reads the system clock.

use tracing::{debug, trace};

use crate::absolute::parse_absolute;
use crate::calendar;
use crate::error::ParseError;
use crate::scanner::{transition, Scanner, State, Step};
use crate::types::{EvalOptions, Instant, ParseOutcome, Token, TruncationMode, ANCHOR};

/// Evaluate `expression` against `anchor` with default options.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use nowexpr_core::{evaluate, TruncationMode};
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 3, 15)
///     .unwrap()
///     .and_hms_opt(14, 30, 0)
///     .unwrap();
///
/// let start = evaluate("now-7d/d", TruncationMode::StartOf, anchor).unwrap();
/// assert_eq!(start.to_string(), "2024-03-08 00:00:00");
///
/// let err = evaluate("now*1d", TruncationMode::StartOf, anchor).unwrap_err();
/// assert_eq!(err.index(), 3);
/// ```
pub fn evaluate(expression: &str, mode: TruncationMode, anchor: Instant) -> ParseOutcome {
    evaluate_with(expression, mode, anchor, &EvalOptions::default())
}

/// Evaluate `expression` against `anchor`.
pub fn evaluate_with(
    expression: &str,
    mode: TruncationMode,
    anchor: Instant,
    options: &EvalOptions,
) -> ParseOutcome {
    if let Some(date) = parse_absolute(expression) {
        return Ok(date.instant);
    }

    let body = anchored_body(expression)?;
    let mut instant = anchor;
    drive(body, |token, step| {
        if let Some(step) = step {
            instant = calendar::apply(instant, step, mode, options)
                .ok_or(ParseError::OutOfRange { index: token.index })?;
            trace!(?step, %instant, "Applied step");
        }
        Ok(())
    })
    .inspect_err(|err| debug!(expression, error = %err, "Evaluation failed"))?;

    debug!(expression, %anchor, %instant, ?mode, "Evaluated expression");
    Ok(instant)
}

/// Check that `expression` is a well-formed anchored expression.
///
/// Absolute dates are not considered here; see
/// [`crate::normalize::classify`] for the combined check.
pub fn recognize(expression: &str) -> Result<(), ParseError> {
    let body = anchored_body(expression)?;
    drive(body, |_, _| Ok(()))
}

/// Split an anchored expression into its tokens.
///
/// The anchor keyword itself is not returned as a token.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, ParseError> {
    let body = anchored_body(expression)?;
    let mut tokens = Vec::new();
    drive(body, |token, _| {
        tokens.push(token.clone());
        Ok(())
    })?;
    Ok(tokens)
}

/// Strip the anchor keyword, or explain why the input has none.
fn anchored_body(expression: &str) -> Result<&str, ParseError> {
    if let Some(body) = expression.strip_prefix(ANCHOR) {
        return Ok(body);
    }
    match expression.find(ANCHOR) {
        Some(byte) => Err(ParseError::MisplacedAnchor {
            index: expression[..byte].chars().count(),
        }),
        None => Err(ParseError::UnrecognizedInput),
    }
}

/// Run the state machine over `body`, handing every accepted token and the
/// step it completes to `on_token`.
fn drive<F>(body: &str, mut on_token: F) -> Result<(), ParseError>
where
    F: FnMut(&Token, Option<Step>) -> Result<(), ParseError>,
{
    let mut scanner = Scanner::new(body, ANCHOR.len());
    let mut state = State::ExpectOperation;

    while let Some(token) = scanner.next_token(state.expected()) {
        let token = token?;
        let (next, step) = transition(state, &token)?;
        trace!(?state, ?next, text = %token.text, index = token.index, "Transition");
        on_token(&token, step)?;
        state = next;
    }

    state.finish(scanner.index())
}
