//! Input classification and backend wire-format conversion.
//!
//! The backend accepts timestamps as `YYYY-MM-DDTHH:mm:ssZ` and drops the
//! zone: it keeps the wall-clock components and nothing else. To match that,
//! ISO 8601 and `YYYY-MM-DD HH:mm` dates are re-emitted with the components
//! exactly as the user wrote them and a literal `Z`, so the client's own
//! timezone can never shift them. RFC 2822 dates and relative expressions are
//! sent verbatim.

use tracing::debug;

use crate::absolute::parse_absolute;
use crate::error::ParseError;
use crate::expression::recognize;
use crate::types::{AbsoluteFormat, InputKind, Instant, ANCHOR};

/// `chrono` format string of the wire format.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Convert a user-entered date into the backend wire format.
///
/// Never fails: input that is neither anchored nor a recognized date is
/// returned unchanged and left for validation to report. RFC 2822 dates are
/// returned unchanged too; only ISO 8601 and `YYYY-MM-DD HH:mm` are converted.
///
/// # Examples
///
/// ```
/// use nowexpr_core::to_wire_format;
///
/// assert_eq!(to_wire_format("now-1h"), "now-1h");
/// assert_eq!(to_wire_format("2024-03-05T10:15:00+02:00"), "2024-03-05T10:15:00Z");
/// assert_eq!(to_wire_format("2024-01-01 10:00"), "2024-01-01T10:00:00Z");
/// assert_eq!(
///     to_wire_format("Tue, 5 Mar 2024 10:15:00 +0200"),
///     "Tue, 5 Mar 2024 10:15:00 +0200"
/// );
/// assert_eq!(to_wire_format("not a date"), "not a date");
/// ```
#[must_use]
pub fn to_wire_format(value: &str) -> String {
    if value.starts_with(ANCHOR) {
        return value.to_string();
    }
    match parse_absolute(value) {
        Some(date) if date.format == AbsoluteFormat::Rfc2822 => {
            debug!(value, "Passing RFC 2822 date through unchanged");
            value.to_string()
        }
        Some(date) => format_wire(&date.instant),
        None => {
            debug!(value, "Passing unrecognized date through unchanged");
            value.to_string()
        }
    }
}

/// Format an instant's wall-clock components as a UTC-tagged timestamp.
///
/// Sub-second precision is dropped.
#[must_use]
pub fn format_wire(instant: &Instant) -> String {
    instant.format(WIRE_FORMAT).to_string()
}

/// Decide whether `value` is a relative expression, an absolute date, or
/// neither.
///
/// Absolute dates are checked first, the same order [`crate::evaluate`]
/// uses, so a string is classified exactly as it would be evaluated.
#[must_use]
pub fn classify(value: &str) -> InputKind {
    if let Some(date) = parse_absolute(value) {
        return InputKind::Absolute(date.format);
    }
    match recognize(value) {
        Ok(()) => InputKind::Relative,
        Err(err) => InputKind::Invalid(err),
    }
}

/// Validate a user-entered date before submission.
///
/// # Examples
///
/// ```
/// use nowexpr_core::validate;
///
/// assert!(validate("now-7d/d").is_ok());
/// assert_eq!(validate("now+").unwrap_err().to_string(), "expected number at the end but got nothing");
/// ```
pub fn validate(value: &str) -> Result<(), ParseError> {
    match classify(value) {
        InputKind::Invalid(err) => Err(err),
        InputKind::Relative | InputKind::Absolute(_) => Ok(()),
    }
}

/// Whether two instants fall on the same calendar day.
///
/// A missing second instant counts as the same day.
#[must_use]
pub fn is_same_date(from: &Instant, to: Option<&Instant>) -> bool {
    to.map_or(true, |to| from.date() == to.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Expected;
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> Instant {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_relative_expressions_pass_through() {
        assert_eq!(to_wire_format("now-1h"), "now-1h");
        assert_eq!(to_wire_format("now"), "now");
        // Sent verbatim even when malformed; the anchor decides
        assert_eq!(to_wire_format("now+"), "now+");
    }

    #[test]
    fn test_offset_is_discarded_not_applied() {
        assert_eq!(
            to_wire_format("2024-03-05T10:15:00+02:00"),
            "2024-03-05T10:15:00Z"
        );
        assert_eq!(
            to_wire_format("2024-03-05T23:30:00-08:00"),
            "2024-03-05T23:30:00Z"
        );
    }

    #[test]
    fn test_custom_and_iso_forms_are_normalized() {
        assert_eq!(to_wire_format("2024-01-01 10:00"), "2024-01-01T10:00:00Z");
        assert_eq!(to_wire_format("2024-01-01"), "2024-01-01T00:00:00Z");
        assert_eq!(
            to_wire_format("2024-01-01T10:00:59.999Z"),
            "2024-01-01T10:00:59Z"
        );
    }

    #[test]
    fn test_rfc2822_passes_through() {
        assert_eq!(
            to_wire_format("Tue, 5 Mar 2024 10:15:00 +0200"),
            "Tue, 5 Mar 2024 10:15:00 +0200"
        );
        // Still a valid date for validation
        assert_eq!(validate("Tue, 5 Mar 2024 10:15:00 +0200"), Ok(()));
    }

    #[test]
    fn test_wire_output_keeps_four_digit_year() {
        assert_eq!(to_wire_format("+002024-03-05"), "2024-03-05T00:00:00Z");
        assert_eq!(to_wire_format("+010000-01-01"), "+010000-01-01");
    }

    #[test]
    fn test_non_ascii_digits_fail_open() {
        let input = "2024-0\u{663}0";
        assert_eq!(to_wire_format(input), input);
        assert_eq!(classify(input), InputKind::Invalid(ParseError::UnrecognizedInput));
        assert_eq!(to_wire_format("2024-03-05T10:1\u{663}"), "2024-03-05T10:1\u{663}");
        assert_eq!(to_wire_format("202403"), "202403");
    }

    #[test]
    fn test_unparseable_input_fails_open() {
        assert_eq!(to_wire_format("not a date"), "not a date");
        assert_eq!(to_wire_format("2024-02-30"), "2024-02-30");
        assert_eq!(to_wire_format(""), "");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("now-7d/d"), InputKind::Relative);
        assert_eq!(
            classify("2024-03-05T10:15:00Z"),
            InputKind::Absolute(AbsoluteFormat::Iso8601)
        );
        assert_eq!(
            classify("Tue, 5 Mar 2024 10:15:00 +0200"),
            InputKind::Absolute(AbsoluteFormat::Rfc2822)
        );
        assert_eq!(
            classify("now+1"),
            InputKind::Invalid(ParseError::IncompleteExpression {
                expected: Expected::Unit,
                index: 5
            })
        );
        assert_eq!(
            classify("tomorrow"),
            InputKind::Invalid(ParseError::UnrecognizedInput)
        );
        assert_eq!(
            classify("2 days from now"),
            InputKind::Invalid(ParseError::MisplacedAnchor { index: 12 })
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate("now/w"), Ok(()));
        assert_eq!(validate("2024-01-01 10:00"), Ok(()));
        assert!(validate("now*1d").is_err());
    }

    #[test]
    fn test_is_same_date() {
        let morning = at("2024-03-05 00:00:00");
        let night = at("2024-03-05 23:59:59.999");
        let next = at("2024-03-06 00:00:00");
        assert!(is_same_date(&morning, Some(&night)));
        assert!(!is_same_date(&night, Some(&next)));
        assert!(is_same_date(&morning, None));
    }
}
