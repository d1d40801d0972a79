//! nowexpr Core
//!
//! Relative time expressions such as `now-7d/d` or `now+2w`, absolute date
//! recognition, and conversion of user-entered dates into the timestamp
//! format a zone-stripping backend expects.
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use nowexpr_core::{evaluate, TruncationMode};
//!
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 15)
//!     .unwrap()
//!     .and_hms_opt(14, 30, 0)
//!     .unwrap();
//!
//! // Start and end of yesterday
//! let from = evaluate("now-1d/d", TruncationMode::StartOf, anchor).unwrap();
//! let to = evaluate("now-1d/d", TruncationMode::EndOf, anchor).unwrap();
//! assert_eq!(from.to_string(), "2024-03-14 00:00:00");
//! assert_eq!(to.to_string(), "2024-03-14 23:59:59.999");
//! ```
//!
//! # Preparing Input for the Backend
//!
//! ```
//! use nowexpr_core::{classify, to_wire_format, InputKind};
//!
//! assert_eq!(classify("now/w"), InputKind::Relative);
//! assert_eq!(to_wire_format("now/w"), "now/w");
//! assert_eq!(to_wire_format("2024-03-05T10:15:00+02:00"), "2024-03-05T10:15:00Z");
//! ```

pub mod absolute;
pub mod calendar;
pub mod error;
pub mod expression;
pub mod normalize;
pub mod scanner;
pub mod types;

pub use absolute::{is_valid_date, parse_absolute, AbsoluteDate};
pub use error::{Expected, ParseError};
pub use expression::{evaluate, evaluate_with, recognize, tokenize};
pub use normalize::{classify, format_wire, is_same_date, to_wire_format, validate, WIRE_FORMAT};
pub use types::*;
