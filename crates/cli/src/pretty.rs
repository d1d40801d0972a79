//! Human-readable rendering of results.
//!
//! Colors:
//! - Inputs: cyan
//! - Results: bold green
//! - Token kinds and classifications: blue
//! - Errors and the caret under the offending character: red

use colored::{Color, Colorize};
use nowexpr_core::{InputKind, Token, TokenKind};
use unicode_width::UnicodeWidthStr;

use crate::{Outcome, Report};

/// Configuration for pretty printing.
#[derive(Debug, Clone, Copy)]
pub struct PrettyConfig {
    /// Enable colored output.
    pub color: bool,
    /// Indent string (usually 2 spaces).
    pub indent: &'static str,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            color: true,
            indent: "  ",
        }
    }
}

/// Render one report, newline-terminated.
pub fn render(report: &Report<'_>, config: &PrettyConfig) -> String {
    let input = colorize(report.input, Color::Cyan, config.color);
    match &report.outcome {
        Outcome::Evaluated { instant, .. } | Outcome::Wire { wire: instant } => {
            format!("{} → {}\n", input, result(instant, config))
        }
        Outcome::Checked { classification } => {
            format!("{} ✓ {}\n", input, describe(classification, config))
        }
        Outcome::Tokens { tokens } => {
            let mut output = format!("{}\n", input);
            for token in tokens {
                output.push_str(&format_token(token, config));
            }
            output
        }
        Outcome::Failed { message, error } => {
            format_error(report.input, message, error.index(), config)
        }
    }
}

fn result(text: &str, config: &PrettyConfig) -> String {
    if config.color {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

fn describe(kind: &InputKind, config: &PrettyConfig) -> String {
    let text = match kind {
        InputKind::Relative => "relative expression".to_string(),
        InputKind::Absolute(format) => format!("absolute date ({})", format),
        // Reported as a failure before rendering
        InputKind::Invalid(err) => err.to_string(),
    };
    colorize(&text, Color::Blue, config.color)
}

fn format_token(token: &Token, config: &PrettyConfig) -> String {
    let kind = match token.kind {
        TokenKind::Operation => "operation",
        TokenKind::Value => "value",
        TokenKind::Unit => "unit",
    };
    format!(
        "{}{:>3}  {}  {}\n",
        config.indent,
        token.index,
        colorize(&format!("{:<9}", kind), Color::Blue, config.color),
        token.text
    )
}

/// Render an error message followed by the input with a caret under `index`.
fn format_error(input: &str, message: &str, index: usize, config: &PrettyConfig) -> String {
    let label = if config.color {
        "error".red().bold().to_string()
    } else {
        "error".to_string()
    };
    let prefix: String = input.chars().take(index).collect();
    let padding = " ".repeat(prefix.width());
    format!(
        "{}: {}\n{}{}\n{}{}{}\n",
        label,
        message,
        config.indent,
        input,
        config.indent,
        padding,
        colorize("^", Color::Red, config.color)
    )
}

fn colorize(s: &str, color: Color, enabled: bool) -> String {
    if enabled {
        s.color(color).to_string()
    } else {
        s.to_string()
    }
}
