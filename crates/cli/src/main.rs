mod config;
mod pipe;
mod pretty;

use config::Config;

use std::io::{self, IsTerminal, Write};

use chrono::{Local, Weekday};
use clap::{CommandFactory, Parser};
use colored::{control::set_override, Colorize};
use nowexpr_core::{
    classify, evaluate_with, format_wire, parse_absolute, to_wire_format, tokenize, EvalOptions,
    InputKind, Instant, ParseError, Token, TruncationMode,
};
use serde::Serialize;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::pretty::PrettyConfig;

const LONG_ABOUT: &str = r##"
nowexpr evaluates relative time expressions like the ones dashboards use for
time ranges, and converts absolute dates to the backend wire format.

SYNTAX:
  now               The anchor (current time, or --anchor)
  now-7d            Seven days ago
  now+2w            Two weeks from now
  now/d             Start of today (end of today with --end)
  now-1M/M          Start of last month
  now/d+8h          8am today

  Units:  y (year)  M (month)  w (week)  d (day)  h (hour)  m (minute)  s (second)
  Operations apply left to right. Units are case-sensitive.

ABSOLUTE DATES:
  RFC 2822:         Tue, 5 Mar 2024 10:15:00 +0200
  ISO 8601:         2024-03-05T10:15:00+02:00, 2024-03-05, 2024-W10-2
  Plain:            2024-03-05 10:15

EXAMPLES:
  nowexpr now-1d/d                    Start of yesterday
  nowexpr --end now-1d/d              End of yesterday
  nowexpr now-1d/d now/d              Several inputs at once
  nowexpr --wire 2024-03-05T10:15:00+02:00
                                      2024-03-05T10:15:00Z
  nowexpr --check 'now+'              Validate without evaluating
  nowexpr --tokens now-12h/d          Show the token stream

PIPED INPUT:
  With no INPUT arguments, each non-empty stdin line is an input:
    printf 'now/d\nnow-1w/w\n' | nowexpr --json

CONFIGURATION:
  Settings can be configured via CLI flags, environment variables, or config file.
  Precedence: CLI args > Environment vars > Config file > Defaults

  Setting      | CLI flag         | Env var             | Default
  -------------|------------------|---------------------|---------
  week_start   | --week-start     | NOWEXPR_WEEK_START  | sun
  mode         | -e, --end        | NOWEXPR_MODE        | start
  no_color     | -C, --no-color   | NOWEXPR_NO_COLOR    | false

  Config file location: nowexpr --config-path
  Generate default config: nowexpr --config-init

  Note: NO_COLOR env var is also respected (https://no-color.org/)"##;

#[derive(Parser)]
#[command(name = "nowexpr")]
#[command(version)]
#[command(about = "Evaluate relative time expressions like now-7d/d")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Expressions or dates to process
    ///
    /// Reads one input per stdin line when omitted and stdin is piped.
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Round /unit operations to the end of the unit instead of the start
    #[arg(long, short = 'e')]
    end: bool,

    /// Evaluate against this date instead of the current time
    #[arg(long, value_name = "DATE")]
    anchor: Option<String>,

    /// Print the backend wire format instead of evaluating
    #[arg(long, short = 'w', conflicts_with_all = ["check", "tokens"])]
    wire: bool,

    /// Only validate and classify the input
    #[arg(long, conflicts_with = "tokens")]
    check: bool,

    /// Print the token stream of a relative expression
    #[arg(long)]
    tokens: bool,

    /// Output results as JSON, one object per input
    #[arg(long, short = 'j')]
    json: bool,

    /// First day of the week for /w (sun, mon, ...)
    #[arg(long, value_name = "DAY")]
    week_start: Option<Weekday>,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows every parser transition.
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

/// What to do with each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Evaluate,
    Wire,
    Check,
    Tokens,
}

/// Result for one input, as printed by `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    input: &'a str,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome {
    Evaluated {
        instant: String,
        wire: String,
        mode: TruncationMode,
    },
    Wire {
        wire: String,
    },
    Checked {
        classification: InputKind,
    },
    Tokens {
        tokens: Vec<Token>,
    },
    Failed {
        message: String,
        error: ParseError,
    },
}

impl Outcome {
    fn failed(error: ParseError) -> Self {
        Self::Failed {
            message: error.to_string(),
            error,
        }
    }

    fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Settings shared by every input of one invocation.
struct Session {
    action: Action,
    mode: TruncationMode,
    anchor: Instant,
    options: EvalOptions,
    json: bool,
    pretty: PrettyConfig,
}

impl Session {
    fn outcome(&self, input: &str) -> Outcome {
        match self.action {
            Action::Evaluate => {
                match evaluate_with(input, self.mode, self.anchor, &self.options) {
                    Ok(instant) => Outcome::Evaluated {
                        instant: instant.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                        wire: format_wire(&instant),
                        mode: self.mode,
                    },
                    Err(err) => Outcome::failed(err),
                }
            }
            Action::Wire => Outcome::Wire {
                wire: to_wire_format(input),
            },
            Action::Check => match classify(input) {
                InputKind::Invalid(err) => Outcome::failed(err),
                classification => Outcome::Checked { classification },
            },
            Action::Tokens => match tokenize(input) {
                Ok(tokens) => Outcome::Tokens { tokens },
                Err(err) => Outcome::failed(err),
            },
        }
    }

    /// Process one input and print the result. Returns whether it succeeded.
    fn run(&self, input: &str, out: &mut impl Write) -> io::Result<bool> {
        let report = Report {
            input,
            outcome: self.outcome(input),
        };
        let success = report.outcome.is_success();

        if self.json {
            let line = serde_json::to_string(&report).map_err(io::Error::other)?;
            writeln!(out, "{}", line)?;
        } else {
            write!(out, "{}", pretty::render(&report, &self.pretty))?;
        }

        Ok(success)
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => fail("Cannot determine config directory"),
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => fail(e),
        }
        return;
    }

    // Initialize tracing based on verbosity level (before config loading for logging)
    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file and merge with CLI args
    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let mode = if cli.end {
        tracing::debug!("mode = end (from CLI)");
        TruncationMode::EndOf
    } else {
        let m = file_config.mode();
        let source = if std::env::var("NOWEXPR_MODE").is_ok() {
            "env NOWEXPR_MODE"
        } else if file_config.mode.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("mode = {} (from {})", m, source);
        m
    };

    let week_start = if let Some(day) = cli.week_start {
        tracing::debug!("week_start = {} (from CLI)", day);
        day
    } else {
        let day = file_config.week_start();
        let source = if std::env::var("NOWEXPR_WEEK_START").is_ok() {
            "env NOWEXPR_WEEK_START"
        } else if file_config.week_start.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("week_start = {} (from {})", day, source);
        day
    };

    let no_color = if cli.no_color {
        tracing::debug!("no_color = true (from CLI)");
        true
    } else {
        let nc = file_config.no_color();
        if nc {
            let source = if std::env::var("NO_COLOR").is_ok() {
                "env NO_COLOR"
            } else if std::env::var("NOWEXPR_NO_COLOR").is_ok() {
                "env NOWEXPR_NO_COLOR"
            } else {
                "config file"
            };
            tracing::debug!("no_color = true (from {})", source);
        }
        nc
    };
    if no_color {
        set_override(false);
    }

    let anchor = match cli.anchor.as_deref() {
        Some(text) => match parse_absolute(text) {
            Some(date) => {
                tracing::debug!("anchor = {} (from CLI)", date.instant);
                date.instant
            }
            None => fail(format!("Invalid anchor date: {}", text)),
        },
        None => Local::now().naive_local(),
    };

    let action = if cli.wire {
        Action::Wire
    } else if cli.check {
        Action::Check
    } else if cli.tokens {
        Action::Tokens
    } else {
        Action::Evaluate
    };

    let session = Session {
        action,
        mode,
        anchor,
        options: EvalOptions::default().with_week_start(week_start),
        json: cli.json,
        pretty: PrettyConfig {
            color: !no_color,
            ..Default::default()
        },
    };

    let result = if !cli.inputs.is_empty() {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        cli.inputs.iter().try_fold(true, |ok, input| {
            Ok::<_, io::Error>(session.run(input, &mut out)? && ok)
        })
    } else if !io::stdin().is_terminal() {
        pipe::run_pipe_mode(&session)
    } else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        // Closed stdout (e.g. piped into `head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    pub(crate) fn session(action: Action, json: bool) -> Session {
        Session {
            action,
            mode: TruncationMode::StartOf,
            anchor: NaiveDateTime::parse_from_str("2024-03-15 14:30:45", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            options: EvalOptions::default(),
            json,
            pretty: PrettyConfig {
                color: false,
                ..Default::default()
            },
        }
    }

    fn json_for(action: Action, input: &str) -> (bool, serde_json::Value) {
        let mut out = Vec::new();
        let ok = session(action, true).run(input, &mut out).unwrap();
        (ok, serde_json::from_slice(&out).unwrap())
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_evaluate_json() {
        let (ok, value) = json_for(Action::Evaluate, "now-1d/d");
        assert!(ok);
        assert_eq!(value["input"], "now-1d/d");
        assert_eq!(value["status"], "evaluated");
        assert_eq!(value["instant"], "2024-03-14 00:00:00.000");
        assert_eq!(value["wire"], "2024-03-14T00:00:00Z");
        assert_eq!(value["mode"], "start_of");
    }

    #[test]
    fn test_failure_json() {
        let (ok, value) = json_for(Action::Evaluate, "now*1d");
        assert!(!ok);
        assert_eq!(value["status"], "failed");
        assert_eq!(value["message"], "expected one of / + - at index 3 but was *");
        assert_eq!(value["error"]["kind"], "unexpected_token");
        assert_eq!(value["error"]["index"], 3);
    }

    #[test]
    fn test_wire_never_fails() {
        let (ok, value) = json_for(Action::Wire, "not a date");
        assert!(ok);
        assert_eq!(value["wire"], "not a date");

        let (_, value) = json_for(Action::Wire, "2024-03-05T10:15:00+02:00");
        assert_eq!(value["wire"], "2024-03-05T10:15:00Z");
    }

    #[test]
    fn test_check_json() {
        let (ok, value) = json_for(Action::Check, "2024-03-05");
        assert!(ok);
        assert_eq!(value["classification"]["kind"], "absolute");
        assert_eq!(value["classification"]["detail"], "iso8601");

        let (ok, value) = json_for(Action::Check, "now+");
        assert!(!ok);
        assert_eq!(value["error"]["kind"], "incomplete_expression");
    }

    #[test]
    fn test_tokens_json() {
        let (ok, value) = json_for(Action::Tokens, "now+2w");
        assert!(ok);
        assert_eq!(value["tokens"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["tokens"][1]["text"], "2");
    }
}
