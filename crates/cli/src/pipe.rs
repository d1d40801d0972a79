//! Pipe mode for processing stdin line by line.
//!
//! Every non-empty line is one input, processed and printed as soon as it is
//! read so `tail -f` style producers work.

use std::io::{self, BufRead, Write};

use crate::Session;

/// Run pipe mode, processing stdin line by line.
///
/// Returns `false` if any line failed.
pub fn run_pipe_mode(session: &Session) -> io::Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let handle = stdin.lock();
    let mut out = stdout.lock();

    process_lines(handle, &mut out, session)
}

fn process_lines(reader: impl BufRead, out: &mut impl Write, session: &Session) -> io::Result<bool> {
    let mut all_ok = true;

    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        all_ok &= session.run(&line, out)?;
        out.flush()?;
    }

    Ok(all_ok)
}
