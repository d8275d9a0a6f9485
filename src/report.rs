// src/report.rs

//! Console reporting for a cycle.
//!
//! A cycle prints in two steps:
//! 1. [`Reporter::begin_cycle`]: clear the screen and print a timestamp.
//!    The build step then runs with inherited stdio, so its output lands
//!    right below this header.
//! 2. [`Reporter::report`]: each task's text in slot order, tab-prefixed.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Local, TimeZone};

use crate::exec::TaskResult;

/// ANSI "erase display" followed by "cursor home".
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Local-time timestamp format, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    clear_screen: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(clear_screen: bool) -> Self {
        Self::new(io::stdout(), clear_screen)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, clear_screen: bool) -> Self {
        Self { out, clear_screen }
    }

    /// Clear the console (if enabled) and print the current local time.
    pub fn begin_cycle(&mut self) -> io::Result<()> {
        self.begin_cycle_at(&Local::now())
    }

    pub fn begin_cycle_at<Tz>(&mut self, now: &DateTime<Tz>) -> io::Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.out, "{}", now.format(TIMESTAMP_FORMAT))?;
        self.out.flush()
    }

    /// Print every result's raw text in the order given, each prefixed by a
    /// tab. Results must already be in slot order.
    pub fn report(&mut self, results: &[TaskResult]) -> io::Result<()> {
        for result in results {
            write!(self.out, "\t{}{}", result.stdout, result.stderr)?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::exec::TaskStatus;

    fn result(slot: usize, stdout: &str, stderr: &str) -> TaskResult {
        TaskResult {
            slot,
            label: format!("t{slot}"),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            status: TaskStatus::Exited(Some(0)),
        }
    }

    #[test]
    fn header_clears_then_prints_timestamp() {
        let mut reporter = Reporter::new(Vec::new(), true);
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        reporter.begin_cycle_at(&at).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, format!("{CLEAR_SCREEN}2024-03-09 14:05:07\n"));
    }

    #[test]
    fn header_without_clear() {
        let mut reporter = Reporter::new(Vec::new(), false);
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();

        reporter.begin_cycle_at(&at).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "2024-12-31 23:59:59\n");
    }

    #[test]
    fn results_are_tab_prefixed_and_verbatim() {
        let mut reporter = Reporter::new(Vec::new(), false);
        let results = vec![
            result(0, "Dev\n", ""),
            result(1, "ok\nline two\n", "error: syntax"),
        ];

        reporter.report(&results).unwrap();

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "\tDev\n\tok\nline two\nerror: syntax");
    }
}
