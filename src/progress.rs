// src/progress.rs
use std::io::{self, IsTerminal, Write};

use crate::roster::Player;
use crate::runner::PlayerResult;

/// Lightweight progress reporting for a run.
/// The CLI prints result blocks; tests can collect or ignore them.
pub trait Progress {
    /// Called at the start with the number of players this process will evaluate.
    fn begin(&mut self, _total: usize) {}

    /// One player finished. `number` is 1-based roster position.
    fn player_done(&mut self, _number: usize, _player: &Player, _result: &PlayerResult) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RULE: &str = "-----------------------------------";

/// Per-player result blocks on a writer (stdout for the CLI).
pub struct ConsoleProgress<W: Write> {
    out: W,
    color: bool,
    column: String,
}

impl ConsoleProgress<io::Stdout> {
    /// Colored only when stdout is a terminal.
    pub fn stdout(column: &str) -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self::new(out, color, column)
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W, color: bool, column: &str) -> Self {
        Self { out, color, column: column.to_string() }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn verdict(&self, passed: bool) -> String {
        let word = if passed { "PASS" } else { "FAIL" };
        if !self.color {
            return word.to_string();
        }
        let color = if passed { GREEN } else { RED };
        format!("{color}{BOLD}{word}{RESET}")
    }

    fn write_block(&mut self, number: usize, player: &Player, result: &PlayerResult) -> io::Result<()> {
        let id = player.site_id.map_or_else(|| "no id".to_string(), |id| id.to_string());
        let verdict = self.verdict(result.passed);
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "{number}. {} ({id})", result.name)?;
        match (&result.average, &result.error) {
            (Some(avg), _) => writeln!(self.out, "   - {} Average: {avg:.2}", self.column)?,
            (None, Some(err)) => writeln!(self.out, "   - Error: {err}")?,
            (None, None) => {}
        }
        writeln!(self.out, "   - Result: {verdict}")?;
        writeln!(self.out, "{RULE}")?;
        self.out.flush()
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn begin(&mut self, total: usize) {
        let _ = writeln!(self.out, "\n===== STARTING TEST WITH {total} PLAYERS =====\n");
    }

    fn player_done(&mut self, number: usize, player: &Player, result: &PlayerResult) {
        // Console output is best-effort; a closed pipe must not fail the run.
        let _ = self.write_block(number, player, result);
    }
}
