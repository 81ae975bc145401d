//! The console outputter.

use super::{abs::Outputter, err};
use crate::model::{
    report::{self, Report, Tally},
    PhaseOutcome, Verdict,
};
use colored::Colorize;
use std::io::{self, Write};

/// An outputter that prints one line per test, the record of each failing
/// phase beneath it, and a tally.
pub struct Console<W: Write> {
    w: tabwriter::TabWriter<W>,
}

impl<W: Write> Outputter for Console<W> {
    fn output(mut self: Box<Self>, report: Report) -> err::Result<()> {
        for test in &report.tests {
            self.dump_test(test)?;
        }
        self.w.flush()?;
        let mut w = self.w.into_inner().map_err(|e| try_clone_error(e.error()))?;
        dump_tally(&mut w, report.tally, report.halted)?;
        w.flush()?;
        Ok(())
    }
}

impl<W: Write> Console<W> {
    /// Constructs a new console writer.
    pub fn new(writer: W) -> Self {
        Self {
            w: tabwriter::TabWriter::new(writer).padding(1),
        }
    }

    fn dump_test(&mut self, test: &report::Test) -> io::Result<()> {
        writeln!(
            self.w,
            "{sigil}>\t{verdict}\t{name}\t{location}",
            sigil = verdict_sigil(test.verdict),
            verdict = test.verdict,
            name = test.identity.name,
            location = test.identity.location,
        )?;
        for p in test.problems() {
            if let Some(r) = p.outcome.record() {
                writeln!(
                    self.w,
                    "\t{phase}\t{kind}\t{location}\t{message}",
                    phase = p.phase,
                    kind = outcome_label(&p.outcome),
                    location = r.location,
                    message = r.message,
                )?;
            }
        }
        Ok(())
    }
}

fn dump_tally(w: &mut impl Write, tally: Tally, halted: bool) -> io::Result<()> {
    writeln!(
        w,
        "\n{} passed, {} failed, {} ignored ({} total){}",
        tally.passed.to_string().green(),
        tally.failed.to_string().red(),
        tally.ignored.to_string().yellow(),
        tally.total(),
        if halted { ", halted early" } else { "" },
    )
}

fn verdict_sigil(v: Verdict) -> colored::ColoredString {
    match v {
        Verdict::Pass => "*".green(),
        Verdict::Fail => ":".red(),
        Verdict::Ignored => "-".yellow(),
    }
}

fn outcome_label(o: &PhaseOutcome) -> colored::ColoredString {
    match o {
        PhaseOutcome::Failure(_) => "failure".red(),
        PhaseOutcome::Error(_) => "error".magenta(),
        PhaseOutcome::Success => "success".green(),
    }
}

/// Tries to copy as much of `e` as possible into a new error.
fn try_clone_error(e: &io::Error) -> io::Error {
    let kind = e.kind();
    if let Some(os_err) = e.raw_os_error() {
        io::Error::from_raw_os_error(os_err)
    } else {
        io::Error::from(kind)
    }
}
