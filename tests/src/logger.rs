use std::io::{self, IsTerminal, StderrLock, Write};
use std::time::{Duration, Instant};

use crate::collect::Test;

/// What the checks found wrong with one document.
pub struct Report {
    /// One line per failed check. Empty if the document passed all of them.
    pub findings: String,
}

/// Tracks which documents are being checked and prints their reports.
pub struct Logger<'a> {
    selected: usize,
    skipped: usize,
    passed: usize,
    /// Names of the documents that failed a check or panicked.
    failing: Vec<&'a str>,
    checking: Vec<&'a Test>,
    last_change: Instant,
    status_lines: usize,
    terminal: bool,
}

impl<'a> Logger<'a> {
    pub fn new(selected: usize, skipped: usize) -> Self {
        Self {
            selected,
            skipped,
            passed: 0,
            failing: vec![],
            checking: vec![],
            last_change: Instant::now(),
            status_lines: 0,
            terminal: io::stderr().is_terminal(),
        }
    }

    /// A document's checks have started.
    pub fn start(&mut self, test: &'a Test) {
        self.checking.push(test);
        self.last_change = Instant::now();
        self.refresh();
    }

    /// A document's checks are done, or one of them panicked.
    pub fn end(&mut self, test: &'a Test, report: std::thread::Result<Report>) {
        self.checking.retain(|t| t.name != test.name);
        self.last_change = Instant::now();

        let findings = match report {
            Ok(report) if report.findings.is_empty() => {
                self.passed += 1;
                if crate::ARGS.verbose {
                    self.print(|out| writeln!(out, "✅ {test}")).unwrap();
                } else {
                    self.refresh();
                }
                return;
            }
            Ok(report) => report.findings,
            Err(_) => "a mode panicked while checking this document".into(),
        };

        self.failing.push(&test.name);
        self.print(move |out| {
            writeln!(out, "❌ {test}")?;
            if !crate::ARGS.compact {
                for line in findings.lines() {
                    writeln!(out, "  {line}")?;
                }
            }
            Ok(())
        })
        .unwrap();
    }

    /// Prints which documents failed and returns whether none did.
    pub fn finish(&self) -> bool {
        let failed = self.failing.len();
        assert_eq!(self.selected, self.passed + failed, "some documents were never checked");

        let mut failing = self.failing.clone();
        failing.sort_unstable();
        for name in &failing {
            eprintln!("  failing: {name}");
        }
        eprintln!(
            "checked {} documents: {} passed, {failed} failed ({} filtered out)",
            self.selected, self.passed, self.skipped,
        );
        failed == 0
    }

    /// Redraw the status lines. Returns whether the checks still seem to
    /// make progress.
    pub fn refresh(&mut self) -> bool {
        self.print(|_| Ok(())).unwrap();
        self.last_change.elapsed() < Duration::from_secs(10)
    }

    /// Print `inner` above freshly drawn status lines.
    fn print(
        &mut self,
        inner: impl FnOnce(&mut StderrLock<'_>) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut out = io::stderr().lock();
        for _ in 0..self.status_lines {
            write!(out, "\x1B[1F\x1B[0J")?;
        }
        self.status_lines = 0;

        inner(&mut out)?;

        let done = self.passed + self.failing.len();
        if done == self.selected || !self.terminal {
            return Ok(());
        }
        if self.last_change.elapsed() > Duration::from_secs(2) {
            for test in &self.checking {
                writeln!(out, "⏰ still checking {test}")?;
                self.status_lines += 1;
            }
        }
        writeln!(out, "💨 {done} of {} documents checked", self.selected)?;
        self.status_lines += 1;
        Ok(())
    }
}
