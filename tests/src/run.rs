use std::fmt::Write;

use mixmode_syntax::{
    highlight, lines, reindent, AnyMode, Config, Document, Mode, Token, REGISTRY,
};

use crate::collect::Test;
use crate::logger::Report;

/// Truncated copies of a file are cut every this many bytes.
const TRUNCATION_STEP: usize = 7;

/// Runs a single test.
pub fn run(test: &Test) -> Report {
    Runner::new(test).run()
}

/// Write a line to the test's error log.
macro_rules! log {
    ($runner:expr, $($tts:tt)*) => {{
        writeln!(&mut $runner.report.findings, $($tts)*).unwrap();
    }};
}

/// Runs a single test.
struct Runner<'a> {
    test: &'a Test,
    report: Report,
}

impl<'a> Runner<'a> {
    fn new(test: &'a Test) -> Self {
        Self { test, report: Report { findings: String::new() } }
    }

    fn run(mut self) -> Report {
        let mode = match REGISTRY.resolve(self.test.content_type, &Config::default()) {
            Ok(mode) => mode,
            Err(err) => {
                log!(self, "{}: {err}", self.test.path.display());
                return self.report;
            }
        };

        self.check_tokens(&mode);
        self.check_document(&mode);
        self.check_edits(&mode);
        self.check_truncated(&mode);
        self.check_reindent(&mode);
        self.report
    }

    /// Tokens tile their line and tokenizing is deterministic.
    fn check_tokens(&mut self, mode: &AnyMode) {
        let mut state = mode.start_state(0);
        for (i, line) in lines(&self.test.text).enumerate() {
            let (tokens, next) = mode.tokenize_line(line, &state);
            let (again, again_next) = mode.tokenize_line(line, &state);
            if tokens != again || !mode.states_equal(&next, &again_next) {
                log!(self, "line {}: tokenizing twice gave different results", i + 1);
            }
            if let Err(message) = tiles(line, &tokens) {
                log!(self, "line {}: {message}", i + 1);
            }
            state = next;
        }
    }

    /// A document agrees with a one-shot highlight of the same text.
    fn check_document(&mut self, mode: &AnyMode) {
        let doc = Document::new(mode.clone(), &self.test.text);
        let highlighted = highlight(mode, &self.test.text);
        if doc.len() != highlighted.len() {
            log!(self, "document has {} lines, highlight has {}", doc.len(), highlighted.len());
            return;
        }
        for (i, tokens) in highlighted.iter().enumerate() {
            if doc.tokens(i) != Some(tokens.as_slice()) {
                log!(self, "line {}: document tokens differ from highlight", i + 1);
            }
        }
        if doc.text() != self.test.text.replace("\r\n", "\n") {
            log!(self, "document text does not round-trip");
        }
    }

    /// Blanking and restoring any line leaves the document as if it had
    /// been tokenized from scratch. Restoring identical text stops after
    /// the next line.
    fn check_edits(&mut self, mode: &AnyMode) {
        let fresh = Document::new(mode.clone(), &self.test.text);
        for i in 0..fresh.len() {
            let Some(line) = fresh.line(i) else { continue };
            let line = line.to_string();

            let mut doc = fresh.clone();
            let same = doc.edit(i..i + 1, &line);
            if same.len() > 2 {
                log!(self, "line {}: identical edit retokenized {} lines", i + 1, same.len());
            }

            doc.edit(i..i + 1, "");
            doc.edit(i..i + 1, &line);
            for j in 0..fresh.len() {
                if doc.tokens(j) != fresh.tokens(j) {
                    log!(self, "line {}: restoring line {} changed its tokens", j + 1, i + 1);
                    return;
                }
            }
        }
    }

    /// Arbitrary prefixes of the file tokenize and indent without panicking.
    fn check_truncated(&mut self, mode: &AnyMode) {
        let text = &self.test.text;
        let mut cut = 0;
        while cut < text.len() {
            if text.is_char_boundary(cut) {
                let prefix = &text[..cut];
                let highlighted = highlight(mode, prefix);
                for (i, (tokens, line)) in highlighted.iter().zip(lines(prefix)).enumerate() {
                    if let Err(message) = tiles(line, tokens) {
                        log!(self, "cut at byte {cut}, line {}: {message}", i + 1);
                        return;
                    }
                }
                reindent(mode, prefix);
            }
            cut += TRUNCATION_STEP;
        }
    }

    /// Reindenting is stable and, for already indented files, a no-op.
    fn check_reindent(&mut self, mode: &AnyMode) {
        let once = reindent(mode, &self.test.text);
        let twice = reindent(mode, &once);
        if once != twice {
            log!(self, "reindenting twice changed the text");
        }

        if self.test.indented {
            let original = self.test.text.replace("\r\n", "\n");
            for (i, (got, want)) in lines(&once).zip(lines(&original)).enumerate() {
                if got != want {
                    log!(self, "line {}: indented as {got:?}, expected {want:?}", i + 1);
                }
            }
        }
    }
}

/// Checks that the tokens cover the line from start to end without gaps.
fn tiles(line: &str, tokens: &[Token]) -> Result<(), String> {
    let mut pos = 0;
    for token in tokens {
        if token.span.start != pos {
            return Err(format!(
                "token {:?} starts at {}, expected {pos}",
                token.text, token.span.start,
            ));
        }
        if token.span.is_empty() {
            return Err(format!("empty token at {pos}"));
        }
        if line.get(token.span.clone()) != Some(token.text.as_str()) {
            return Err(format!("token {:?} does not match its span", token.text));
        }
        pos = token.span.end;
    }
    if pos != line.len() {
        return Err(format!("tokens end at {pos}, line ends at {}", line.len()));
    }
    Ok(())
}
