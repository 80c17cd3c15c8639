use std::ops::Range;

use crate::highlight::lines;
use crate::{Mode, Token};

/// A tokenized text that is kept up to date across edits.
///
/// Stores the tokens and end state of every line. An edit only retokenizes
/// lines until the state at a line end matches the one before the edit;
/// everything after that point is known to be unaffected.
#[derive(Debug, Clone)]
pub struct Document<M: Mode> {
    mode: M,
    start: M::State,
    lines: Vec<Line<M::State>>,
}

/// One line with the result of tokenizing it.
#[derive(Debug, Clone)]
struct Line<S> {
    text: String,
    tokens: Vec<Token>,
    /// The state after the line.
    end: S,
}

impl<M: Mode> Document<M> {
    /// Tokenize a text from scratch.
    pub fn new(mode: M, text: &str) -> Self {
        let start = mode.start_state(0);
        let mut doc = Self { mode, start, lines: vec![] };
        doc.edit(0..0, text);
        doc
    }

    /// The document's mode.
    pub fn mode(&self) -> &M {
        &self.mode
    }

    /// The number of lines. Never zero.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document is a single empty line.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].text.is_empty()
    }

    /// The text of a line.
    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(|l| l.text.as_str())
    }

    /// The tokens of a line.
    pub fn tokens(&self, line: usize) -> Option<&[Token]> {
        self.lines.get(line).map(|l| l.tokens.as_slice())
    }

    /// The state before a line. Past the end, the state after the last line.
    pub fn state_before(&self, line: usize) -> &M::State {
        match line.checked_sub(1).and_then(|prev| self.lines.get(prev)) {
            Some(prev) => &prev.end,
            None if line == 0 => &self.start,
            None => self.lines.last().map_or(&self.start, |last| &last.end),
        }
    }

    /// The full text.
    pub fn text(&self) -> String {
        let lines: Vec<&str> = self.lines.iter().map(|l| l.text.as_str()).collect();
        lines.join("\n")
    }

    /// Replace a range of lines with the lines of `text`.
    ///
    /// The range is clamped to the document. Returns the range of lines
    /// that were tokenized again.
    pub fn edit(&mut self, replace: Range<usize>, text: &str) -> Range<usize> {
        let end = replace.end.min(self.lines.len());
        let start = replace.start.min(end);

        let inserted: Vec<Line<M::State>> = lines(text)
            .map(|line| Line {
                text: line.into(),
                tokens: vec![],
                end: self.start.clone(),
            })
            .collect();
        let count = inserted.len();
        self.lines.splice(start..end, inserted);

        let mut state = self.state_before(start).clone();
        let mut i = start;
        while i < self.lines.len() {
            let line = &mut self.lines[i];
            let (tokens, next) = self.mode.tokenize_line(&line.text, &state);
            line.tokens = tokens;
            let converged = i >= start + count && self.mode.states_equal(&next, &line.end);
            line.end = self.mode.copy_state(&next);
            state = next;
            i += 1;
            if converged {
                break;
            }
        }

        tracing::debug!(
            replaced = ?(start..end),
            inserted = count,
            retokenized = i - start,
            "edited document",
        );
        start..i
    }

    /// The column a line should be indented to, or `None` if its
    /// indentation should be left alone.
    pub fn indent(&self, line: usize) -> Option<usize> {
        let text = self.lines.get(line)?.text.trim_start();
        self.mode.indent(self.state_before(line), text)
    }
}

/// Reindent every line of a text, top to bottom.
///
/// Blank lines lose their whitespace; lines the mode declines to indent are
/// kept as they are.
pub fn reindent<M: Mode>(mode: &M, text: &str) -> String {
    let mut state = mode.start_state(0);
    let mut out = Vec::new();
    for line in lines(text) {
        let trimmed = line.trim_start();
        let fixed = if trimmed.is_empty() {
            String::new()
        } else {
            match mode.indent(&state, trimmed) {
                Some(column) => format!("{}{trimmed}", " ".repeat(column)),
                None => line.to_string(),
            }
        };
        state = mode.tokenize_line(&fixed, &state).1;
        out.push(fixed);
    }
    out.join("\n")
}
