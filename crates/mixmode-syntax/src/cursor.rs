use regex::Regex;
use unscanny::{Pattern, Scanner};

/// A position-tracking view over one line of text.
///
/// All operations are bounded to the line: running into its end is
/// reported through `None`, `false` or an empty match, never a panic.
#[derive(Debug, Copy, Clone)]
pub struct Cursor<'s> {
    /// The scanner: contains the underlying line and location as a "cursor".
    s: Scanner<'s>,
    /// Where the token currently being produced starts.
    start: usize,
    /// How many columns a tab advances to.
    tab_size: usize,
    /// The last byte index whose column was computed, and that column.
    /// Columns are mostly asked for in increasing order.
    last_column: (usize, usize),
}

impl<'s> Cursor<'s> {
    /// Create a cursor at the start of a line.
    pub fn new(line: &'s str, tab_size: usize) -> Self {
        Self { s: Scanner::new(line), start: 0, tab_size: tab_size.max(1), last_column: (0, 0) }
    }

    /// The full line.
    pub fn line(&self) -> &'s str {
        self.s.string()
    }

    /// The byte index of the cursor.
    pub fn pos(&self) -> usize {
        self.s.cursor()
    }

    /// The byte index at which the current token starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Mark the cursor position as the start of a new token.
    pub fn begin_token(&mut self) {
        self.start = self.s.cursor();
    }

    /// The text consumed since the current token started.
    pub fn current(&self) -> &'s str {
        self.s.from(self.start)
    }

    /// The rest of the line after the cursor.
    pub fn rest(&self) -> &'s str {
        self.s.after()
    }

    /// Whether the cursor is at the very beginning of the line.
    pub fn at_line_start(&self) -> bool {
        self.s.cursor() == 0
    }

    /// Whether nothing remains on the line.
    pub fn done(&self) -> bool {
        self.s.done()
    }

    /// The next character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.s.peek()
    }

    /// Consume and return the next character.
    pub fn eat(&mut self) -> Option<char> {
        self.s.eat()
    }

    /// Consume the pattern if it is next.
    pub fn eat_if<T>(&mut self, pat: impl Pattern<T>) -> bool {
        self.s.eat_if(pat)
    }

    /// Whether the pattern is next, without consuming it.
    pub fn at<T>(&self, pat: impl Pattern<T>) -> bool {
        self.s.at(pat)
    }

    /// Consume characters while the pattern matches and return them.
    pub fn eat_while<T>(&mut self, pat: impl Pattern<T>) -> &'s str {
        self.s.eat_while(pat)
    }

    /// Consume whitespace. Returns whether anything was consumed.
    pub fn eat_space(&mut self) -> bool {
        !self.s.eat_whitespace().is_empty()
    }

    /// Consume everything up to the end of the line.
    pub fn skip_to_end(&mut self) {
        self.s.jump(self.s.string().len());
    }

    /// Match `text` at the cursor, ignoring ASCII case, and optionally
    /// consume it.
    pub fn match_ignore_case(&mut self, text: &str, advance: bool) -> bool {
        let rest = self.s.after();
        let matched = rest
            .get(..text.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(text));
        if matched && advance {
            self.s.jump(self.s.cursor() + text.len());
        }
        matched
    }

    /// Match a regular expression directly at the cursor and optionally
    /// consume the match.
    ///
    /// Matches that start further down the line are ignored. Anchor the
    /// pattern with `^` so that a failed match does not scan the rest of
    /// the line.
    pub fn match_regex(&mut self, re: &Regex, advance: bool) -> Option<&'s str> {
        let rest = self.s.after();
        let m = re.find(rest).filter(|m| m.start() == 0)?;
        if advance {
            self.s.jump(self.s.cursor() + m.end());
        }
        Some(&rest[..m.end()])
    }

    /// Rewind the cursor by `n` characters, without going past the start of
    /// the current token.
    pub fn backtrack(&mut self, n: usize) {
        for _ in 0..n {
            if self.s.cursor() <= self.start {
                break;
            }
            self.s.uneat();
        }
    }

    /// Rewind the cursor to a byte index inside the current token.
    pub fn backtrack_to(&mut self, pos: usize) {
        if pos >= self.start && pos <= self.s.cursor() {
            self.s.jump(pos);
        }
    }

    /// The visual column of a byte index, expanding tabs.
    ///
    /// Continues from the previously computed column when `pos` lies after
    /// it, so walking a line token by token stays linear. An index inside a
    /// character counts as that character's start.
    pub fn column_of(&mut self, pos: usize) -> usize {
        let line = self.s.string();
        let mut pos = pos.min(line.len());
        while !line.is_char_boundary(pos) {
            pos -= 1;
        }
        let (from, col) = if self.last_column.0 <= pos { self.last_column } else { (0, 0) };
        let col = advance(col, &line[from..pos], self.tab_size);
        self.last_column = (pos, col);
        col
    }

    /// The visual column at which the current token starts.
    pub fn column(&mut self) -> usize {
        self.column_of(self.start)
    }

    /// The visual width of the line's leading whitespace.
    pub fn indentation(&self) -> usize {
        let line = self.s.string();
        let lead = &line[..line.len() - line.trim_start().len()];
        visual_width(lead, self.tab_size)
    }
}

/// The number of columns `text` spans when tabs advance to the next
/// multiple of `tab_size`.
pub fn visual_width(text: &str, tab_size: usize) -> usize {
    advance(0, text, tab_size.max(1))
}

/// The column reached by writing `text` starting at column `col`.
fn advance(col: usize, text: &str, tab_size: usize) -> usize {
    text.chars().fold(col, |col, c| match c {
        '\t' => col + tab_size - col % tab_size,
        _ => col + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_and_current() {
        let mut c = Cursor::new("foo bar", 4);
        assert!(c.at_line_start());
        assert_eq!(c.eat_while(char::is_alphanumeric), "foo");
        assert_eq!(c.current(), "foo");
        assert!(c.eat_space());
        c.begin_token();
        assert_eq!(c.peek(), Some('b'));
        c.skip_to_end();
        assert_eq!(c.current(), "bar");
        assert!(c.done());
        assert_eq!(c.eat(), None);
    }

    #[test]
    fn test_patterns() {
        let mut c = Cursor::new("0x1F;", 4);
        assert!(c.eat_if('0'));
        assert!(c.at(['x', 'X']));
        assert!(c.eat_if(['x', 'X']));
        assert_eq!(c.eat_while(|c: char| c.is_ascii_hexdigit()), "1F");
        assert!(!c.eat_if("::"));
        assert!(c.eat_if(";"));
        assert!(c.done());
    }

    #[test]
    fn test_backtrack_stays_inside_token() {
        let mut c = Cursor::new("ab</script>", 4);
        c.eat();
        c.begin_token();
        c.skip_to_end();
        c.backtrack(9);
        assert_eq!(c.current(), "b");
        assert_eq!(c.rest(), "</script>");
        c.backtrack(100);
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn test_match_ignore_case() {
        let mut c = Cursor::new("<!doctype html>", 4);
        c.eat_if("<!");
        assert!(c.match_ignore_case("DOCTYPE", false));
        assert_eq!(c.pos(), 2);
        assert!(c.match_ignore_case("DOCTYPE", true));
        assert_eq!(c.pos(), 9);
        assert!(!c.match_ignore_case("a very long needle", true));
    }

    #[test]
    fn test_match_regex_is_anchored() {
        let re = Regex::new(r"(?i)<\s*/\s*script\s*>").unwrap();
        let mut c = Cursor::new("x</SCRIPT>", 4);
        assert_eq!(c.match_regex(&re, false), None);
        c.eat();
        assert_eq!(c.match_regex(&re, false), Some("</SCRIPT>"));
        assert_eq!(c.pos(), 1);
        assert_eq!(c.match_regex(&re, true), Some("</SCRIPT>"));
        assert!(c.done());
    }

    #[test]
    fn test_columns_expand_tabs() {
        let mut c = Cursor::new("\t  x", 4);
        assert_eq!(c.indentation(), 6);
        assert_eq!(c.column_of(1), 4);
        assert_eq!(visual_width(" \t", 8), 8);
    }

    #[test]
    fn test_columns_in_any_order() {
        let line = "a\tbc\td  e\t";
        let mut c = Cursor::new(line, 4);
        let forward: Vec<_> = (0..=line.len()).map(|pos| c.column_of(pos)).collect();
        let backward: Vec<_> = (0..=line.len()).rev().map(|pos| c.column_of(pos)).collect();
        let expected: Vec<_> = (0..=line.len()).map(|pos| visual_width(&line[..pos], 4)).collect();
        assert_eq!(forward, expected);
        assert_eq!(backward.into_iter().rev().collect::<Vec<_>>(), expected);
        assert_eq!(c.column_of(100), visual_width(line, 4));
    }

    #[test]
    fn test_columns_skip_inside_characters() {
        let mut c = Cursor::new("äx", 4);
        assert_eq!(c.column_of(1), 0);
        assert_eq!(c.column_of(2), 1);
        assert_eq!(c.column_of(3), 2);
    }
}
