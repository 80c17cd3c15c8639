use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use crate::{Class, Config, Cursor, Mode};

/// Tokenizes and indents style sheets.
#[derive(Debug, Clone)]
pub struct StyleMode {
    indent_unit: usize,
    tab_size: usize,
}

/// The state of the style sheet tokenizer between lines.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StyleState {
    /// Which sub-tokenizer continues on the next line.
    tokenize: Lexer,
    /// The column everything is nested relative to.
    base: usize,
    /// The open rule bodies, declarations and at-rules.
    stack: Vec<Frame>,
}

/// The sub-tokenizers of a style sheet.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Lexer {
    Base,
    BlockComment,
    TagComment,
    Quoted(char),
}

/// An entry of the nesting stack.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Frame {
    /// Inside a rule body, between declarations.
    Block,
    /// Inside a declaration, after its property name.
    Rule,
    /// After an at-rule's name, before its body or terminating semicolon.
    AtRule {
        /// Whether the at-rule's body contains further rules.
        nests: bool,
    },
    /// Inside the body of a nesting at-rule such as `@media`.
    AtBlock,
}

/// What the sub-tokenizer recognized, for the nesting logic.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Kind {
    Directive { nests: bool },
    Comment,
    String,
    Hash,
    Important,
    Number,
    Ident,
    Punct(char),
    Other,
}

impl StyleMode {
    /// Create a new style sheet mode.
    pub fn new(config: &Config) -> Self {
        Self { indent_unit: config.indent_unit, tab_size: config.tab_size }
    }
}

impl StyleState {
    /// The nesting stack, innermost frame last.
    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    /// Whether a comment or string continues on the next line.
    pub fn in_multiline_token(&self) -> bool {
        self.tokenize != Lexer::Base
    }
}

impl Mode for StyleMode {
    type State = StyleState;

    fn name(&self) -> &'static str {
        "css"
    }

    fn start_state(&self, base: usize) -> StyleState {
        StyleState { tokenize: Lexer::Base, base, stack: vec![] }
    }

    fn token(&self, cursor: &mut Cursor, state: &mut StyleState) -> Option<Class> {
        if cursor.eat_space() {
            return None;
        }

        let kind = match state.tokenize {
            Lexer::Base => base(cursor, state),
            Lexer::BlockComment => block_comment(cursor, state),
            Lexer::TagComment => tag_comment(cursor, state),
            Lexer::Quoted(quote) => quoted(cursor, state, quote),
        };

        let top = state.stack.last().copied();
        let class = match kind {
            Kind::Directive { .. } => Some(Class::Meta),
            Kind::Comment => Some(Class::Comment),
            Kind::String => Some(Class::String),
            Kind::Hash if top == Some(Frame::Rule) => Some(Class::Atom),
            Kind::Hash => Some(Class::String2),
            Kind::Important => Some(Class::Keyword),
            Kind::Number => Some(Class::Number),
            Kind::Ident => match top {
                Some(Frame::Block) => Some(Class::Property),
                Some(Frame::Rule) if KEYWORDS.contains(cursor.current()) => {
                    Some(Class::Keyword)
                }
                Some(Frame::Rule) | Some(Frame::AtRule { .. }) => Some(Class::Variable),
                None | Some(Frame::AtBlock) => Some(Class::Tag),
            },
            Kind::Punct(_) | Kind::Other => None,
        };

        if top == Some(Frame::Rule) && matches!(kind, Kind::Punct(';' | '{' | '}')) {
            state.stack.pop();
        }

        match kind {
            Kind::Punct('{') => match top {
                Some(Frame::AtRule { nests }) => {
                    state.stack.pop();
                    state.stack.push(if nests { Frame::AtBlock } else { Frame::Block });
                }
                _ => state.stack.push(Frame::Block),
            },
            Kind::Punct('}') => {
                state.stack.pop();
            }
            Kind::Punct(';') if matches!(top, Some(Frame::AtRule { .. })) => {
                state.stack.pop();
            }
            Kind::Directive { nests } => state.stack.push(Frame::AtRule { nests }),
            Kind::Comment => {}
            _ if top == Some(Frame::Block) => state.stack.push(Frame::Rule),
            _ => {}
        }

        class
    }

    fn indent(&self, state: &StyleState, text_after: &str) -> Option<usize> {
        let mut depth = state.stack.len();
        if text_after.starts_with('}') {
            let closes = if state.stack.last() == Some(&Frame::Rule) { 2 } else { 1 };
            depth = depth.saturating_sub(closes);
        }
        Some(state.base + depth * self.indent_unit)
    }

    fn electric_chars(&self) -> &'static str {
        "}"
    }

    fn tab_size(&self) -> usize {
        self.tab_size
    }
}

fn base(cursor: &mut Cursor, state: &mut StyleState) -> Kind {
    let Some(c) = cursor.eat() else { return Kind::Other };
    match c {
        '@' => {
            cursor.eat_while(is_word);
            let nests = NESTING_AT_RULES.contains(&cursor.current());
            Kind::Directive { nests }
        }
        '/' if cursor.eat_if('*') => {
            state.tokenize = Lexer::BlockComment;
            block_comment(cursor, state)
        }
        '<' if cursor.eat_if('!') => {
            state.tokenize = Lexer::TagComment;
            tag_comment(cursor, state)
        }
        '=' => Kind::Other,
        '~' | '|' if cursor.eat_if('=') => Kind::Other,
        '"' | '\'' => {
            state.tokenize = Lexer::Quoted(c);
            quoted(cursor, state, c)
        }
        '#' => {
            cursor.eat_while(is_word);
            Kind::Hash
        }
        '!' => {
            cursor.eat_while(char::is_whitespace);
            cursor.eat_while(is_word);
            Kind::Important
        }
        '0'..='9' => {
            cursor.eat_while(|c: char| is_word(c) || c == '.' || c == '%');
            Kind::Number
        }
        ',' | '.' | '+' | '>' | '*' | '/' => Kind::Other,
        ';' | '{' | '}' | ':' | '[' | ']' => Kind::Punct(c),
        c if is_word(c) => {
            cursor.eat_while(is_word);
            Kind::Ident
        }
        _ => Kind::Other,
    }
}

fn block_comment(cursor: &mut Cursor, state: &mut StyleState) -> Kind {
    let mut maybe_end = false;
    while let Some(c) = cursor.eat() {
        if maybe_end && c == '/' {
            state.tokenize = Lexer::Base;
            break;
        }
        maybe_end = c == '*';
    }
    Kind::Comment
}

fn tag_comment(cursor: &mut Cursor, state: &mut StyleState) -> Kind {
    let mut dashes = 0;
    while let Some(c) = cursor.eat() {
        if dashes >= 2 && c == '>' {
            state.tokenize = Lexer::Base;
            break;
        }
        dashes = if c == '-' { dashes + 1 } else { 0 };
    }
    Kind::Comment
}

/// A string continues on the next line only if the line ends in an escape.
fn quoted(cursor: &mut Cursor, state: &mut StyleState, quote: char) -> Kind {
    let mut escaped = false;
    while let Some(c) = cursor.eat() {
        if c == quote && !escaped {
            break;
        }
        escaped = !escaped && c == '\\';
    }
    if !escaped {
        state.tokenize = Lexer::Base;
    }
    Kind::String
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\\' | '-')
}

/// At-rules whose bodies contain rules rather than declarations.
const NESTING_AT_RULES: &[&str] = &[
    "@media",
    "@supports",
    "@document",
    "@keyframes",
    "@-webkit-keyframes",
    "@-moz-keyframes",
];

/// Known property values.
static KEYWORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "above", "absolute", "alias", "all", "all-scroll", "alternate", "always",
        "antialiased", "auto", "avoid", "background", "backwards", "baseline", "below",
        "bidi-override", "black", "blink", "block", "block-axis", "blue", "bold",
        "bolder", "border", "border-box", "both", "bottom", "break-all", "break-word",
        "button", "capitalize", "caption", "cell", "center", "circle", "clip",
        "close-quote", "col-resize", "collapse", "compact", "condensed", "contain",
        "content", "content-box", "context-menu", "continuous", "copy", "cover",
        "crosshair", "currentcolor", "cursive", "dashed", "decimal",
        "decimal-leading-zero", "default", "disc", "dotted", "double", "e-resize",
        "ease", "ease-in", "ease-in-out", "ease-out", "ellipsis", "end", "expanded",
        "extra-condensed", "extra-expanded", "fantasy", "fast", "fixed", "flat", "flex",
        "forwards", "from", "gray", "green", "grid", "groove", "help", "hidden", "hide",
        "horizontal", "hsl", "hsla", "icon", "infinite", "inherit", "initial", "inline",
        "inline-block", "inline-flex", "inline-table", "inset", "inside", "italic",
        "justify", "large", "larger", "left", "lighter", "line-through", "linear",
        "list-item", "local", "lowercase", "ltr", "medium", "middle", "monospace",
        "move", "n-resize", "navy", "ne-resize", "no-repeat", "none", "normal",
        "not-allowed", "nowrap", "nw-resize", "oblique", "open-quote", "orange",
        "outset", "outside", "overline", "padding-box", "pointer", "pre", "pre-line",
        "pre-wrap", "progress", "purple", "red", "relative", "repeat", "repeat-x",
        "repeat-y", "reverse", "rgb", "rgba", "ridge", "right", "round", "row-resize",
        "rtl", "s-resize", "sans-serif", "scroll", "se-resize", "serif", "silver",
        "small", "small-caps", "smaller", "solid", "space", "square", "start", "static",
        "stretch", "sub", "super", "sw-resize", "table", "table-cell", "table-row",
        "text", "text-bottom", "text-top", "thick", "thin", "to", "top", "transparent",
        "underline", "unset", "uppercase", "url", "vertical", "visible", "w-resize",
        "wait", "white", "wrap", "x-large", "x-small", "xx-large", "xx-small", "yellow",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;

    fn mode() -> StyleMode {
        StyleMode::new(&Config::default())
    }

    #[track_caller]
    fn classes(line: &str, state: &StyleState) -> (Vec<(String, Option<Class>)>, StyleState) {
        let (tokens, state) = mode().tokenize_line(line, state);
        let pairs = tokens
            .into_iter()
            .filter(|Token { text, .. }| !text.trim().is_empty())
            .map(|Token { text, class, .. }| (text.to_string(), class))
            .collect();
        (pairs, state)
    }

    fn owned(pairs: &[(&str, Option<Class>)]) -> Vec<(String, Option<Class>)> {
        pairs.iter().map(|&(text, class)| (text.to_string(), class)).collect()
    }

    #[test]
    fn test_rule_classification() {
        let start = mode().start_state(0);
        let (pairs, end) = classes("a{color:red}", &start);
        assert_eq!(
            pairs,
            owned(&[
                ("a", Some(Class::Tag)),
                ("{", None),
                ("color", Some(Class::Property)),
                (":", None),
                ("red", Some(Class::Keyword)),
                ("}", None),
            ])
        );
        assert_eq!(end.stack(), start.stack());
    }

    #[test]
    fn test_unknown_value_is_variable() {
        let start = mode().start_state(0);
        let (pairs, _) = classes("p { font-family: Helvetica }", &start);
        assert_eq!(pairs[4], ("Helvetica".into(), Some(Class::Variable)));
    }

    #[test]
    fn test_hash_depends_on_context() {
        let start = mode().start_state(0);
        let (pairs, _) = classes("#main { color: #fff !important; }", &start);
        assert_eq!(pairs[0], ("#main".into(), Some(Class::String2)));
        assert_eq!(pairs[4], ("#fff".into(), Some(Class::Atom)));
        assert_eq!(pairs[5], ("!important".into(), Some(Class::Keyword)));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let start = mode().start_state(0);
        let (pairs, state) = classes("a { /* open", &start);
        assert_eq!(pairs[2], ("/* open".into(), Some(Class::Comment)));
        assert!(state.in_multiline_token());
        let (pairs, state) = classes("still */ b: 1px", &state);
        assert_eq!(pairs[0], ("still */".into(), Some(Class::Comment)));
        assert_eq!(pairs[1], ("b".into(), Some(Class::Property)));
        assert_eq!(pairs[3], ("1px".into(), Some(Class::Number)));
        assert!(!state.in_multiline_token());
    }

    #[test]
    fn test_media_block_contains_selectors() {
        let start = mode().start_state(0);
        let (pairs, state) = classes("@media screen {", &start);
        assert_eq!(pairs[0], ("@media".into(), Some(Class::Meta)));
        assert_eq!(state.stack(), [Frame::AtBlock]);
        let (pairs, state) = classes("  p { margin: 0 }", &state);
        assert_eq!(pairs[0], ("p".into(), Some(Class::Tag)));
        assert_eq!(state.stack(), [Frame::AtBlock]);
        let (_, state) = classes("@import url(x.css);", &state);
        assert_eq!(state.stack(), [Frame::AtBlock]);
    }

    #[test]
    fn test_unterminated_string_ends_with_line() {
        let start = mode().start_state(0);
        let (_, state) = classes("a { content: \"open", &start);
        assert!(!state.in_multiline_token());
        let (_, state) = classes("a { content: \"open\\", &start);
        assert!(state.in_multiline_token());
    }

    #[test]
    fn test_indentation() {
        let mode = mode();
        let start = mode.start_state(4);
        assert_eq!(mode.indent(&start, "a {"), Some(4));
        let (_, state) = mode.tokenize_line("a {", &start);
        assert_eq!(mode.indent(&state, "color: red;"), Some(6));
        assert_eq!(mode.indent(&state, "}"), Some(4));
        let (_, state) = mode.tokenize_line("  color: red", &state);
        assert_eq!(state.stack(), [Frame::Block, Frame::Rule]);
        assert_eq!(mode.indent(&state, "}"), Some(4));
    }

    #[test]
    fn test_resumes_across_lines() {
        let line = "a { color: red; } b { margin: 0 }";
        let cuts = [line.find("red").unwrap(), line.find("b {").unwrap()];
        crate::mode::assert_resumable(&mode(), line, &cuts);
    }
}
