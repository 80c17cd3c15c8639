use std::sync::Arc;

use ecow::EcoString;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::combinator::{self, Cont};
use crate::set::REGEX_ALLOWED;
use crate::{Class, Config, Cursor, Mode};

/// Tokenizes and indents scripts, or pure data in data-only mode.
#[derive(Debug, Clone)]
pub struct ScriptMode {
    indent_unit: usize,
    tab_size: usize,
    data_only: bool,
    /// The names bound before the first line.
    globals: Option<Arc<Scope>>,
}

/// The state of the script tokenizer and parser between lines.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ScriptState {
    /// Which sub-tokenizer continues on the next line.
    pub(crate) tokenize: Lexer,
    /// Whether a `/` would start a regular expression.
    pub(crate) re_allowed: bool,
    /// Whether words may be keywords. False right after a `.`.
    pub(crate) kw_allowed: bool,
    /// Pending productions, innermost last.
    pub(crate) cc: Vec<Cont>,
    /// The innermost lexical context.
    pub(crate) lexical: Arc<Lexical>,
    /// The names bound in the current function.
    pub(crate) local_vars: Option<Arc<Scope>>,
    /// The innermost function context.
    pub(crate) context: Option<Arc<FnContext>>,
    /// The indentation of the current line.
    pub(crate) indented: isize,
}

/// A nesting level that determines indentation.
///
/// Nodes are immutable; entering a construct allocates a new node pointing
/// at its parent.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Lexical {
    pub(crate) indented: isize,
    pub(crate) column: usize,
    pub(crate) kind: LexKind,
    /// Whether content follows the opening token on its line. Unknown until
    /// the next token or line start.
    pub(crate) align: Option<bool>,
    pub(crate) info: Option<LexInfo>,
    pub(crate) prev: Option<Arc<Lexical>>,
}

/// The kind of a lexical context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LexKind {
    /// The document root.
    Block,
    /// An expression statement.
    Stat,
    /// A variable declaration.
    Vardef,
    /// A compound statement such as `if` or `for`, up to its body.
    Form,
    /// A parenthesized group.
    Paren,
    /// A bracketed group.
    Bracket,
    /// A braced group.
    Brace,
}

/// Extra information attached to a lexical context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LexInfo {
    /// The body of a `switch`.
    Switch,
}

/// A declared name, linked to the names declared before it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Scope {
    pub(crate) name: EcoString,
    pub(crate) next: Option<Arc<Scope>>,
}

/// A function body, remembering the enclosing scope.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FnContext {
    pub(crate) vars: Option<Arc<Scope>>,
    pub(crate) prev: Option<Arc<FnContext>>,
}

/// The sub-tokenizers of a script.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Lexer {
    Base,
    String(char),
    Comment,
}

/// The lexical category of a script token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub(crate) enum Kind {
    /// `if`, `while`, `with`: followed by an expression and a statement.
    KeywordA,
    /// `else`, `do`, `try`, `finally`: followed by a statement.
    KeywordB,
    /// `return`, `new`, ...: followed by an optional expression.
    KeywordC,
    Var,
    Function,
    Catch,
    For,
    Switch,
    Case,
    Default,
    Operator,
    Atom,
    Number,
    Variable,
    String,
    Regexp,
    Comment,
    Error,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Colon,
    Dot,
}

/// A classified lexeme, handed from the tokenizer to the grammar.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Lexeme<'s> {
    pub kind: Kind,
    pub class: Option<Class>,
    pub text: &'s str,
}

impl ScriptMode {
    /// Create a new script mode.
    pub fn new(config: &Config) -> Self {
        let globals = config
            .script
            .globals
            .iter()
            .fold(None, |next, name| Some(Arc::new(Scope { name: name.clone(), next })));
        Self {
            indent_unit: config.indent_unit,
            tab_size: config.tab_size,
            data_only: config.script.data_only,
            globals,
        }
    }

    /// Whether only expressions are accepted.
    pub fn is_data_only(&self) -> bool {
        self.data_only
    }
}

impl ScriptState {
    /// Whether a string or comment continues on the next line.
    pub fn in_multiline_token(&self) -> bool {
        self.tokenize != Lexer::Base
    }

    /// The innermost lexical context.
    pub fn lexical(&self) -> &Lexical {
        &self.lexical
    }

    /// Whether `name` is bound in the current scope chain.
    pub fn is_local(&self, name: &str) -> bool {
        Scope::contains(self.local_vars.as_deref(), name)
    }

    /// Resolve a still undecided alignment of the innermost lexical context.
    pub(crate) fn settle_align(&mut self, align: bool) {
        if self.lexical.align.is_none() {
            let mut node = (*self.lexical).clone();
            node.align = Some(align);
            self.lexical = Arc::new(node);
        }
    }
}

impl Lexical {
    /// The kind of context.
    pub fn kind(&self) -> LexKind {
        self.kind
    }

    /// The enclosing context.
    pub fn parent(&self) -> Option<&Lexical> {
        self.prev.as_deref()
    }

    /// How many contexts enclose this one.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |lex| lex.parent()).count()
    }
}

impl LexKind {
    /// The character that closes a context of this kind, if any.
    fn closing(self) -> Option<char> {
        match self {
            Self::Paren => Some(')'),
            Self::Bracket => Some(']'),
            Self::Brace => Some('}'),
            _ => None,
        }
    }
}

impl Scope {
    pub(crate) fn contains(mut scope: Option<&Scope>, name: &str) -> bool {
        while let Some(link) = scope {
            if link.name == name {
                return true;
            }
            scope = link.next.as_deref();
        }
        false
    }
}

impl Mode for ScriptMode {
    type State = ScriptState;

    fn name(&self) -> &'static str {
        "javascript"
    }

    fn start_state(&self, base: usize) -> ScriptState {
        let root = Lexical {
            indented: base as isize - self.indent_unit as isize,
            column: 0,
            kind: LexKind::Block,
            align: Some(false),
            info: None,
            prev: None,
        };
        ScriptState {
            tokenize: Lexer::Base,
            re_allowed: true,
            kw_allowed: true,
            cc: vec![],
            lexical: Arc::new(root),
            local_vars: self.globals.clone(),
            context: Some(Arc::new(FnContext { vars: self.globals.clone(), prev: None })),
            indented: 0,
        }
    }

    fn token(&self, cursor: &mut Cursor, state: &mut ScriptState) -> Option<Class> {
        if cursor.at_line_start() {
            state.settle_align(false);
            state.indented = cursor.indentation() as isize;
        }
        if cursor.eat_space() {
            return None;
        }

        let lexeme = match state.tokenize {
            Lexer::Base => base(cursor, state),
            Lexer::String(quote) => string(cursor, state, quote),
            Lexer::Comment => comment(cursor, state),
        };
        if lexeme.kind == Kind::Comment {
            return lexeme.class;
        }

        state.re_allowed = REGEX_ALLOWED.contains(lexeme.kind);
        state.kw_allowed = lexeme.kind != Kind::Dot;
        let default = if self.data_only { Cont::Expression } else { Cont::Statement };
        combinator::parse(state, lexeme, cursor.column(), default)
    }

    fn indent(&self, state: &ScriptState, text_after: &str) -> Option<usize> {
        if state.tokenize != Lexer::Base {
            return None;
        }

        let first = text_after.chars().next();
        let mut lexical = &*state.lexical;
        if lexical.kind == LexKind::Stat && first == Some('}') {
            lexical = lexical.parent().unwrap_or(lexical);
        }

        let unit = self.indent_unit as isize;
        let closing = first.is_some() && first == lexical.kind.closing();
        let column = match lexical.kind {
            LexKind::Vardef => lexical.indented + 4,
            LexKind::Form if first == Some('{') => lexical.indented,
            LexKind::Stat | LexKind::Form => lexical.indented + unit,
            _ if lexical.info == Some(LexInfo::Switch) && !closing => {
                let label = starts_with_word(text_after, "case")
                    || starts_with_word(text_after, "default");
                lexical.indented + if label { unit } else { 2 * unit }
            }
            // Aligned contexts indent one column past their opener. Closers line up with it.
            _ if lexical.align == Some(true) => {
                lexical.column as isize + if closing { 0 } else { 1 }
            }
            _ => lexical.indented + if closing { 0 } else { unit },
        };
        Some(column.max(0) as usize)
    }

    fn electric_chars(&self) -> &'static str {
        ":{}"
    }

    fn tab_size(&self) -> usize {
        self.tab_size
    }
}

/// Whether `text` is a valid identifier.
pub fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_id_start) && chars.all(is_id_continue)
}

fn is_id_start(c: char) -> bool {
    unicode_ident::is_xid_start(c) || c == '_' || c == '$'
}

fn is_id_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '$'
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '&' | '%' | '=' | '<' | '>' | '!' | '?' | '|')
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(is_id_continue))
}

/// Keywords with their kind and class.
static KEYWORDS: Lazy<FxHashMap<&'static str, (Kind, Class)>> = Lazy::new(|| {
    use Kind::*;
    let mut map = FxHashMap::default();
    for (kind, words) in [
        (KeywordA, &["if", "while", "with"][..]),
        (KeywordB, &["else", "do", "try", "finally"]),
        (KeywordC, &["return", "break", "continue", "new", "delete", "throw"]),
        (Var, &["var", "const", "let"]),
        (Function, &["function"]),
        (Catch, &["catch"]),
        (For, &["for"]),
        (Switch, &["switch"]),
        (Case, &["case"]),
        (Default, &["default"]),
        (Operator, &["in", "typeof", "instanceof"]),
    ] {
        map.extend(words.iter().map(|&word| (word, (kind, crate::Class::Keyword))));
    }
    for word in ["true", "false", "null", "undefined", "NaN", "Infinity"] {
        map.insert(word, (Atom, crate::Class::Atom));
    }
    map
});

fn lexeme<'s>(cursor: &Cursor<'s>, kind: Kind, class: Option<Class>) -> Lexeme<'s> {
    Lexeme { kind, class, text: cursor.current() }
}

fn base<'s>(cursor: &mut Cursor<'s>, state: &mut ScriptState) -> Lexeme<'s> {
    let Some(c) = cursor.eat() else {
        return lexeme(cursor, Kind::Error, Some(Class::Error));
    };

    let punct = match c {
        '[' => Some(Kind::LeftBracket),
        ']' => Some(Kind::RightBracket),
        '{' => Some(Kind::LeftBrace),
        '}' => Some(Kind::RightBrace),
        '(' => Some(Kind::LeftParen),
        ')' => Some(Kind::RightParen),
        ',' => Some(Kind::Comma),
        ';' => Some(Kind::Semicolon),
        ':' => Some(Kind::Colon),
        '.' => Some(Kind::Dot),
        _ => None,
    };
    if let Some(kind) = punct {
        return lexeme(cursor, kind, None);
    }

    match c {
        '"' | '\'' => {
            state.tokenize = Lexer::String(c);
            string(cursor, state, c)
        }
        '0' if cursor.eat_if(['x', 'X']) => {
            cursor.eat_while(|c: char| c.is_ascii_hexdigit());
            lexeme(cursor, Kind::Number, Some(Class::Number))
        }
        '0'..='9' => {
            number(cursor);
            lexeme(cursor, Kind::Number, Some(Class::Number))
        }
        '/' if cursor.eat_if('*') => {
            state.tokenize = Lexer::Comment;
            comment(cursor, state)
        }
        '/' if cursor.eat_if('/') => {
            cursor.skip_to_end();
            lexeme(cursor, Kind::Comment, Some(Class::Comment))
        }
        '/' if state.re_allowed => {
            until_unescaped(cursor, '/');
            cursor.eat_while(['g', 'i', 'm', 'y']);
            lexeme(cursor, Kind::Regexp, Some(Class::String2))
        }
        '#' => {
            cursor.skip_to_end();
            lexeme(cursor, Kind::Error, Some(Class::Error))
        }
        '/' => {
            cursor.eat_while(is_operator_char);
            lexeme(cursor, Kind::Operator, None)
        }
        c if is_operator_char(c) => {
            cursor.eat_while(is_operator_char);
            lexeme(cursor, Kind::Operator, None)
        }
        _ => {
            cursor.eat_while(is_id_continue);
            let word = cursor.current();
            match KEYWORDS.get(word) {
                Some(&(kind, class)) if state.kw_allowed => lexeme(cursor, kind, Some(class)),
                _ => lexeme(cursor, Kind::Variable, Some(Class::Variable)),
            }
        }
    }
}

/// The rest of a decimal number whose first digit was consumed.
fn number(cursor: &mut Cursor) {
    cursor.eat_while(|c: char| c.is_ascii_digit());
    if cursor.eat_if('.') {
        cursor.eat_while(|c: char| c.is_ascii_digit());
    }
    let mark = cursor.pos();
    if cursor.eat_if(['e', 'E']) {
        cursor.eat_if(['+', '-']);
        if cursor.eat_while(|c: char| c.is_ascii_digit()).is_empty() {
            cursor.backtrack_to(mark);
        }
    }
}

/// Consume up to and including an unescaped `end`. Returns whether the line
/// ended in an escape.
fn until_unescaped(cursor: &mut Cursor, end: char) -> bool {
    let mut escaped = false;
    while let Some(c) = cursor.eat() {
        if c == end && !escaped {
            return false;
        }
        escaped = !escaped && c == '\\';
    }
    escaped
}

/// Strings only continue on the next line after a trailing backslash.
fn string<'s>(cursor: &mut Cursor<'s>, state: &mut ScriptState, quote: char) -> Lexeme<'s> {
    if !until_unescaped(cursor, quote) {
        state.tokenize = Lexer::Base;
    }
    lexeme(cursor, Kind::String, Some(Class::String))
}

fn comment<'s>(cursor: &mut Cursor<'s>, state: &mut ScriptState) -> Lexeme<'s> {
    let mut maybe_end = false;
    while let Some(c) = cursor.eat() {
        if c == '/' && maybe_end {
            state.tokenize = Lexer::Base;
            break;
        }
        maybe_end = c == '*';
    }
    lexeme(cursor, Kind::Comment, Some(Class::Comment))
}
