use std::sync::Arc;

use ecow::EcoString;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Class, Config, Cursor, Mode};

/// Tokenizes and indents XML or HTML.
#[derive(Debug, Clone)]
pub struct MarkupMode {
    kludges: &'static Kludges,
    indent_unit: usize,
    tab_size: usize,
    align_cdata: bool,
}

/// The variant-specific rules of a markup dialect.
///
/// Resolved once when the mode is constructed.
#[derive(Debug)]
pub struct Kludges {
    /// Elements that never have content, e.g. `br`.
    auto_self_closers: FxHashSet<&'static str>,
    /// Elements whose closing tag may be omitted when the parent closes.
    implicitly_closed: FxHashSet<&'static str>,
    /// For an open element, the opening tags that implicitly close it.
    context_grabbers: FxHashMap<&'static str, FxHashSet<&'static str>>,
    /// Elements whose content keeps its own indentation.
    do_not_indent: FxHashSet<&'static str>,
    /// Whether attribute values may go without quotes.
    allow_unquoted: bool,
    /// Whether attributes may go without a value.
    allow_missing: bool,
}

/// The state of the markup tokenizer between lines.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MarkupState {
    /// Which sub-tokenizer continues on the next line.
    tokenize: Lexer,
    /// Pending productions, innermost last.
    cc: Vec<Cont>,
    /// The indentation of the current line.
    indented: usize,
    /// Whether no token but whitespace has been seen on the current line.
    start_of_line: bool,
    /// The name of the tag that is currently being opened.
    tag_name: Option<EcoString>,
    /// The innermost open element.
    context: Option<Arc<TagContext>>,
    /// The column everything is nested relative to.
    base: usize,
}

/// An open element.
///
/// Contexts are never mutated; opening an element allocates a new node
/// that points at its parent.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TagContext {
    name: EcoString,
    indent: usize,
    start_of_line: bool,
    no_indent: bool,
    prev: Option<Arc<TagContext>>,
}

/// The sub-tokenizers of a markup document.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Lexer {
    /// Between tags.
    Text,
    /// Inside a tag, after its name.
    Tag,
    /// Inside a quoted attribute value.
    Attribute(char),
    /// Inside a comment, CDATA section or processing instruction.
    Block { class: Class, end: &'static str },
    /// Inside a doctype declaration, at the given bracket depth.
    Doctype(usize),
}

/// What the sub-tokenizer recognized, for the tag matching logic.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Kind {
    OpenTag(EcoString),
    CloseTag(EcoString),
    EndTag,
    SelfCloseTag,
    Equals,
    Word,
    String,
    Other,
}

/// A production that still has to be matched.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Cont {
    Attributes,
    Attribute,
    AttValue,
    AttValueMaybe,
    EndTag { start_of_line: bool },
    EndCloseTag,
}

impl MarkupMode {
    /// Create a new markup mode. The `lenient` markup option selects the
    /// HTML rules instead of strict XML.
    pub fn new(config: &Config) -> Self {
        Self {
            kludges: if config.markup.lenient { &HTML } else { &XML },
            indent_unit: config.indent_unit,
            tab_size: config.tab_size,
            align_cdata: config.markup.align_cdata,
        }
    }

    /// Whether this mode uses the lenient HTML rules.
    pub fn is_lenient(&self) -> bool {
        self.kludges.allow_unquoted
    }

    /// Consume one token and also report what was recognized.
    pub(crate) fn lex(
        &self,
        cursor: &mut Cursor,
        state: &mut MarkupState,
    ) -> (Option<Class>, Option<Kind>) {
        if cursor.at_line_start() {
            state.start_of_line = true;
            state.indented = cursor.indentation();
        }
        if cursor.eat_space() {
            return (None, None);
        }

        let (class, kind) = match state.tokenize {
            Lexer::Text => in_text(cursor, state),
            Lexer::Tag => in_tag(cursor, state),
            Lexer::Attribute(quote) => in_attribute(cursor, state, quote),
            Lexer::Block { class, end } => in_block(cursor, state, class, end),
            Lexer::Doctype(depth) => doctype(cursor, state, depth),
        };

        let mut marked = None;
        if (class.is_some() || kind.is_some()) && class != Some(Class::Comment) {
            let kind = kind.clone().unwrap_or(Kind::Other);
            loop {
                let cont = state.cc.pop();
                let accepted = match cont {
                    Some(cont) => self.apply(cont, &kind, state, &mut marked),
                    None => self.element(&kind, state, &mut marked),
                };
                if accepted {
                    break;
                }
            }
        }

        state.start_of_line = false;
        (marked.or(class), kind)
    }

    /// The default production: an element's opening or closing tag, or
    /// anything else between tags.
    fn element(&self, kind: &Kind, state: &mut MarkupState, marked: &mut Option<Class>) -> bool {
        match kind {
            Kind::OpenTag(name) => {
                state.tag_name = Some(name.clone());
                let start_of_line = state.start_of_line;
                state.cc.push(Cont::EndTag { start_of_line });
                state.cc.push(Cont::Attributes);
            }
            Kind::CloseTag(name) => {
                if !self.match_close(name, state) {
                    *marked = Some(Class::Error);
                }
                state.cc.push(Cont::EndCloseTag);
            }
            _ => {}
        }
        true
    }

    /// Prepare the context stack for a closing tag. Returns whether the tag
    /// closes the innermost open element.
    ///
    /// Afterwards, the element the `>` of the closing tag will pop is on top
    /// of the stack.
    fn match_close(&self, name: &str, state: &mut MarkupState) -> bool {
        while let Some(ctx) = state.context.clone() {
            if self.same_name(&ctx.name, name) || !self.kludges.implicitly_closed(&ctx.name) {
                break;
            }
            tracing::trace!(closed = %ctx.name, by = name, "implicitly closing element");
            state.pop_context();
        }

        let Some(ctx) = &state.context else { return false };
        if self.same_name(&ctx.name, name) {
            return true;
        }

        // Best effort: if an ancestor has this name, the elements in between
        // were left open by mistake.
        if ctx.ancestors().any(|ancestor| self.same_name(&ancestor.name, name)) {
            while state.context.as_ref().is_some_and(|ctx| !self.same_name(&ctx.name, name)) {
                state.pop_context();
            }
        }
        tracing::trace!(name, "mismatched closing tag");
        false
    }

    /// HTML tag names are case-insensitive, XML ones are not.
    fn same_name(&self, a: &str, b: &str) -> bool {
        if self.is_lenient() { a.eq_ignore_ascii_case(b) } else { a == b }
    }

    fn apply(
        &self,
        cont: Cont,
        kind: &Kind,
        state: &mut MarkupState,
        marked: &mut Option<Class>,
    ) -> bool {
        let ends = matches!(kind, Kind::EndTag | Kind::SelfCloseTag);
        match cont {
            Cont::Attributes => match kind {
                Kind::Word => {
                    *marked = Some(Class::Attribute);
                    state.cc.push(Cont::Attributes);
                    state.cc.push(Cont::Attribute);
                    true
                }
                _ if ends => false,
                _ => {
                    *marked = Some(Class::Error);
                    state.cc.push(Cont::Attributes);
                    true
                }
            },
            Cont::Attribute => match kind {
                Kind::Equals => {
                    state.cc.push(Cont::AttValue);
                    true
                }
                _ if self.kludges.allow_missing => false,
                _ => {
                    *marked = Some(Class::Error);
                    !ends
                }
            },
            Cont::AttValue => match kind {
                Kind::String => {
                    state.cc.push(Cont::AttValueMaybe);
                    true
                }
                Kind::Word if self.kludges.allow_unquoted => {
                    *marked = Some(Class::String);
                    true
                }
                _ => {
                    *marked = Some(Class::Error);
                    !ends
                }
            },
            Cont::AttValueMaybe => {
                if *kind == Kind::String {
                    state.cc.push(Cont::AttValueMaybe);
                    true
                } else {
                    false
                }
            }
            Cont::EndTag { start_of_line } => {
                let name = state.tag_name.clone().unwrap_or_default();
                let lower = name.to_lowercase();
                match kind {
                    Kind::SelfCloseTag => self.grab_contexts(&lower, state),
                    Kind::EndTag if self.kludges.auto_self_closers.contains(lower.as_str()) => {
                        self.grab_contexts(&lower, state)
                    }
                    Kind::EndTag => {
                        self.grab_contexts(&lower, state);
                        self.push_context(name, start_of_line, state);
                    }
                    _ => {}
                }
                true
            }
            Cont::EndCloseTag => {
                if *kind == Kind::EndTag {
                    state.pop_context();
                } else {
                    *marked = Some(Class::Error);
                    state.cc.push(Cont::EndCloseTag);
                }
                true
            }
        }
    }

    /// Pop open elements that an opening `next` tag implicitly closes,
    /// innermost first, stopping at the first one it doesn't.
    fn grab_contexts(&self, next: &str, state: &mut MarkupState) {
        while let Some(ctx) = state.context.clone() {
            let parent = ctx.name.to_lowercase();
            let grabs = self
                .kludges
                .context_grabbers
                .get(parent.as_str())
                .is_some_and(|closers| closers.contains(next));
            if !grabs {
                break;
            }
            tracing::trace!(closed = %ctx.name, by = next, "context grabbed");
            state.pop_context();
        }
    }

    fn push_context(&self, name: EcoString, start_of_line: bool, state: &mut MarkupState) {
        let no_indent = self.kludges.do_not_indent.contains(name.to_lowercase().as_str())
            || state.context.as_ref().is_some_and(|ctx| ctx.no_indent);
        state.context = Some(Arc::new(TagContext {
            name,
            indent: state.indented,
            start_of_line,
            no_indent,
            prev: state.context.take(),
        }));
    }
}

impl Kludges {
    fn implicitly_closed(&self, name: &str) -> bool {
        self.implicitly_closed.contains(name.to_lowercase().as_str())
    }
}

impl MarkupState {
    /// The innermost open element.
    pub fn context(&self) -> Option<&TagContext> {
        self.context.as_deref()
    }

    /// The names of the open elements, outermost first.
    pub fn open_tags(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .context()
            .into_iter()
            .flat_map(|ctx| std::iter::once(ctx).chain(ctx.ancestors()))
            .map(|ctx| ctx.name.as_str())
            .collect();
        names.reverse();
        names
    }

    /// Whether the next line continues inside a tag, attribute value,
    /// comment or other multi-line construct.
    pub fn in_multiline_token(&self) -> bool {
        self.tokenize != Lexer::Text
    }

    /// The indentation of the most recently tokenized line.
    pub fn indented(&self) -> usize {
        self.indented
    }

    fn pop_context(&mut self) {
        if let Some(ctx) = self.context.take() {
            self.context = ctx.prev.clone();
        }
    }
}

impl TagContext {
    /// The element's tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The indentation of the line the element was opened on.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Whether the opening tag was the first thing on its line.
    pub fn start_of_line(&self) -> bool {
        self.start_of_line
    }

    /// The enclosing element.
    pub fn parent(&self) -> Option<&TagContext> {
        self.prev.as_deref()
    }

    /// The enclosing elements, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &TagContext> {
        std::iter::successors(self.parent(), |ctx| ctx.parent())
    }
}

impl Mode for MarkupMode {
    type State = MarkupState;

    fn name(&self) -> &'static str {
        if self.is_lenient() { "html" } else { "xml" }
    }

    fn start_state(&self, base: usize) -> MarkupState {
        MarkupState {
            tokenize: Lexer::Text,
            cc: vec![],
            indented: base,
            start_of_line: true,
            tag_name: None,
            context: None,
            base,
        }
    }

    fn token(&self, cursor: &mut Cursor, state: &mut MarkupState) -> Option<Class> {
        self.lex(cursor, state).0
    }

    fn indent(&self, state: &MarkupState, text_after: &str) -> Option<usize> {
        let mut ctx = state.context();
        if !matches!(state.tokenize, Lexer::Text | Lexer::Tag)
            || ctx.is_some_and(|ctx| ctx.no_indent)
        {
            return None;
        }
        if self.align_cdata && text_after.starts_with("<![CDATA[") {
            return Some(0);
        }
        if text_after.starts_with("</") {
            ctx = ctx.and_then(TagContext::parent);
        }
        while let Some(inner) = ctx.filter(|ctx| !ctx.start_of_line) {
            ctx = inner.parent();
        }
        Some(ctx.map_or(state.base, |ctx| ctx.indent + self.indent_unit))
    }

    fn electric_chars(&self) -> &'static str {
        "/"
    }

    fn tab_size(&self) -> usize {
        self.tab_size
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '\u{a0}' | '=' | '<' | '>' | '"' | '\'' | '/' | '?')
}

fn in_text(cursor: &mut Cursor, state: &mut MarkupState) -> (Option<Class>, Option<Kind>) {
    match cursor.eat() {
        Some('<') => {
            if cursor.eat_if('!') {
                if cursor.eat_if('[') {
                    if cursor.eat_if("CDATA[") {
                        state.tokenize = Lexer::Block { class: Class::Atom, end: "]]>" };
                        return in_block(cursor, state, Class::Atom, "]]>");
                    }
                    (None, None)
                } else if cursor.eat_if("--") {
                    state.tokenize = Lexer::Block { class: Class::Comment, end: "-->" };
                    in_block(cursor, state, Class::Comment, "-->")
                } else if cursor.match_ignore_case("DOCTYPE", true) {
                    cursor.eat_while(|c: char| c.is_alphanumeric() || "._-".contains(c));
                    state.tokenize = Lexer::Doctype(1);
                    doctype(cursor, state, 1)
                } else {
                    (None, None)
                }
            } else if cursor.eat_if('?') {
                cursor.eat_while(|c: char| c.is_alphanumeric() || "._-".contains(c));
                state.tokenize = Lexer::Block { class: Class::Meta, end: "?>" };
                (Some(Class::Meta), Some(Kind::Other))
            } else {
                let closing = cursor.eat_if('/');
                cursor.eat_space();
                let name = EcoString::from(cursor.eat_while(is_name_char));
                state.tokenize = Lexer::Tag;
                let kind = if closing { Kind::CloseTag(name) } else { Kind::OpenTag(name) };
                (Some(Class::Tag), Some(kind))
            }
        }
        Some('&') => {
            let ok = if cursor.eat_if('#') {
                let digits = if cursor.eat_if('x') {
                    cursor.eat_while(|c: char| c.is_ascii_hexdigit())
                } else {
                    cursor.eat_while(|c: char| c.is_ascii_digit())
                };
                !digits.is_empty() && cursor.eat_if(';')
            } else {
                let name = cursor.eat_while(|c: char| c.is_alphanumeric() || "_.-:".contains(c));
                !name.is_empty() && cursor.eat_if(';')
            };
            let class = if ok { Class::Atom } else { Class::Error };
            (Some(class), Some(Kind::Other))
        }
        _ => {
            cursor.eat_while(|c| c != '&' && c != '<');
            (None, None)
        }
    }
}

fn in_tag(cursor: &mut Cursor, state: &mut MarkupState) -> (Option<Class>, Option<Kind>) {
    match cursor.eat() {
        Some('>') => {
            state.tokenize = Lexer::Text;
            (Some(Class::Tag), Some(Kind::EndTag))
        }
        Some('/') if cursor.eat_if('>') => {
            state.tokenize = Lexer::Text;
            (Some(Class::Tag), Some(Kind::SelfCloseTag))
        }
        Some('=') => (None, Some(Kind::Equals)),
        Some(quote @ ('"' | '\'')) => {
            state.tokenize = Lexer::Attribute(quote);
            in_attribute(cursor, state, quote)
        }
        _ => {
            cursor.eat_while(is_name_char);
            (None, Some(Kind::Word))
        }
    }
}

/// Attribute values may span lines.
fn in_attribute(
    cursor: &mut Cursor,
    state: &mut MarkupState,
    quote: char,
) -> (Option<Class>, Option<Kind>) {
    while let Some(c) = cursor.eat() {
        if c == quote {
            state.tokenize = Lexer::Tag;
            break;
        }
    }
    (Some(Class::String), Some(Kind::String))
}

fn in_block(
    cursor: &mut Cursor,
    state: &mut MarkupState,
    class: Class,
    end: &'static str,
) -> (Option<Class>, Option<Kind>) {
    while !cursor.done() {
        if cursor.eat_if(end) {
            state.tokenize = Lexer::Text;
            break;
        }
        cursor.eat();
    }
    (Some(class), Some(Kind::Other))
}

fn doctype(
    cursor: &mut Cursor,
    state: &mut MarkupState,
    mut depth: usize,
) -> (Option<Class>, Option<Kind>) {
    while let Some(c) = cursor.eat() {
        match c {
            '<' => depth += 1,
            '>' if depth <= 1 => {
                state.tokenize = Lexer::Text;
                return (Some(Class::Meta), Some(Kind::Other));
            }
            '>' => depth -= 1,
            _ => {}
        }
    }
    state.tokenize = Lexer::Doctype(depth);
    (Some(Class::Meta), Some(Kind::Other))
}

fn set(names: &[&'static str]) -> FxHashSet<&'static str> {
    names.iter().copied().collect()
}

/// The lenient rules for HTML.
static HTML: Lazy<Kludges> = Lazy::new(|| Kludges {
    auto_self_closers: set(&[
        "area", "base", "br", "col", "command", "embed", "frame", "hr", "img", "input",
        "keygen", "link", "meta", "param", "source", "track", "wbr",
    ]),
    implicitly_closed: set(&[
        "dd", "li", "optgroup", "option", "p", "rp", "rt", "tbody", "td", "tfoot", "th",
        "tr",
    ]),
    context_grabbers: [
        ("dd", &["dd", "dt"][..]),
        ("dt", &["dd", "dt"]),
        ("li", &["li"]),
        ("option", &["option", "optgroup"]),
        ("optgroup", &["optgroup"]),
        (
            "p",
            &[
                "address", "article", "aside", "blockquote", "dir", "div", "dl", "fieldset",
                "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup",
                "hr", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
            ],
        ),
        ("rp", &["rp", "rt"]),
        ("rt", &["rp", "rt"]),
        ("tbody", &["tbody", "tfoot"]),
        ("td", &["td", "th"]),
        ("tfoot", &["tbody"]),
        ("th", &["td", "th"]),
        ("thead", &["tbody", "tfoot"]),
        ("tr", &["tr"]),
    ]
    .into_iter()
    .map(|(open, closers)| (open, set(closers)))
    .collect(),
    do_not_indent: set(&["pre"]),
    allow_unquoted: true,
    allow_missing: true,
});

/// The strict rules for XML.
static XML: Lazy<Kludges> = Lazy::new(|| Kludges {
    auto_self_closers: FxHashSet::default(),
    implicitly_closed: FxHashSet::default(),
    context_grabbers: FxHashMap::default(),
    do_not_indent: FxHashSet::default(),
    allow_unquoted: false,
    allow_missing: false,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;

    fn html() -> MarkupMode {
        MarkupMode::new(&Config::default().with_lenient_markup(true))
    }

    fn xml() -> MarkupMode {
        MarkupMode::new(&Config::default())
    }

    #[track_caller]
    fn run(mode: &MarkupMode, lines: &[&str]) -> (Vec<Token>, MarkupState) {
        let mut state = mode.start_state(0);
        let mut all = vec![];
        for line in lines {
            let (tokens, next) = mode.tokenize_line(line, &state);
            all.extend(tokens);
            state = next;
        }
        (all, state)
    }

    fn errors(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().filter(|t| t.is_error()).map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_balanced_tags_empty_stack() {
        let (tokens, state) = run(&xml(), &["<a><b></b></a>"]);
        assert!(errors(&tokens).is_empty());
        assert!(state.context().is_none());
    }

    #[test]
    fn test_mismatched_close_recovers() {
        let (tokens, state) = run(&xml(), &["<a><b></a>"]);
        assert_eq!(errors(&tokens), ["</a"]);
        assert!(state.open_tags().is_empty());

        let (tokens, state) = run(&xml(), &["<a><b></c>"]);
        assert_eq!(errors(&tokens), ["</c"]);
        assert_eq!(state.open_tags(), ["a"]);
    }

    #[test]
    fn test_stray_close_tag_is_error() {
        let (tokens, state) = run(&xml(), &["</a>", "<b>"]);
        assert_eq!(errors(&tokens), ["</a"]);
        assert_eq!(state.open_tags(), ["b"]);
    }

    #[test]
    fn test_context_grabbers_close_list_items() {
        let (tokens, state) = run(&html(), &["<ul><li>x<li>y</ul>"]);
        assert!(errors(&tokens).is_empty());
        assert!(state.context().is_none());

        let (_, state) = run(&html(), &["<ul><li>x<li>y"]);
        assert_eq!(state.open_tags(), ["ul", "li"]);
    }

    #[test]
    fn test_paragraph_grabbed_by_block() {
        let (tokens, state) = run(&html(), &["<div><p>a<div>b</div></div>"]);
        assert!(errors(&tokens).is_empty());
        assert!(state.open_tags().is_empty());
    }

    #[test]
    fn test_void_elements() {
        let (tokens, state) = run(&html(), &["<p>a<br>b<img src=x.png></p>"]);
        assert!(errors(&tokens).is_empty());
        assert!(state.context().is_none());
        let src = tokens.iter().find(|t| t.text == "x.png").unwrap();
        assert_eq!(src.class, Some(Class::String));
    }

    #[test]
    fn test_strict_attributes() {
        let (tokens, _) = run(&xml(), &["<a href=x>"]);
        assert_eq!(errors(&tokens), ["x"]);
        let (tokens, _) = run(&xml(), &["<a href=\"x\" checked>"]);
        assert_eq!(errors(&tokens), [">"]);
        let (tokens, _) = run(&html(), &["<input checked disabled>"]);
        assert!(errors(&tokens).is_empty());
        let disabled = tokens.iter().find(|t| t.text == "disabled").unwrap();
        assert_eq!(disabled.class, Some(Class::Attribute));
    }

    #[test]
    fn test_multiline_constructs() {
        let (tokens, state) = run(&xml(), &["<!-- a", "b --><x y='1", "2'>"]);
        assert_eq!(tokens[0].class, Some(Class::Comment));
        assert_eq!(tokens[1].class, Some(Class::Comment));
        assert_eq!(state.open_tags(), ["x"]);
        assert!(!state.in_multiline_token());

        let (tokens, state) = run(&html(), &["<!DOCTYPE html [ <!ENTITY x 'y'>", "]>"]);
        assert!(tokens.iter().all(|t| t.class.is_none() || t.class == Some(Class::Meta)));
        assert!(!state.in_multiline_token());
    }

    #[test]
    fn test_entities() {
        let (tokens, _) = run(&xml(), &["a &amp; b &#x4f; &bogus c"]);
        let classes: Vec<_> = tokens.iter().filter_map(|t| t.class).collect();
        assert_eq!(classes, [Class::Atom, Class::Atom, Class::Error]);
    }

    #[test]
    fn test_indentation() {
        let mode = xml();
        let (_, state) = run(&mode, &["<root>", "  <child>"]);
        assert_eq!(mode.indent(&state, "<leaf/>"), Some(4));
        assert_eq!(mode.indent(&state, "</child>"), Some(2));

        let (_, state) = run(&mode, &["<a><b>"]);
        assert_eq!(mode.indent(&state, "x"), Some(2));

        let (_, state) = run(&mode, &["<a>", "<!-- open"]);
        assert_eq!(mode.indent(&state, "x"), None);
    }

    #[test]
    fn test_pre_keeps_indentation() {
        let mode = html();
        let (_, state) = run(&mode, &["<pre>"]);
        assert_eq!(mode.indent(&state, "text"), None);
    }

    #[test]
    fn test_align_cdata() {
        let mut config = Config::default();
        config.markup.align_cdata = true;
        let mode = MarkupMode::new(&config);
        let (_, state) = run(&mode, &["<a>"]);
        assert_eq!(mode.indent(&state, "<![CDATA[x]]>"), Some(0));
        assert_eq!(mode.indent(&state, "x"), Some(2));
    }

    #[test]
    fn test_resumes_across_lines() {
        let line = r#"<a href="x">text</a> <b>more</b>"#;
        let cuts = [line.find("href").unwrap(), line.find("<b>").unwrap()];
        crate::mode::assert_resumable(&xml(), line, &cuts);
        crate::mode::assert_resumable(&html(), line, &cuts);
    }
}
