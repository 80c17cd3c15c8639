//! The script grammar as a resumable stack of pending productions.
//!
//! Each production inspects one token and either accepts it, possibly
//! pushing follow-up productions, or declines so that the production below
//! it gets a try. The stack is ordinary data, so parsing pauses at the end
//! of a line and resumes on the next one.

use std::sync::Arc;

use crate::script::{FnContext, Kind, LexInfo, LexKind, Lexeme, Lexical, Scope, ScriptState};
use crate::set::{ATOMIC, EXPR_END};
use crate::Class;

/// A production that still has to be matched.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Cont {
    Statement,
    Expression,
    MaybeExpression,
    MaybeOperator,
    MaybeLabel,
    Property,
    ObjProp,
    /// A list of `Item`s separated by commas, terminated by the kind.
    CommaSep(Item, Kind),
    CommaProceed(Item, Kind),
    Block,
    Vardef1,
    Vardef2,
    Forspec1,
    Forspec2,
    Forspec3,
    Forspec4,
    ForMaybeIn,
    FunctionDef,
    FunArg,
    Expect(Kind),
    PushLex(LexKind, Option<LexInfo>),
    PopLex,
    PushContext,
    PopContext,
}

/// An element of a comma-separated list.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Item {
    Expression,
    ObjProp,
    FunArg,
}

impl Cont {
    /// Lexical productions run right after the token that precedes them.
    fn is_lex(self) -> bool {
        matches!(self, Self::PushLex(..) | Self::PopLex)
    }
}

impl From<Item> for Cont {
    fn from(item: Item) -> Self {
        match item {
            Item::Expression => Self::Expression,
            Item::ObjProp => Self::ObjProp,
            Item::FunArg => Self::FunArg,
        }
    }
}

/// Feed one token through the grammar and return its final class.
///
/// `default` is the production used whenever the stack runs empty.
pub(crate) fn parse(
    state: &mut ScriptState,
    lexeme: Lexeme,
    column: usize,
    default: Cont,
) -> Option<Class> {
    state.settle_align(true);

    let mut p = Parser { state, lexeme, column, marked: None };
    loop {
        let cont = p.state.cc.pop().unwrap_or(default);
        if p.apply(cont) {
            break;
        }
    }
    while p.state.cc.last().is_some_and(|cont| cont.is_lex()) {
        if let Some(cont) = p.state.cc.pop() {
            p.apply(cont);
        }
    }

    if p.marked.is_some() {
        return p.marked;
    }
    if lexeme.kind == Kind::Variable && p.state.is_local(lexeme.text) {
        return Some(Class::LocalVariable);
    }
    lexeme.class
}

struct Parser<'a, 's> {
    state: &'a mut ScriptState,
    lexeme: Lexeme<'s>,
    /// The column at which the current token starts.
    column: usize,
    /// A class overriding the token's lexical one.
    marked: Option<Class>,
}

impl Parser<'_, '_> {
    /// Accept the token and continue with `next`, leftmost first.
    fn cont(&mut self, next: &[Cont]) -> bool {
        self.state.cc.extend(next.iter().rev());
        true
    }

    /// Decline the token and let `next` try it, leftmost first.
    fn pass(&mut self, next: &[Cont]) -> bool {
        self.state.cc.extend(next.iter().rev());
        false
    }

    fn apply(&mut self, cont: Cont) -> bool {
        let kind = self.lexeme.kind;
        let text = self.lexeme.text;
        match cont {
            Cont::Statement => self.statement(),
            Cont::Expression => self.expression(),
            Cont::MaybeExpression => {
                if EXPR_END.contains(kind) {
                    false
                } else {
                    self.pass(&[Cont::Expression])
                }
            }
            Cont::MaybeOperator => self.maybe_operator(),
            Cont::MaybeLabel => {
                if kind == Kind::Colon {
                    self.cont(&[Cont::PopLex, Cont::Statement])
                } else {
                    self.pass(&[Cont::MaybeOperator, Cont::Expect(Kind::Semicolon), Cont::PopLex])
                }
            }
            Cont::Property => {
                if kind == Kind::Variable {
                    self.marked = Some(Class::Property);
                    true
                } else {
                    false
                }
            }
            Cont::ObjProp => {
                if kind == Kind::Variable {
                    self.marked = Some(Class::Property);
                }
                if ATOMIC.contains(kind) {
                    self.cont(&[Cont::Expect(Kind::Colon), Cont::Expression])
                } else {
                    false
                }
            }
            Cont::CommaSep(item, end) => {
                if kind == end {
                    true
                } else {
                    self.pass(&[item.into(), Cont::CommaProceed(item, end)])
                }
            }
            Cont::CommaProceed(item, end) => {
                if kind == Kind::Comma {
                    self.cont(&[item.into(), Cont::CommaProceed(item, end)])
                } else if kind == end {
                    true
                } else {
                    self.unexpected();
                    self.cont(&[Cont::Expect(end)])
                }
            }
            Cont::Block => {
                if kind == Kind::RightBrace {
                    true
                } else {
                    self.pass(&[Cont::Statement, Cont::Block])
                }
            }
            Cont::Vardef1 => {
                if kind == Kind::Variable {
                    self.register(text);
                    self.cont(&[Cont::Vardef2])
                } else {
                    true
                }
            }
            Cont::Vardef2 => {
                if text == "=" {
                    self.cont(&[Cont::Expression, Cont::Vardef2])
                } else if kind == Kind::Comma {
                    self.cont(&[Cont::Vardef1])
                } else {
                    false
                }
            }
            // The three clauses of a `for` header: initializer, condition
            // and update. `for (x in y)` ends after the first one.
            Cont::Forspec1 => match kind {
                Kind::Var => self.cont(&[Cont::Vardef1, Cont::Forspec2]),
                Kind::Variable => self.cont(&[Cont::ForMaybeIn]),
                Kind::Semicolon => self.pass(&[Cont::Forspec2]),
                _ => self.pass(&[Cont::Expression, Cont::Forspec2]),
            },
            Cont::ForMaybeIn => {
                if text == "in" {
                    self.cont(&[Cont::Expression])
                } else {
                    self.pass(&[Cont::MaybeOperator, Cont::Forspec2])
                }
            }
            Cont::Forspec2 => {
                if kind == Kind::Semicolon {
                    self.cont(&[Cont::Forspec3])
                } else if text == "in" {
                    self.cont(&[Cont::Expression])
                } else {
                    self.pass(&[Cont::Expression, Cont::Expect(Kind::Semicolon), Cont::Forspec3])
                }
            }
            Cont::Forspec3 => match kind {
                Kind::Semicolon => self.cont(&[Cont::Forspec4]),
                Kind::RightParen => false,
                _ => self.pass(&[Cont::Expression, Cont::Forspec3]),
            },
            Cont::Forspec4 => {
                if kind != Kind::RightParen {
                    self.pass(&[Cont::Expression]);
                }
                false
            }
            Cont::FunctionDef => match kind {
                Kind::Variable => {
                    self.register(text);
                    self.cont(&[Cont::FunctionDef])
                }
                Kind::LeftParen => self.cont(&[
                    Cont::PushLex(LexKind::Paren, None),
                    Cont::PushContext,
                    Cont::CommaSep(Item::FunArg, Kind::RightParen),
                    Cont::PopLex,
                    Cont::Statement,
                    Cont::PopContext,
                ]),
                _ => false,
            },
            Cont::FunArg => {
                if kind == Kind::Variable {
                    self.register(text);
                    true
                } else {
                    false
                }
            }
            Cont::Expect(wanted) => {
                if kind == wanted {
                    true
                } else if wanted == Kind::Semicolon {
                    false
                } else {
                    self.unexpected();
                    self.cont(&[Cont::Expect(wanted)])
                }
            }
            Cont::PushLex(kind, info) => {
                self.push_lex(kind, info);
                false
            }
            Cont::PopLex => {
                self.pop_lex();
                false
            }
            Cont::PushContext => {
                self.push_context();
                false
            }
            Cont::PopContext => {
                self.pop_context();
                false
            }
        }
    }

    fn statement(&mut self) -> bool {
        use Cont::*;
        let form = PushLex(LexKind::Form, None);
        match self.lexeme.kind {
            Kind::Var => self.cont(&[
                PushLex(LexKind::Vardef, None),
                Vardef1,
                Expect(Kind::Semicolon),
                PopLex,
            ]),
            Kind::KeywordA => self.cont(&[form, Expression, Statement, PopLex]),
            Kind::KeywordB => self.cont(&[form, Statement, PopLex]),
            Kind::LeftBrace => self.cont(&[PushLex(LexKind::Brace, None), Block, PopLex]),
            Kind::Semicolon => true,
            Kind::Function => self.cont(&[FunctionDef]),
            Kind::For => self.cont(&[
                form,
                Expect(Kind::LeftParen),
                PushLex(LexKind::Paren, None),
                Forspec1,
                Expect(Kind::RightParen),
                PopLex,
                Statement,
                PopLex,
            ]),
            Kind::Variable => self.cont(&[PushLex(LexKind::Stat, None), MaybeLabel]),
            Kind::Switch => self.cont(&[
                form,
                Expression,
                PushLex(LexKind::Brace, Some(LexInfo::Switch)),
                Expect(Kind::LeftBrace),
                Block,
                PopLex,
                PopLex,
            ]),
            Kind::Case => self.cont(&[Expression, Expect(Kind::Colon)]),
            Kind::Default => self.cont(&[Expect(Kind::Colon)]),
            Kind::Catch => self.cont(&[
                form,
                PushContext,
                Expect(Kind::LeftParen),
                FunArg,
                Expect(Kind::RightParen),
                Statement,
                PopLex,
                PopContext,
            ]),
            _ => self.pass(&[
                PushLex(LexKind::Stat, None),
                Expression,
                Expect(Kind::Semicolon),
                PopLex,
            ]),
        }
    }

    fn expression(&mut self) -> bool {
        use Cont::*;
        let kind = self.lexeme.kind;
        if ATOMIC.contains(kind) {
            return self.cont(&[MaybeOperator]);
        }
        match kind {
            Kind::Function => self.cont(&[FunctionDef]),
            Kind::KeywordC => self.cont(&[MaybeExpression]),
            Kind::LeftParen => self.cont(&[
                PushLex(LexKind::Paren, None),
                MaybeExpression,
                Expect(Kind::RightParen),
                PopLex,
                MaybeOperator,
            ]),
            Kind::Operator => self.cont(&[Expression]),
            Kind::LeftBracket => self.cont(&[
                PushLex(LexKind::Bracket, None),
                CommaSep(Item::Expression, Kind::RightBracket),
                PopLex,
                MaybeOperator,
            ]),
            Kind::LeftBrace => self.cont(&[
                PushLex(LexKind::Brace, None),
                CommaSep(Item::ObjProp, Kind::RightBrace),
                PopLex,
                MaybeOperator,
            ]),
            _ => match self.awaiting(kind) {
                // An elided last item, as in `[a, ]`.
                Some(Cont::CommaSep(..) | Cont::CommaProceed(..)) if kind != Kind::Comma => false,
                Some(_) => {
                    self.unexpected();
                    false
                }
                None => {
                    self.unexpected();
                    true
                }
            },
        }
    }

    /// The nearest pending production that would accept a token of this
    /// kind, if any.
    fn awaiting(&self, kind: Kind) -> Option<Cont> {
        self.state.cc.iter().rev().copied().find(|&cont| match cont {
            Cont::Expect(wanted) => wanted == kind,
            Cont::CommaSep(_, end) => end == kind,
            Cont::CommaProceed(_, end) => end == kind || kind == Kind::Comma,
            Cont::Block => kind == Kind::RightBrace,
            _ => false,
        })
    }

    fn maybe_operator(&mut self) -> bool {
        use Cont::*;
        let text = self.lexeme.text;
        match self.lexeme.kind {
            Kind::Operator if text.contains("++") || text.contains("--") => {
                self.cont(&[MaybeOperator])
            }
            Kind::Operator if text == "?" => {
                self.cont(&[Expression, Expect(Kind::Colon), Expression])
            }
            Kind::Operator => self.cont(&[Expression]),
            Kind::LeftParen => self.cont(&[
                PushLex(LexKind::Paren, None),
                CommaSep(Item::Expression, Kind::RightParen),
                PopLex,
                MaybeOperator,
            ]),
            Kind::Dot => self.cont(&[Property, MaybeOperator]),
            Kind::LeftBracket => self.cont(&[
                PushLex(LexKind::Bracket, None),
                Expression,
                Expect(Kind::RightBracket),
                PopLex,
                MaybeOperator,
            ]),
            _ => false,
        }
    }

    fn unexpected(&mut self) {
        tracing::trace!(token = self.lexeme.text, "unexpected token in script");
        self.marked = Some(Class::Error);
    }

    /// Declare a name in the current function.
    fn register(&mut self, name: &str) {
        if self.state.context.is_none() {
            return;
        }
        self.marked = Some(Class::Def);
        if !self.state.is_local(name) {
            self.bind(name);
        }
    }

    fn bind(&mut self, name: &str) {
        let next = self.state.local_vars.take();
        self.state.local_vars = Some(Arc::new(Scope { name: name.into(), next }));
    }

    fn push_context(&mut self) {
        let prev = self.state.context.take();
        let vars = self.state.local_vars.clone();
        self.state.context = Some(Arc::new(FnContext { vars, prev }));
        self.bind("arguments");
        self.bind("this");
    }

    fn pop_context(&mut self) {
        if let Some(ctx) = self.state.context.take() {
            self.state.local_vars = ctx.vars.clone();
            self.state.context = ctx.prev.clone();
        }
    }

    fn push_lex(&mut self, kind: LexKind, info: Option<LexInfo>) {
        let prev = self.state.lexical.clone();
        self.state.lexical = Arc::new(Lexical {
            indented: self.state.indented,
            column: self.column,
            kind,
            align: None,
            info,
            prev: Some(prev),
        });
    }

    /// The root context is never popped.
    fn pop_lex(&mut self) {
        let Some(prev) = self.state.lexical.prev.clone() else { return };
        if self.state.lexical.kind == LexKind::Paren {
            self.state.indented = self.state.lexical.indented;
        }
        self.state.lexical = prev;
    }
}
