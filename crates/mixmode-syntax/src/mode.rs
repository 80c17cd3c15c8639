use std::fmt::Debug;

#[cfg(test)]
use ecow::EcoString;

use crate::{
    Class, Cursor, MarkupMode, MarkupState, MixedMode, MixedState, ScriptMode, ScriptState,
    StyleMode, StyleState, Token,
};

/// A grammar-specific tokenizer and indenter.
///
/// A mode never holds per-document data itself. Everything that has to
/// survive from one line to the next lives in its [`State`](Mode::State),
/// which the host threads through the lines of a document: the state after
/// line `n` is the input for line `n + 1`.
pub trait Mode {
    /// The resumable parse state between lines.
    type State: Debug + Clone + PartialEq;

    /// The mode's registered name.
    fn name(&self) -> &'static str;

    /// The state at the start of a document or embedded region whose lines
    /// are nested at column `base`.
    fn start_state(&self, base: usize) -> Self::State;

    /// Consume one token at the cursor and classify it.
    ///
    /// Must consume at least one character unless the cursor is done.
    fn token(&self, cursor: &mut Cursor, state: &mut Self::State) -> Option<Class>;

    /// The column a line starting with `text_after` (the line without its
    /// leading whitespace) should be indented to, given the state before
    /// that line.
    ///
    /// Returns `None` when the line's current indentation should be left
    /// alone, e.g. inside a multi-line comment.
    fn indent(&self, state: &Self::State, text_after: &str) -> Option<usize>;

    /// Characters whose insertion should trigger reindenting the line.
    fn electric_chars(&self) -> &'static str;

    /// How many columns a tab advances to.
    fn tab_size(&self) -> usize;

    /// Whether two states will produce the same output for all following
    /// lines.
    fn states_equal(&self, a: &Self::State, b: &Self::State) -> bool {
        a == b
    }

    /// A copy of the state that shares nothing mutable with the original.
    fn copy_state(&self, state: &Self::State) -> Self::State {
        state.clone()
    }

    /// Whether typing `c` should trigger reindenting.
    fn is_electric(&self, c: char) -> bool {
        self.electric_chars().contains(c)
    }

    /// Tokenize the rest of the cursor's line, starting from `state`.
    ///
    /// The given state is left untouched; the state after the line is
    /// returned alongside the tokens.
    fn tokenize(&self, cursor: &mut Cursor, state: &Self::State) -> (Vec<Token>, Self::State) {
        let mut state = self.copy_state(state);
        let mut tokens = vec![];
        while !cursor.done() {
            cursor.begin_token();
            let mut class = self.token(cursor, &mut state);
            if cursor.pos() == cursor.start() {
                // A token that made no progress would loop forever.
                cursor.eat();
                class = Some(Class::Error);
            }
            tokens.push(Token::new(cursor.start()..cursor.pos(), cursor.current(), class));
        }
        (tokens, state)
    }

    /// Tokenize a whole line, starting from `state`.
    fn tokenize_line(&self, line: &str, state: &Self::State) -> (Vec<Token>, Self::State) {
        let mut cursor = Cursor::new(line, self.tab_size());
        self.tokenize(&mut cursor, state)
    }
}

/// Any of the available modes.
#[derive(Debug, Clone)]
pub enum AnyMode {
    Style(StyleMode),
    Markup(MarkupMode),
    Script(ScriptMode),
    Mixed(MixedMode),
}

/// The state of any of the available modes.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyState {
    Style(StyleState),
    Markup(MarkupState),
    Script(ScriptState),
    Mixed(MixedState),
}

macro_rules! dispatch {
    ($self:expr, $mode:ident => $body:expr) => {
        match $self {
            AnyMode::Style($mode) => $body,
            AnyMode::Markup($mode) => $body,
            AnyMode::Script($mode) => $body,
            AnyMode::Mixed($mode) => $body,
        }
    };
}

impl AnyMode {
    /// Whether the state belongs to this mode.
    fn owns(&self, state: &AnyState) -> bool {
        matches!(
            (self, state),
            (Self::Style(_), AnyState::Style(_))
                | (Self::Markup(_), AnyState::Markup(_))
                | (Self::Script(_), AnyState::Script(_))
                | (Self::Mixed(_), AnyState::Mixed(_))
        )
    }
}

impl Mode for AnyMode {
    type State = AnyState;

    fn name(&self) -> &'static str {
        dispatch!(self, mode => mode.name())
    }

    fn start_state(&self, base: usize) -> AnyState {
        match self {
            Self::Style(mode) => AnyState::Style(mode.start_state(base)),
            Self::Markup(mode) => AnyState::Markup(mode.start_state(base)),
            Self::Script(mode) => AnyState::Script(mode.start_state(base)),
            Self::Mixed(mode) => AnyState::Mixed(mode.start_state(base)),
        }
    }

    fn token(&self, cursor: &mut Cursor, state: &mut AnyState) -> Option<Class> {
        if !self.owns(state) {
            tracing::warn!(mode = self.name(), "discarding state of another mode");
            *state = self.start_state(0);
        }
        match (self, state) {
            (Self::Style(mode), AnyState::Style(state)) => mode.token(cursor, state),
            (Self::Markup(mode), AnyState::Markup(state)) => mode.token(cursor, state),
            (Self::Script(mode), AnyState::Script(state)) => mode.token(cursor, state),
            (Self::Mixed(mode), AnyState::Mixed(state)) => mode.token(cursor, state),
            _ => None,
        }
    }

    fn indent(&self, state: &AnyState, text_after: &str) -> Option<usize> {
        match (self, state) {
            (Self::Style(mode), AnyState::Style(state)) => mode.indent(state, text_after),
            (Self::Markup(mode), AnyState::Markup(state)) => mode.indent(state, text_after),
            (Self::Script(mode), AnyState::Script(state)) => mode.indent(state, text_after),
            (Self::Mixed(mode), AnyState::Mixed(state)) => mode.indent(state, text_after),
            _ => None,
        }
    }

    fn electric_chars(&self) -> &'static str {
        dispatch!(self, mode => mode.electric_chars())
    }

    fn tab_size(&self) -> usize {
        dispatch!(self, mode => mode.tab_size())
    }

    fn states_equal(&self, a: &AnyState, b: &AnyState) -> bool {
        match (self, a, b) {
            (Self::Style(mode), AnyState::Style(a), AnyState::Style(b)) => {
                mode.states_equal(a, b)
            }
            (Self::Markup(mode), AnyState::Markup(a), AnyState::Markup(b)) => {
                mode.states_equal(a, b)
            }
            (Self::Script(mode), AnyState::Script(a), AnyState::Script(b)) => {
                mode.states_equal(a, b)
            }
            (Self::Mixed(mode), AnyState::Mixed(a), AnyState::Mixed(b)) => {
                mode.states_equal(a, b)
            }
            _ => false,
        }
    }
}

impl From<StyleMode> for AnyMode {
    fn from(mode: StyleMode) -> Self {
        Self::Style(mode)
    }
}

impl From<MarkupMode> for AnyMode {
    fn from(mode: MarkupMode) -> Self {
        Self::Markup(mode)
    }
}

impl From<ScriptMode> for AnyMode {
    fn from(mode: ScriptMode) -> Self {
        Self::Script(mode)
    }
}

impl From<MixedMode> for AnyMode {
    fn from(mode: MixedMode) -> Self {
        Self::Mixed(mode)
    }
}

/// Asserts that tokenizing `line` in one go yields the same tokens as
/// tokenizing it in pieces cut at `cuts`, carrying the state across.
#[cfg(test)]
#[track_caller]
pub(crate) fn assert_resumable<M: Mode>(mode: &M, line: &str, cuts: &[usize]) {
    let flat = |tokens: Vec<Token>| -> Vec<(EcoString, Option<Class>)> {
        tokens.into_iter().map(|t| (t.text, t.class)).collect()
    };

    let (whole, _) = mode.tokenize_line(line, &mode.start_state(0));
    let mut state = mode.start_state(0);
    let mut pieces = vec![];
    let mut from = 0;
    for &to in cuts.iter().chain([line.len()].iter()) {
        let (tokens, next) = mode.tokenize_line(&line[from..to], &state);
        pieces.extend(tokens);
        state = next;
        from = to;
    }
    assert_eq!(flat(whole), flat(pieces), "cut {line:?} at {cuts:?}");
}
