// Acknowledgement:
// Based on rust-analyzer's `TokenSet`.
// https://github.com/rust-lang/rust-analyzer/blob/master/crates/parser/src/token_set.rs

use crate::script::Kind;

/// A set of script lexeme kinds.
#[derive(Default, Copy, Clone)]
pub struct KindSet(u64);

impl KindSet {
    /// Create a new, empty set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Insert a kind into the set.
    ///
    /// You can only add kinds with discriminator < 64.
    pub const fn add(self, kind: Kind) -> Self {
        assert!((kind as u8) < BITS);
        Self(self.0 | bit(kind))
    }

    /// Whether the set contains the given kind.
    pub const fn contains(&self, kind: Kind) -> bool {
        (kind as u8) < BITS && (self.0 & bit(kind)) != 0
    }
}

const BITS: u8 = 64;

const fn bit(kind: Kind) -> u64 {
    1 << (kind as usize)
}

/// Build a kind set of the given kinds.
///
/// Example: `const SET: KindSet = kind_set!(Number, String);`
macro_rules! kind_set {
    ( $($kind:ident),* $(,)? ) => {
        $crate::set::KindSet::new()
        $(.add($crate::script::Kind::$kind))*
    }
}

/// Kinds after which a `/` starts a regular expression rather than a
/// division.
pub const REGEX_ALLOWED: KindSet = kind_set!(
    Operator, KeywordC, LeftBracket, LeftBrace, RightBrace, LeftParen, Comma, Semicolon,
    Colon,
);

/// Kinds that form a complete operand on their own.
pub const ATOMIC: KindSet = kind_set!(Atom, Number, Variable, String, Regexp);

/// Kinds that end an optional expression.
pub const EXPR_END: KindSet =
    kind_set!(Semicolon, RightBrace, RightParen, RightBracket, Comma);
