use std::ops::Range;

use ecow::EcoString;
use serde::{Serialize, Serializer};

/// The display category of a token.
///
/// Tokens without a class (plain text, whitespace, most punctuation) carry
/// `None` instead.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Class {
    /// A line or block comment.
    Comment,
    /// A reserved word or a known style value.
    Keyword,
    /// A literal constant such as `true`, a CDATA section or an entity.
    Atom,
    /// A numeric literal, possibly with a unit.
    Number,
    /// The defining occurrence of a local name.
    Def,
    /// A free identifier.
    Variable,
    /// An identifier bound in the enclosing scope chain.
    LocalVariable,
    /// A property name in a member access, object literal or style rule.
    Property,
    /// A string literal.
    String,
    /// A regular expression literal or a hash selector.
    String2,
    /// A directive, doctype or processing instruction.
    Meta,
    /// A markup tag name or delimiter, or a style selector.
    Tag,
    /// A markup attribute name.
    Attribute,
    /// A structural or lexical error.
    Error,
}

impl Class {
    /// The list of all classes, in the same order as they are defined.
    ///
    /// Can be used as the counter-part to `class as usize`.
    pub const LIST: &'static [Class] = &[
        Self::Comment,
        Self::Keyword,
        Self::Atom,
        Self::Number,
        Self::Def,
        Self::Variable,
        Self::LocalVariable,
        Self::Property,
        Self::String,
        Self::String2,
        Self::Meta,
        Self::Tag,
        Self::Attribute,
        Self::Error,
    ];

    /// The short, stable name of the class.
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Keyword => "keyword",
            Self::Atom => "atom",
            Self::Number => "number",
            Self::Def => "def",
            Self::Variable => "variable",
            Self::LocalVariable => "variable-2",
            Self::Property => "property",
            Self::String => "string",
            Self::String2 => "string-2",
            Self::Meta => "meta",
            Self::Tag => "tag",
            Self::Attribute => "attribute",
            Self::Error => "error",
        }
    }

    /// The recommended CSS class for the highlighting class.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Comment => "mm-comment",
            Self::Keyword => "mm-keyword",
            Self::Atom => "mm-atom",
            Self::Number => "mm-number",
            Self::Def => "mm-def",
            Self::Variable => "mm-variable",
            Self::LocalVariable => "mm-variable-2",
            Self::Property => "mm-property",
            Self::String => "mm-string",
            Self::String2 => "mm-string-2",
            Self::Meta => "mm-meta",
            Self::Tag => "mm-tag",
            Self::Attribute => "mm-attribute",
            Self::Error => "mm-error",
        }
    }

    /// Return the recommended TextMate grammar scope for the class.
    pub fn tm_scope(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Keyword => "keyword",
            Self::Atom => "constant.language",
            Self::Number => "constant.numeric",
            Self::Def => "entity.name.variable",
            Self::Variable => "variable.other",
            Self::LocalVariable => "variable.other.local",
            Self::Property => "variable.other.property",
            Self::String => "string.quoted",
            Self::String2 => "string.regexp",
            Self::Meta => "meta.preprocessor",
            Self::Tag => "entity.name.tag",
            Self::Attribute => "entity.other.attribute-name",
            Self::Error => "invalid.illegal",
        }
    }
}

impl Serialize for Class {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A classified span of one line.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Token {
    /// The byte range of the token within its line.
    pub span: Range<usize>,
    /// The text of the token.
    pub text: EcoString,
    /// How the token should be displayed.
    pub class: Option<Class>,
}

impl Token {
    /// Create a new token.
    pub fn new(span: Range<usize>, text: impl Into<EcoString>, class: Option<Class>) -> Self {
        Self { span, text: text.into(), class }
    }

    /// Whether the token is classified as an error.
    pub fn is_error(&self) -> bool {
        self.class == Some(Class::Error)
    }
}
