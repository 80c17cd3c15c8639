//! Incremental, line-by-line tokenizers and indenters for markup, style
//! sheets and scripts, including scripts and style sheets embedded in HTML.

pub mod diag;

mod class;
mod combinator;
mod config;
mod cursor;
mod document;
mod highlight;
mod markup;
mod mixed;
mod mode;
mod registry;
mod script;
mod set;
mod style;

pub use self::class::{Class, Token};
pub use self::config::{Config, MarkupOptions, ScriptOptions};
pub use self::cursor::{visual_width, Cursor};
pub use self::document::{reindent, Document};
pub use self::highlight::{highlight, highlight_html, lines};
pub use self::markup::{Kludges, MarkupMode, MarkupState, TagContext};
pub use self::mixed::{Embed, MixedMode, MixedState};
pub use self::mode::{AnyMode, AnyState, Mode};
pub use self::registry::{resolve, ConfigPatch, ModeFactory, Registry, REGISTRY};
pub use self::script::{is_ident, LexInfo, LexKind, Lexical, ScriptMode, ScriptState};
pub use self::style::{Frame, StyleMode, StyleState};
