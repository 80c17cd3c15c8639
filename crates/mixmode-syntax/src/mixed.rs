use ecow::EcoString;
use regex::Regex;

use crate::diag::{ModeError, ModeResult};
use crate::markup::{is_name_char, Kind};
use crate::{
    AnyMode, AnyState, Class, Config, Cursor, MarkupMode, MarkupState, Mode, ScriptMode,
    StyleMode,
};

/// Markup with scripts and style sheets embedded in their elements.
#[derive(Debug, Clone)]
pub struct MixedMode {
    markup: MarkupMode,
    embeds: Vec<Embed>,
}

/// A mode that takes over inside the elements with a given tag name.
#[derive(Debug, Clone)]
pub struct Embed {
    tag: EcoString,
    mode: AnyMode,
    /// Matches the element's closing tag anywhere.
    close: Regex,
    /// Matches the element's closing tag right at the start of a string.
    close_here: Regex,
}

/// The state of the mixed tokenizer between lines.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedState {
    /// The index of the embed that is currently active, if any.
    active: Option<usize>,
    markup: MarkupState,
    /// The state of the active embedded mode.
    local: Option<Box<AnyState>>,
}

impl MixedMode {
    /// Create lenient markup that embeds scripts in `script` and style
    /// sheets in `style` elements.
    pub fn new(config: &Config) -> ModeResult<Self> {
        let markup = MarkupMode::new(&config.clone().with_lenient_markup(true));
        let script = ScriptMode::new(&config.clone().with_data_only(false));
        let style = StyleMode::new(config);
        Ok(Self { markup, embeds: vec![] }
            .with_embed("script", script.into())?
            .with_embed("style", style.into())?)
    }

    /// Additionally embed `mode` inside elements named `tag`.
    ///
    /// An earlier embed for the same tag takes precedence.
    pub fn with_embed(mut self, tag: &str, mode: AnyMode) -> ModeResult<Self> {
        self.embeds.push(Embed::new(tag, mode)?);
        Ok(self)
    }

    /// The embedded modes.
    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    /// Tokenize markup, switching to an embedded mode after the opening tag
    /// of an embedding element.
    fn markup_token(&self, cursor: &mut Cursor, state: &mut MixedState) -> Option<Class> {
        let (class, kind) = self.markup.lex(cursor, &mut state.markup);
        if kind != Some(Kind::EndTag) {
            return class;
        }

        let Some(ctx) = state.markup.context() else { return class };
        let Some(index) = self.embeds.iter().position(|embed| embed.matches(ctx.name()))
        else {
            return class;
        };

        let embed = &self.embeds[index];
        let base = self
            .markup
            .indent(&state.markup, "")
            .unwrap_or_else(|| state.markup.indented());
        tracing::debug!(mode = embed.mode.name(), base, "entering embedded mode");
        state.local = Some(Box::new(embed.mode.start_state(base)));
        state.active = Some(index);
        class
    }
}

impl Embed {
    /// Embed `mode` inside elements named `tag`.
    ///
    /// Fails if `tag` could not appear as a tag name.
    pub fn new(tag: &str, mode: AnyMode) -> ModeResult<Self> {
        if tag.is_empty() || !tag.chars().all(is_name_char) {
            return Err(ModeError::InvalidEmbed(tag.into()));
        }
        let pattern = format!(r"</\s*{}\s*>", regex::escape(tag));
        let build = |prefix: &str| {
            Regex::new(&format!("(?i){prefix}{pattern}"))
                .map_err(|_| ModeError::InvalidEmbed(tag.into()))
        };
        Ok(Self { tag: tag.into(), mode, close: build("")?, close_here: build("^")? })
    }

    /// The tag name of the embedding element.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The embedded mode.
    pub fn mode(&self) -> &AnyMode {
        &self.mode
    }

    fn matches(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.tag)
    }
}

impl MixedState {
    /// The state of the surrounding markup.
    pub fn markup(&self) -> &MarkupState {
        &self.markup
    }

    /// The state of the active embedded mode.
    pub fn local(&self) -> Option<&AnyState> {
        self.local.as_deref()
    }

    /// Whether an embedded mode is active.
    pub fn is_embedded(&self) -> bool {
        self.active.is_some()
    }
}

impl Mode for MixedMode {
    type State = MixedState;

    fn name(&self) -> &'static str {
        "htmlmixed"
    }

    fn start_state(&self, base: usize) -> MixedState {
        MixedState { active: None, markup: self.markup.start_state(base), local: None }
    }

    fn token(&self, cursor: &mut Cursor, state: &mut MixedState) -> Option<Class> {
        let Some(embed) = state.active.and_then(|index| self.embeds.get(index)) else {
            state.active = None;
            return self.markup_token(cursor, state);
        };

        if cursor.match_regex(&embed.close_here, false).is_some() {
            tracing::debug!(mode = embed.mode.name(), "leaving embedded mode");
            state.active = None;
            state.local = None;
            return self.markup_token(cursor, state);
        }

        let local = state.local.get_or_insert_with(|| Box::new(embed.mode.start_state(0)));
        let class = embed.mode.token(cursor, local);

        // Never swallow the closing tag, even from inside a string or comment.
        if let Some(m) = embed.close.find(cursor.current()).filter(|m| m.start() > 0) {
            cursor.backtrack_to(cursor.start() + m.start());
        }
        class
    }

    fn indent(&self, state: &MixedState, text_after: &str) -> Option<usize> {
        let embedded = state.active.and_then(|index| self.embeds.get(index));
        match (embedded, &state.local) {
            (Some(embed), Some(local)) if !text_after.starts_with("</") => {
                embed.mode.indent(local, text_after)
            }
            _ => self.markup.indent(&state.markup, text_after),
        }
    }

    fn electric_chars(&self) -> &'static str {
        "/{}:"
    }

    fn tab_size(&self) -> usize {
        self.markup.tab_size()
    }
}
