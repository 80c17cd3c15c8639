use ecow::EcoString;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::diag::{ModeError, ModeResult};
use crate::{AnyMode, Config, MarkupMode, MixedMode, Mode, ScriptMode, StyleMode};

/// Builds a mode from a validated configuration.
pub type ModeFactory = fn(&Config) -> ModeResult<AnyMode>;

/// Adjusts the configuration for a content type, e.g. to select a variant.
pub type ConfigPatch = fn(Config) -> Config;

/// The built-in modes and content types.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::builtin);

/// Resolve a content type against the built-in registry.
pub fn resolve(content_type: &str, config: &Config) -> ModeResult<AnyMode> {
    REGISTRY.resolve(content_type, config)
}

/// Maps mode names and content types to modes.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modes: FxHashMap<EcoString, ModeFactory>,
    aliases: FxHashMap<EcoString, Alias>,
}

/// A content type that stands for a registered mode.
#[derive(Debug, Clone)]
struct Alias {
    mode: EcoString,
    patch: ConfigPatch,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the modes this crate provides.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("css", |config| Ok(StyleMode::new(config).into()));
        registry.register("javascript", |config| Ok(ScriptMode::new(config).into()));
        registry.register("xml", |config| {
            Ok(MarkupMode::new(&config.clone().with_lenient_markup(false)).into())
        });
        registry.register("html", |config| {
            Ok(MarkupMode::new(&config.clone().with_lenient_markup(true)).into())
        });
        registry.register("htmlmixed", |config| MixedMode::new(config).map(Into::into));

        registry.alias("text/css", "css", |config| config);
        registry.alias("text/javascript", "javascript", |config| config);
        registry.alias("application/javascript", "javascript", |config| config);
        registry.alias("application/json", "javascript", |config| config.with_data_only(true));
        registry.alias("text/xml", "xml", |config| config);
        registry.alias("application/xml", "xml", |config| config);
        registry.alias("text/html", "htmlmixed", |config| config);
        registry
    }

    /// Register a mode under a name. Replaces an earlier mode of that name.
    pub fn register(&mut self, name: &str, factory: ModeFactory) {
        self.modes.insert(name.to_ascii_lowercase().into(), factory);
    }

    /// Make a content type resolve to the mode registered as `mode`, with its
    /// configuration adjusted by `patch`.
    pub fn alias(&mut self, content_type: &str, mode: &str, patch: ConfigPatch) {
        self.aliases.insert(
            content_type.to_ascii_lowercase().into(),
            Alias { mode: mode.to_ascii_lowercase().into(), patch },
        );
    }

    /// Create the mode for a content type or mode name.
    ///
    /// Parameters like `; charset=utf-8` are ignored.
    pub fn resolve(&self, content_type: &str, config: &Config) -> ModeResult<AnyMode> {
        config.validate()?;

        let key = essence(content_type);
        let (name, config) = match self.aliases.get(key.as_str()) {
            Some(alias) => (alias.mode.as_str(), (alias.patch)(config.clone())),
            None => (key.as_str(), config.clone()),
        };

        let Some(factory) = self.modes.get(name) else {
            return Err(ModeError::UnknownContentType(content_type.into()));
        };
        config.validate()?;

        let mode = factory(&config)?;
        tracing::debug!(content_type, mode = mode.name(), "resolved mode");
        Ok(mode)
    }

    /// Resolve a content type, falling back to markup for unknown markup
    /// types: `*+xml` becomes strict XML and anything mentioning `html`
    /// becomes lenient HTML.
    pub fn resolve_or_fallback(&self, content_type: &str, config: &Config) -> ModeResult<AnyMode> {
        match self.resolve(content_type, config) {
            Err(ModeError::UnknownContentType(name)) => {
                let key = essence(&name);
                let fallback = if key.ends_with("+xml") {
                    "xml"
                } else if key.contains("html") {
                    "html"
                } else {
                    return Err(ModeError::UnknownContentType(name));
                };
                tracing::debug!(content_type, fallback, "falling back to markup");
                self.resolve(fallback, config)
            }
            result => result,
        }
    }

    /// The registered mode names, sorted.
    pub fn modes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modes.keys().map(EcoString::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The registered content types with the mode they resolve to, sorted.
    pub fn content_types(&self) -> Vec<(&str, &str)> {
        let mut types: Vec<_> = self
            .aliases
            .iter()
            .map(|(ty, alias)| (ty.as_str(), alias.mode.as_str()))
            .collect();
        types.sort_unstable();
        types
    }
}

/// The lowercased content type without parameters.
fn essence(content_type: &str) -> EcoString {
    let head = content_type.split(';').next().unwrap_or_default();
    head.trim().to_ascii_lowercase().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn name_of(content_type: &str) -> &'static str {
        resolve(content_type, &Config::default()).unwrap().name()
    }

    #[test]
    fn test_resolve_builtin() {
        assert_eq!(name_of("text/css"), "css");
        assert_eq!(name_of("Text/HTML; charset=utf-8"), "htmlmixed");
        assert_eq!(name_of("application/xml"), "xml");
        assert_eq!(name_of("html"), "html");
        assert_eq!(name_of("javascript"), "javascript");
    }

    #[test]
    fn test_json_is_data_only() {
        let mode = resolve("application/json", &Config::default()).unwrap();
        let AnyMode::Script(script) = mode else { panic!("expected a script mode") };
        assert!(script.is_data_only());
    }

    #[test]
    fn test_unknown_content_type() {
        let err = resolve("text/x-brainfuck", &Config::default()).unwrap_err();
        assert_eq!(err, ModeError::UnknownContentType("text/x-brainfuck".into()));
    }

    #[test]
    fn test_fallback() {
        let config = Config::default();
        let mode = REGISTRY.resolve_or_fallback("image/svg+xml", &config).unwrap();
        assert_eq!(mode.name(), "xml");
        let mode = REGISTRY.resolve_or_fallback("application/xhtml", &config).unwrap();
        assert_eq!(mode.name(), "html");
        assert!(REGISTRY.resolve_or_fallback("text/plain", &config).is_err());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = Config { indent_unit: 0, ..Config::default() };
        let err = resolve("text/css", &config).unwrap_err();
        assert!(matches!(err, ModeError::InvalidOption { option: "indent-unit", .. }));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = Registry::new();
        assert!(registry.resolve("text/css", &Config::default()).is_err());
        registry.register("css", |config| Ok(StyleMode::new(config).into()));
        registry.alias("text/x-scss", "css", |config| config);
        let mode = registry.resolve("text/x-scss", &Config::default()).unwrap();
        assert_eq!(mode.name(), "css");
        assert_eq!(registry.content_types(), [("text/x-scss", "css")]);
    }

    #[test]
    fn test_factory_errors_propagate() {
        let mut registry = Registry::new();
        registry.register("odd", |config| {
            let style = StyleMode::new(config).into();
            MixedMode::new(config)?.with_embed("a b", style).map(Into::into)
        });
        registry.alias("text/x-odd", "odd", |config| config);
        let err = registry.resolve("text/x-odd", &Config::default()).unwrap_err();
        assert_eq!(err, ModeError::InvalidEmbed("a b".into()));
    }
}
