use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::diag::{ModeError, ModeResult, StrResult};

/// Options shared by all modes.
///
/// Parsed from a `mixmode.toml`-style file:
///
/// ```toml
/// indent-unit = 4
///
/// [markup]
/// lenient = true
///
/// [script]
/// globals = ["window", "document"]
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// How many columns one level of nesting indents by.
    pub indent_unit: usize,
    /// How many columns a tab character advances to.
    pub tab_size: usize,
    /// Markup mode options.
    pub markup: MarkupOptions,
    /// Script mode options.
    pub script: ScriptOptions,
}

/// Options for the markup mode.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MarkupOptions {
    /// Use the HTML-flavored tables: void elements, implicitly closed
    /// elements, unquoted attribute values and valueless attributes.
    pub lenient: bool,
    /// Indent lines that start a CDATA section to column zero.
    pub align_cdata: bool,
}

/// Options for the script mode.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScriptOptions {
    /// Only accept expressions and object literals, as in a data file.
    pub data_only: bool,
    /// Names that are bound before the first line.
    pub globals: Vec<EcoString>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_unit: 2,
            tab_size: 4,
            markup: MarkupOptions::default(),
            script: ScriptOptions::default(),
        }
    }
}

impl Config {
    /// The largest accepted indent unit and tab size.
    pub const MAX_WIDTH: usize = 16;

    /// Parse and validate a configuration from TOML.
    pub fn from_toml(src: &str) -> StrResult<Self> {
        let config: Self = toml::from_str(src)
            .map_err(|err| ecow::eco_format!("failed to parse configuration ({err})"))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> StrResult<String> {
        toml::to_string(self)
            .map_err(|err| ecow::eco_format!("failed to serialize configuration ({err})"))
    }

    /// Check that all options have usable values.
    pub fn validate(&self) -> ModeResult<()> {
        check_width("indent-unit", self.indent_unit)?;
        check_width("tab-size", self.tab_size)?;
        if let Some(name) = self.script.globals.iter().find(|name| !crate::script::is_ident(name)) {
            return Err(ModeError::InvalidOption {
                option: "script.globals",
                reason: ecow::eco_format!("`{name}` is not an identifier"),
            });
        }
        Ok(())
    }

    /// The same configuration with the markup variant changed.
    pub fn with_lenient_markup(mut self, lenient: bool) -> Self {
        self.markup.lenient = lenient;
        self
    }

    /// The same configuration with data-only scripts toggled.
    pub fn with_data_only(mut self, data_only: bool) -> Self {
        self.script.data_only = data_only;
        self
    }
}

fn check_width(option: &'static str, value: usize) -> ModeResult<()> {
    if value == 0 || value > Config::MAX_WIDTH {
        return Err(ModeError::InvalidOption {
            option,
            reason: ecow::eco_format!("must be between 1 and {}, found {value}", Config::MAX_WIDTH),
        });
    }
    Ok(())
}
