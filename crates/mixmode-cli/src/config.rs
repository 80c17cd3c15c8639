use std::fs;
use std::path::Path;

use ecow::eco_format;
use mixmode_syntax::Config;
use mixmode_syntax::diag::StrResult;

/// Load the configuration from a file, if given, and apply commandline
/// overrides.
pub fn load(path: Option<&Path>, indent_unit: Option<usize>) -> StrResult<Config> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|err| {
                eco_format!("failed to read configuration file {} ({err})", path.display())
            })?;
            Config::from_toml(&text)?
        }
        None => Config::default(),
    };

    if let Some(unit) = indent_unit {
        config.indent_unit = unit;
    }

    config.validate()?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}
