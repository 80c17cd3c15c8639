use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use ecow::eco_format;
use mixmode_syntax::diag::{StrResult, bail};
use mixmode_syntax::{AnyMode, Config, REGISTRY};

use crate::args::SharedArgs;

/// Read the input file, or standard input for `-`.
pub fn read(path: &Path) -> StrResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| eco_format!("failed to read from stdin ({err})"))?;
        return Ok(text);
    }

    fs::read_to_string(path)
        .map_err(|err| eco_format!("failed to read input file {} ({err})", path.display()))
}

/// Write the output to a file, or standard output if no path is given.
pub fn write(path: Option<&Path>, output: &[u8]) -> StrResult<()> {
    match path {
        Some(path) => fs::write(path, output).map_err(|err| {
            eco_format!("failed to write output file {} ({err})", path.display())
        }),
        None => io::stdout()
            .lock()
            .write_all(output)
            .map_err(|err| eco_format!("failed to write to stdout ({err})")),
    }
}

/// Resolve the mode for the input, by explicit content type or by the
/// input's file extension.
pub fn mode(args: &SharedArgs, config: &Config) -> StrResult<AnyMode> {
    let content_type = match &args.content_type {
        Some(ty) => ty.as_str(),
        None => infer_content_type(&args.input)?,
    };
    Ok(REGISTRY.resolve_or_fallback(content_type, config)?)
}

/// Guess the content type from a file extension.
pub fn infer_content_type(path: &Path) -> StrResult<&'static str> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    Ok(match ext.as_str() {
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "text/javascript",
        "json" => "application/json",
        "xml" | "xsl" | "xsd" | "rss" => "application/xml",
        "svg" => "image/svg+xml",
        "xhtml" => "application/xhtml+xml",
        "html" | "htm" => "text/html",
        _ => bail!(
            "cannot infer the content type of {}, pass it with --type",
            path.display()
        ),
    })
}
