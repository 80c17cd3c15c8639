use std::io::{self, Write};

use codespan_reporting::term::termcolor::{Ansi, WriteColor};
use ecow::eco_format;
use mixmode_syntax::diag::StrResult;
use mixmode_syntax::{Config, Mode};

use crate::args::{HighlightCommand, OutputFormat};
use crate::{ARGS, input, terminal};

/// Execute a highlight command.
pub fn highlight(command: &HighlightCommand, config: &Config) -> StrResult<()> {
    let text = input::read(&command.common.input)?;
    let mode = input::mode(&command.common, config)?;
    tracing::info!(mode = mode.name(), format = %command.format, "highlighting");

    let output = command.output.as_deref();
    match command.format {
        OutputFormat::Html => {
            let mut html = mixmode_syntax::highlight_html(&mode, &text);
            html.push('\n');
            input::write(output, html.as_bytes())
        }
        OutputFormat::Json => {
            let lines = mixmode_syntax::highlight(&mode, &text);
            let mut json = serde_json::to_string_pretty(&lines)
                .map_err(|err| eco_format!("failed to serialize tokens ({err})"))?;
            json.push('\n');
            input::write(output, json.as_bytes())
        }
        OutputFormat::Ansi if output.is_some() => {
            let mut buf = Ansi::new(Vec::new());
            write_ansi(&mut buf, &mode, &text)
                .map_err(|err| eco_format!("failed to color output ({err})"))?;
            input::write(output, &buf.into_inner())
        }
        OutputFormat::Ansi => {
            let mut out = terminal::out(ARGS.color);
            write_ansi(&mut out, &mode, &text)
                .map_err(|err| eco_format!("failed to write to stdout ({err})"))
        }
    }
}

/// Write the text with each token in its class's terminal style.
pub fn write_ansi<M: Mode>(w: &mut impl WriteColor, mode: &M, text: &str) -> io::Result<()> {
    for tokens in mixmode_syntax::highlight(mode, text) {
        for token in tokens {
            match token.class {
                Some(class) => {
                    w.set_color(&terminal::style(class))?;
                    write!(w, "{}", token.text)?;
                    w.reset()?;
                }
                None => write!(w, "{}", token.text)?,
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use codespan_reporting::term::termcolor::NoColor;
    use mixmode_syntax::StyleMode;

    use super::*;

    #[test]
    fn test_write_ansi() {
        let mode = StyleMode::new(&Config::default());

        let mut plain = NoColor::new(Vec::new());
        write_ansi(&mut plain, &mode, "p { color: red }").unwrap();
        assert_eq!(String::from_utf8(plain.into_inner()).unwrap(), "p { color: red }\n");

        let mut colored = Ansi::new(Vec::new());
        write_ansi(&mut colored, &mode, "p {}").unwrap();
        let colored = String::from_utf8(colored.into_inner()).unwrap();
        assert!(colored.contains("\x1b["));
        assert!(colored.contains('p'));
    }
}
