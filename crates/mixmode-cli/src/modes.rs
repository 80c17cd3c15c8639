use std::io::{self, Write};

use ecow::eco_format;
use mixmode_syntax::REGISTRY;
use mixmode_syntax::diag::StrResult;

/// Execute a modes command.
pub fn modes() -> StrResult<()> {
    let mut out = io::stdout().lock();
    list(&mut out).map_err(|err| eco_format!("failed to write to stdout ({err})"))
}

/// List the modes and the content types that resolve to them.
fn list(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Modes:")?;
    for name in REGISTRY.modes() {
        writeln!(out, "  {name}")?;
    }
    writeln!(out, "\nContent types:")?;
    for (ty, mode) in REGISTRY.content_types() {
        writeln!(out, "  {ty:<24} {mode}")?;
    }
    Ok(())
}
