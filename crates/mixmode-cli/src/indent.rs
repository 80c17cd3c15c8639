use mixmode_syntax::diag::StrResult;
use mixmode_syntax::{Config, Mode};

use crate::args::IndentCommand;
use crate::input;

/// Execute an indent command.
pub fn indent(command: &IndentCommand, config: &Config) -> StrResult<()> {
    let text = input::read(&command.common.input)?;
    let mode = input::mode(&command.common, config)?;
    tracing::info!(mode = mode.name(), in_place = command.in_place, "reindenting");

    let fixed = mixmode_syntax::reindent(&mode, &text);
    let target = command.in_place.then_some(command.common.input.as_path());
    if target.is_some() && fixed == text {
        tracing::info!("already indented");
        return Ok(());
    }
    input::write(target, fixed.as_bytes())
}
