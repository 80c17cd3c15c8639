use std::process::ExitCode;

use mixmode_syntax::diag::StrResult;

use mixmode_cli::args::Command;
use mixmode_cli::{ARGS, EXIT, print_error, set_failed};

/// Entry point.
fn main() -> ExitCode {
    mixmode_cli::tracing::setup_tracing(&ARGS);

    if let Err(msg) = dispatch() {
        set_failed();
        if print_error(&msg).is_err() {
            return ExitCode::FAILURE;
        }
    }

    EXIT.with(|cell| cell.get())
}

/// Execute the requested command.
fn dispatch() -> StrResult<()> {
    let config = mixmode_cli::config::load(ARGS.config.as_deref(), ARGS.indent_unit)?;

    match &ARGS.command {
        Command::Highlight(command) => mixmode_cli::highlight::highlight(command, &config)?,
        Command::Indent(command) => mixmode_cli::indent::indent(command, &config)?,
        Command::Modes => mixmode_cli::modes::modes()?,
    }

    Ok(())
}
