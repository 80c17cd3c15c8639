use std::io::IsTerminal;

use codespan_reporting::term::termcolor::{self, ColorChoice, ColorSpec, StandardStream};
use mixmode_syntax::Class;

/// A colored handle to standard error.
pub fn err(choice: clap::ColorChoice) -> StandardStream {
    StandardStream::stderr(color_choice(choice, std::io::stderr().is_terminal()))
}

/// A colored handle to standard output.
pub fn out(choice: clap::ColorChoice) -> StandardStream {
    StandardStream::stdout(color_choice(choice, std::io::stdout().is_terminal()))
}

/// Resolve the user's color choice for a stream.
pub fn color_choice(choice: clap::ColorChoice, is_terminal: bool) -> ColorChoice {
    match choice {
        clap::ColorChoice::Auto if is_terminal => ColorChoice::Auto,
        clap::ColorChoice::Always => ColorChoice::Always,
        _ => ColorChoice::Never,
    }
}

/// The terminal style for a highlighting class.
pub fn style(class: Class) -> ColorSpec {
    use termcolor::Color::*;

    let mut spec = ColorSpec::new();
    match class {
        Class::Comment => spec.set_fg(Some(Black)).set_intense(true).set_italic(true),
        Class::Keyword => spec.set_fg(Some(Magenta)).set_bold(true),
        Class::Atom | Class::Number => spec.set_fg(Some(Cyan)),
        Class::Def => spec.set_fg(Some(Blue)).set_bold(true),
        Class::Variable => spec.set_fg(None),
        Class::LocalVariable => spec.set_fg(Some(Blue)),
        Class::Property | Class::Attribute => spec.set_fg(Some(Yellow)),
        Class::String | Class::String2 => spec.set_fg(Some(Green)),
        Class::Meta => spec.set_fg(Some(White)).set_dimmed(true),
        Class::Tag => spec.set_fg(Some(Blue)).set_intense(true),
        Class::Error => spec.set_fg(Some(Red)).set_underline(true),
    };
    spec
}
