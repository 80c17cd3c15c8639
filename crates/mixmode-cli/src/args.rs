use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::{ArgAction, Args, ColorChoice, Parser, Subcommand, ValueEnum};

/// Highlights and indents markup, style sheets and scripts.
#[derive(Debug, Clone, Parser)]
#[clap(name = "mixmode", version, author)]
pub struct CliArguments {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,

    /// Sets the level of logging verbosity:
    /// -v = warning & error, -vv = info, -vvv = debug, -vvvv = trace
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Path to a TOML configuration file
    #[clap(long = "config", env = "MIXMODE_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured indent unit
    #[clap(long = "indent-unit", value_name = "N", global = true)]
    pub indent_unit: Option<usize>,

    /// Whether to use color. `auto` uses color if standard error is a terminal
    #[clap(long, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,
}

/// What to do.
#[derive(Debug, Clone, Subcommand)]
#[command()]
pub enum Command {
    /// Tokenizes an input file and prints it highlighted
    #[command(visible_alias = "hl")]
    Highlight(HighlightCommand),

    /// Reindents an input file
    Indent(IndentCommand),

    /// Lists the registered modes and content types
    Modes,
}

/// Tokenizes an input file and prints it highlighted
#[derive(Debug, Clone, Parser)]
pub struct HighlightCommand {
    /// Shared arguments.
    #[clap(flatten)]
    pub common: SharedArgs,

    /// The format to emit the highlighted text in
    #[clap(long = "format", short = 'f', default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Path to the output file. Defaults to standard output
    #[clap(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Reindents an input file
#[derive(Debug, Clone, Parser)]
pub struct IndentCommand {
    /// Shared arguments.
    #[clap(flatten)]
    pub common: SharedArgs,

    /// Overwrites the input file instead of printing the result
    #[clap(long = "in-place", short = 'i')]
    pub in_place: bool,
}

/// Common arguments of highlight and indent.
#[derive(Debug, Clone, Args)]
pub struct SharedArgs {
    /// Path to the input file. Use `-` to read from standard input
    pub input: PathBuf,

    /// The content type or mode name of the input, e.g. `text/html`.
    /// Inferred from the file extension if absent
    #[clap(long = "type", short = 't', value_name = "TYPE")]
    pub content_type: Option<String>,
}

/// Which format to emit highlighted text in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// A `<pre>` block with one `<span>` per token.
    Html,
    /// The tokens of each line as JSON.
    Json,
    /// Text colored with terminal escape sequences.
    Ansi,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Ansi => "ansi",
        })
    }
}
