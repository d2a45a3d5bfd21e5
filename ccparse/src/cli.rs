use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ccparse")]
#[command(about = "Query and extract facts from Cisco IOS configurations")]
pub struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the normalized line tree.
    Tree(TreeArgs),
    /// Find lines matching a regex, globally or among a parent's children.
    Find(FindArgs),
    /// Extract global and interface facts.
    Facts(FactsArgs),
    /// Expand or compress range expressions.
    Range(RangeArgs),
}

/// Options shared by the commands that read a configuration file.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Configuration file to read.
    pub file: PathBuf,
    /// Do not trim the input to the `version` .. `end` markers.
    #[arg(long)]
    pub no_trim: bool,
    /// Dialect TOML file replacing the built-in IOS dialect.
    #[arg(long)]
    pub dialect_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Restrict output to the section under this parent chain (repeatable, outermost first).
    #[arg(long = "parent")]
    pub parents: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Regex searched in each candidate line.
    pub regex: String,
    /// Only search the children of lines matching this regex.
    #[arg(long)]
    pub children_of: Option<String>,
    /// Capture group to print: an index, a name, or ALL.
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Parser, Debug)]
pub struct FactsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Keep absent values in the output instead of dropping them.
    #[arg(long)]
    pub complete: bool,
    /// Only report this interface (long or short name).
    #[arg(long)]
    pub interface: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RangeArgs {
    #[arg(value_enum)]
    pub action: RangeAction,
    /// Range expressions; all are combined into one range.
    #[arg(required = true)]
    pub exprs: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum RangeAction {
    Expand,
    Compress,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
