use anyhow::Result;
use clap::Parser;

mod cli;
mod facts_cmd;
mod find_cmd;
mod range_cmd;
mod source;
mod tree_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Tree(args) => tree_cmd::run_tree(args),
        Command::Find(args) => find_cmd::run_find(args),
        Command::Facts(args) => facts_cmd::run_facts(args),
        Command::Range(args) => range_cmd::run_range(args),
    }
}

/// `RUST_LOG` wins when set; otherwise each `-v` raises the level one step
/// from errors only.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
