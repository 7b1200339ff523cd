use clap::{CommandFactory, Parser};
use log::error;
use std::io::{self, Write};
use std::process;

mod cli;
mod commands;
mod config;
mod consent;
mod engine;
mod error;
mod output;
mod registry;
mod resolver;
mod scope;
mod test_support;
mod xdg;

// Build info module
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

use cli::Cli;
use commands::CommandContext;
use consent::TerminalConsent;
use engine::RunOptions;
use xdg::XdgDirs;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

fn main() {
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        process::exit(0);
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = registry::platform();
    let mut consent = TerminalConsent;
    let mut stdout = io::stdout().lock();

    let mut ctx = CommandContext {
        registry: registry.as_ref(),
        consent: &mut consent,
        out: &mut stdout,
        options: RunOptions {
            assume_yes: cli.assume_yes,
            dry_run: cli.dry_run,
        },
        format: cli.format,
        config_home: XdgDirs::from_env().config_home,
    };

    let code = match commands::dispatch(cli.command, &mut ctx) {
        Ok(exit) => exit.code(),
        Err(err) => {
            error!("{err:#}");
            1
        }
    };
    process::exit(code);
}
