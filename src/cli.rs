use crate::output::OutputFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dooti",
    version = crate::built_info::PKG_VERSION,
    about = "Manage default handlers for file extensions, URI schemes and UTIs",
    long_about = None
)]
pub struct Cli {
    /// The output format.
    #[arg(short, long, value_enum, global = true, default_value = "yaml")]
    pub format: OutputFormat,

    /// Do not ask for consent, assume yes.
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Only show planned changes and exit.
    #[arg(short = 't', long, global = true)]
    pub dry_run: bool,

    /// Verbose logging; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Apply a YAML state configuration.
    Apply(ApplyArgs),
    /// Manage the default handler for all UTIs associated with file extensions.
    Ext(ExtArgs),
    /// Manage the default handler for URI schemes.
    Scheme(TargetArgs),
    /// Manage the default handler for UTIs.
    Uti(TargetArgs),
    /// Generate shell completion scripts.
    Completions(CompletionsArgs),
    /// Show build information.
    BuildInfo,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ApplyArgs {
    /// Configuration to apply. If unspecified, searches in $XDG_CONFIG_HOME.
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Allow unregistered file extensions / dynamic UTIs.
    #[arg(short = 'u', long)]
    pub dynamic: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TargetArgs {
    /// Identifier(s) to operate on.
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Application to set as handler: absolute path, bundle identifier or name.
    /// Without it, the current handlers are shown.
    #[arg(short = 'x', long)]
    pub handler: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExtArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Allow unregistered file extensions / dynamic UTIs.
    #[arg(short = 'u', long)]
    pub dynamic: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of standard output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Binary name the completions are registered for.
    #[arg(long, default_value = "dooti")]
    pub bin_name: String,
}

pub fn show_build_info() {
    println!("Version: {}", crate::built_info::PKG_VERSION);
    println!("Built: {}", crate::built_info::BUILT_TIME_UTC);

    match crate::built_info::GIT_COMMIT_HASH_SHORT {
        Some(hash) => println!("Commit: {hash}"),
        None => println!("Commit: unknown"),
    }
    if let Some(dirty) = crate::built_info::GIT_DIRTY {
        println!("Git status: {}", if dirty { "dirty" } else { "clean" });
    }

    println!("Target: {}", crate::built_info::TARGET);
    println!("Rustc: {}", crate::built_info::RUSTC_VERSION);
    println!("Profile: {}", crate::built_info::PROFILE);
}
