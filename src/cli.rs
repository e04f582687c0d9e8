use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default file name of the generated attribution document
pub const DEFAULT_OUTPUT: &str = "licenses.md";

/// License attribution and compliance for Python lock files
#[derive(Parser, Debug)]
#[command(name = "license-tracker")]
#[command(version)]
#[command(
    about = "Resolve open source licenses of Python dependencies, render an attribution document and check license policies",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Markdown attribution document
    Gen(GenArgs),
    /// Check dependency licenses against an allow list or a deny list
    Check(CheckArgs),
    /// Inspect or maintain the license cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,

        /// Cache database location
        #[arg(long, global = true, value_name = "PATH")]
        cache_path: Option<PathBuf>,

        /// Path to a license-tracker.config.yml file
        #[arg(short, long, global = true, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Flags shared by every command that resolves licenses
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Lock file to scan: poetry.lock, Pipfile.lock or requirements*.txt
    #[arg(short, long, value_name = "FILE")]
    pub scan: PathBuf,

    /// GitHub token used for license file lookups
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Neither read nor update the license cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache database location
    #[arg(long, value_name = "PATH")]
    pub cache_path: Option<PathBuf>,

    /// Maximum number of packages resolved at the same time
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Path to a license-tracker.config.yml file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Output file, or '-' for stdout (default: licenses.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include the scanned project itself (reserved, currently ignored)
    #[arg(long)]
    pub include_root: bool,

    /// Custom Tera (Jinja2-style) template for the document
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("policy").args(["forbidden", "allowed"]).multiple(false)))]
pub struct CheckArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Comma-separated SPDX ids that must not appear
    #[arg(long, value_name = "LICENSES")]
    pub forbidden: Option<String>,

    /// Comma-separated SPDX ids that are the only ones permitted
    #[arg(long, value_name = "LICENSES")]
    pub allowed: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    /// Print the cache location, entry count and size
    Show,
    /// Remove all entries, one package, or one package version
    Clear {
        package: Option<String>,
        #[arg(requires = "package")]
        version: Option<String>,
    },
    /// Remove expired entries now
    Purge,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
