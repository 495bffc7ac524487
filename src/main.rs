//! Cargo subcommand that derives a version from version-control tags.
//!
//! Runs `git describe --tags --long` (or a configured command), turns its
//! `<tag>-<commits>-<sha>` output into a version such as `1.0.dev2`, and
//! caches the descriptor in `version.txt` for builds from a tarball that has
//! no history.
//!
//! Resolution failures print `vcversioner:`-prefixed diagnostics to stdout and
//! exit with status 2.

use std::process::ExitCode;

use cargo_vcversioner::commands::{
    self,
    ResolveArgs,
};
use cargo_vcversioner::{
    ResolveError,
    diagnostics,
};
use clap::{
    CommandFactory,
    Parser,
    Subcommand,
};

#[derive(Parser, Debug)]
#[command(bin_name = "cargo", arg_required_else_help = false)]
struct CargoArgs {
    #[command(subcommand)]
    subcmd: Option<TopCommand>,
}

#[derive(Subcommand, Debug)]
enum TopCommand {
    /// Derive the package version from version-control tags
    #[command(name = "vcversioner", version)]
    Vcversioner(VcversionerCli),
}

#[derive(Parser, Debug)]
struct VcversionerCli {
    #[command(flatten)]
    resolve: ResolveArgs,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let args = CargoArgs::parse();

    let Some(TopCommand::Vcversioner(cli)) = args.subcmd else {
        // No subcommand: show help
        if let Err(e) = CargoArgs::command().print_help() {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        println!();
        return ExitCode::SUCCESS;
    };

    match commands::resolve(cli.resolve) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ResolveError>() {
            Some(resolve_err) => {
                diagnostics::report(resolve_err);
                ExitCode::from(resolve_err.exit_code())
            }
            None => {
                eprintln!("Error: {:?}", err);
                ExitCode::FAILURE
            }
        },
    }
}
