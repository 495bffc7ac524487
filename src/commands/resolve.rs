//! Resolve the version of a project from version control.
//!
//! # Examples
//!
//! ```bash
//! # Print the version (e.g. "1.0.dev2"), caching it to ./version.txt
//! cargo vcversioner
//!
//! # Read options from [package.metadata.vcversioner]
//! cargo vcversioner --manifest ./Cargo.toml
//!
//! # JSON output with commits and sha
//! cargo vcversioner --format json
//!
//! # Use a different command
//! cargo vcversioner -- hg log -r . --template "{latesttag}-{latesttagdistance}-{node|short}"
//! ```

use std::io::{
    self,
    Write,
};
use std::path::PathBuf;

use anyhow::{
    Context,
    Result,
};
use clap::Parser;

use crate::config::{
    ResolverConfig,
    current_dir,
    load_manifest_config,
};
use crate::resolver::{
    CommandRunner,
    FileSystem,
    OsFileSystem,
    SystemCommandRunner,
    find_version,
};
use crate::version::Version;

/// Arguments for resolving a version.
#[derive(Parser, Debug, Default)]
pub struct ResolveArgs {
    /// Report the bare tag even when there are commits since it.
    #[arg(long, env = "VCVERSIONER_NO_DEV_VERSION")]
    pub no_dev_version: bool,

    /// File caching the last descriptor, relative to the root.
    ///
    /// Defaults to `version.txt`.
    #[arg(long, env = "VCVERSIONER_VERSION_FILE", conflicts_with = "no_version_file")]
    pub version_file: Option<PathBuf>,

    /// Neither read nor write a version file.
    #[arg(long)]
    pub no_version_file: bool,

    /// Project root. Defaults to the manifest directory when `--manifest` is
    /// given, otherwise the current directory.
    #[arg(long, env = "VCVERSIONER_ROOT")]
    pub root: Option<PathBuf>,

    /// Write a version module to this path (repeatable).
    #[arg(long = "version-module", value_name = "PATH")]
    pub version_modules: Vec<PathBuf>,

    /// Cargo.toml whose `[package.metadata.vcversioner]` table supplies
    /// defaults. Command-line options override it.
    #[arg(long, env = "VCVERSIONER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Output format.
    ///
    /// - `version`: just the version (e.g. "1.0.dev2")
    /// - `json`: JSON with version, commits and sha fields
    /// - `env`: `VCVERSIONER_*=` lines suitable for a dotenv file
    #[arg(long, default_value = "version")]
    pub format: String,

    /// Command printing `<tag>-<commits>-<sha>`.
    ///
    /// Defaults to `git describe --tags --long`.
    #[arg(last = true, value_name = "COMMAND")]
    pub vcs_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Version,
    Json,
    Env,
}

impl OutputFormat {
    fn parse(format: &str) -> Result<Self> {
        match format {
            "version" => Ok(Self::Version),
            "json" => Ok(Self::Json),
            "env" => Ok(Self::Env),
            _ => anyhow::bail!("Invalid format: {}", format),
        }
    }
}

/// Resolve the version and print it.
///
/// # Errors
///
/// Returns an error if:
/// - The format is not one of `version`, `json` or `env`
/// - The manifest cannot be read or its metadata table is invalid
/// - The version cannot be resolved; the error is a
///   [`ResolveError`](crate::error::ResolveError) the caller can downcast to
///   pick the exit status
pub fn resolve(args: ResolveArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    resolve_with(args, &SystemCommandRunner, &OsFileSystem, &mut out)
}

pub(crate) fn resolve_with<W: Write>(
    args: ResolveArgs,
    runner: &dyn CommandRunner,
    fs: &dyn FileSystem,
    out: &mut W,
) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    let config = build_config(args)?;
    let version = find_version(&config, runner, fs)?;
    print_version(out, &version, format)
}

fn build_config(args: ResolveArgs) -> Result<ResolverConfig> {
    let mut config = match &args.manifest {
        Some(manifest) => {
            let bag = load_manifest_config(manifest)?;
            let mut config = ResolverConfig::from_bag(bag)
                .with_context(|| format!("Invalid configuration in {}", manifest.display()))?;
            // A bare `Cargo.toml` has an empty parent.
            let manifest_dir = manifest
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(current_dir);
            config.root = Some(match config.root.take() {
                Some(root) => manifest_dir.join(root),
                None => manifest_dir,
            });
            config
        }
        None => ResolverConfig::default(),
    };

    if args.no_dev_version {
        config.include_dev_version = false;
    }
    if args.no_version_file {
        config.version_file = None;
    } else if let Some(version_file) = args.version_file {
        config.version_file = Some(version_file);
    }
    if let Some(root) = args.root {
        config.root = Some(root);
    }
    if !args.version_modules.is_empty() {
        config.version_module_paths = args.version_modules;
    }
    if !args.vcs_args.is_empty() {
        config.vcs_args = args.vcs_args;
    }

    Ok(config)
}

fn print_version<W: Write>(out: &mut W, version: &Version, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Version => writeln!(out, "{}", version)?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            serde_json::to_string(version).context("Failed to serialize version")?
        )?,
        OutputFormat::Env => {
            writeln!(out, "VCVERSIONER_VERSION={}", version.version)?;
            writeln!(out, "VCVERSIONER_COMMITS={}", version.commits)?;
            writeln!(out, "VCVERSIONER_SHA={}", version.sha)?;
        }
    }
    Ok(())
}
