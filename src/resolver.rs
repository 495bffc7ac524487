//! Version resolution from version control, with a cached fallback.
//!
//! [`find_version`] runs the configured command (by default
//! `git describe --tags --long`) and parses its output into a [`Version`].
//! Every successful resolution is written to a version file so that builds
//! from a source tarball, where there is no history to describe, can still
//! recover the version.
//!
//! Process spawning and file access go through [`CommandRunner`] and
//! [`FileSystem`], so tests can substitute either without touching the
//! resolution logic.

use std::fs;
use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::process::{
    Command,
    Stdio,
};

use bstr::ByteSlice;

use crate::config::{
    ResolverConfig,
    current_dir,
    translate_separators,
};
use crate::error::{
    ResolveError,
    VersionSource,
};
use crate::version::{
    Descriptor,
    Version,
};
use crate::version_module::write_version_modules;

/// Captured output of a version-control command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Spawns the version-control command.
///
/// An `Err` means the process could not be started at all. The exit status
/// of a process that did start is not reported.
pub trait CommandRunner {
    fn run(&self, args: &[String]) -> io::Result<CommandOutput>;
}

impl<F> CommandRunner for F
where
    F: Fn(&[String]) -> io::Result<CommandOutput>,
{
    fn run(&self, args: &[String]) -> io::Result<CommandOutput> {
        self(args)
    }
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, args: &[String]) -> io::Result<CommandOutput> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let output = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .output()?;
        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// File access used for the version file and version modules.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    /// Create or truncate `path` and write `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Resolve a version with the real process runner and filesystem.
pub fn find_version_default(config: &ResolverConfig) -> Result<Version, ResolveError> {
    find_version(config, &SystemCommandRunner, &OsFileSystem)
}

/// Resolve the version described by `config`.
///
/// # Errors
///
/// - [`ResolveError::VcsUnavailableNoFallback`] when the command produced no
///   output and the version file is disabled
/// - [`ResolveError::VcsUnavailableNoCache`] when the command produced no
///   output and the version file does not exist
/// - [`ResolveError::UnparsableVersion`] when the descriptor, from either
///   source, is not `<tag>-<commits>-<sha>`
/// - [`ResolveError::Io`] when the version file or a version module cannot be
///   read or written
pub fn find_version(
    config: &ResolverConfig,
    runner: &dyn CommandRunner,
    fs: &dyn FileSystem,
) -> Result<Version, ResolveError> {
    let root = config.resolved_root();
    let version_file = config.resolved_version_file(&root);
    let args = expand_vcs_args(&config.vcs_args, &current_dir(), &root);

    tracing::debug!(?args, "running version-control command");
    let (stdout, vcs_output) = match runner.run(&args) {
        Ok(output) => (
            output.stdout.trim().to_str_lossy().into_owned(),
            Some(output.stderr.trim().to_str_lossy().into_owned()).filter(|s| !s.is_empty()),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "failed to spawn version-control command");
            (String::new(), None)
        }
    };

    // Diagnostics name the version file as configured; I/O uses the
    // anchored path.
    let (raw, cached_text, source) = if stdout.is_empty() {
        let (Some(version_file), Some(configured)) =
            (version_file.as_ref(), config.version_file.as_ref())
        else {
            return Err(ResolveError::VcsUnavailableNoFallback { args, vcs_output });
        };
        if !fs.exists(version_file) {
            return Err(ResolveError::VcsUnavailableNoCache {
                args,
                version_file: configured.clone(),
                vcs_output,
            });
        }
        tracing::info!(
            version_file = %version_file.display(),
            "couldn't determine version from VCS; using version file"
        );
        let cached = fs
            .read_to_string(version_file)
            .map_err(|e| ResolveError::io(version_file, e))?;
        (
            cached.trim().to_string(),
            Some(cached),
            VersionSource::VersionFile(configured.clone()),
        )
    } else {
        (stdout, None, VersionSource::Vcs)
    };

    let Some(version) =
        Descriptor::parse(&raw).map(|descriptor| descriptor.into_version(config.include_dev_version))
    else {
        // VCS output is only worth showing when VCS is what failed.
        let vcs_output = match source {
            VersionSource::Vcs => None,
            VersionSource::VersionFile(_) => vcs_output,
        };
        return Err(ResolveError::UnparsableVersion {
            raw: raw.clone(),
            origin: source,
            vcs_output,
        });
    };

    // A descriptor read from the version file goes back exactly as it was
    // read, surrounding whitespace included.
    if let Some(version_file) = &version_file {
        let contents = cached_text.as_deref().unwrap_or(&raw);
        fs.write(version_file, contents)
            .map_err(|e| ResolveError::io(version_file, e))?;
        tracing::debug!(version_file = %version_file.display(), raw = %contents, "cached version descriptor");
    }

    let module_paths = config.resolved_version_module_paths(&root);
    write_version_modules(&version, &module_paths, fs)?;

    Ok(version)
}

/// Apply separator translation and `%(pwd)s` / `%(root)s` substitution.
fn expand_vcs_args(args: &[String], pwd: &Path, root: &Path) -> Vec<String> {
    let pwd = pwd.to_string_lossy();
    let root = root.to_string_lossy();
    args.iter()
        .map(|arg| {
            translate_separators(arg)
                .replace("%(pwd)s", &pwd)
                .replace("%(root)s", &root)
        })
        .collect()
}

/// The version file a resolution with `config` reads and writes.
pub fn version_file_for(config: &ResolverConfig) -> Option<PathBuf> {
    config.resolved_version_file(&config.resolved_root())
}
