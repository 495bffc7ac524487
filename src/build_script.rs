//! Helpers for resolving a version from a Cargo build script.
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     cargo_vcversioner::build_script::emit_cargo_version();
//! }
//! ```
//!
//! The crate can then read `env!("VCVERSIONER_VERSION")`,
//! `env!("VCVERSIONER_COMMITS")` and `env!("VCVERSIONER_SHA")`.

use std::env;
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process;

use crate::config::{
    ResolverConfig,
    load_manifest_config,
};
use crate::diagnostics;
use crate::error::ResolveError;
use crate::resolver::{
    CommandRunner,
    FileSystem,
    OsFileSystem,
    SystemCommandRunner,
    find_version,
};
use crate::version::Version;

/// A version resolved for a package, with the files a build should watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion {
    pub version: Version,
    pub root: PathBuf,
    pub version_file: Option<PathBuf>,
}

/// Resolve the version of the package whose manifest lives in
/// `manifest_dir`.
///
/// The configuration bag comes from the manifest's
/// `[package.metadata.vcversioner]` table. Unless the bag names a root, the
/// manifest directory is the root.
pub fn resolve_for_build(
    manifest_dir: &Path,
    runner: &dyn CommandRunner,
    fs: &dyn FileSystem,
) -> Result<BuildVersion, ResolveError> {
    let bag = load_manifest_config(&manifest_dir.join("Cargo.toml"))?;
    let mut config = ResolverConfig::from_bag(bag)?;
    let root = match config.root.take() {
        Some(root) => manifest_dir.join(root),
        None => manifest_dir.to_path_buf(),
    };
    config.root = Some(root.clone());

    let version = find_version(&config, runner, fs)?;
    Ok(BuildVersion {
        version,
        version_file: config.resolved_version_file(&root),
        root,
    })
}

/// Write the `cargo:` directives for `build`.
pub fn write_cargo_directives<W: Write>(out: &mut W, build: &BuildVersion) -> io::Result<()> {
    let version = &build.version;
    writeln!(out, "cargo:rustc-env=VCVERSIONER_VERSION={}", version.version)?;
    writeln!(out, "cargo:rustc-env=VCVERSIONER_COMMITS={}", version.commits)?;
    writeln!(out, "cargo:rustc-env=VCVERSIONER_SHA={}", version.sha)?;
    writeln!(
        out,
        "cargo:rerun-if-changed={}",
        build.root.join(".git").join("HEAD").display()
    )?;
    writeln!(
        out,
        "cargo:rerun-if-changed={}",
        build.root.join(".git").join("refs").display()
    )?;
    if let Some(version_file) = &build.version_file {
        writeln!(out, "cargo:rerun-if-changed={}", version_file.display())?;
    }
    Ok(())
}

/// Resolve the version of the package being built and hand it to Cargo.
///
/// On failure the diagnostics are printed and the build script exits, with
/// status 2 for resolution failures.
#[allow(clippy::disallowed_methods)] // build scripts read Cargo's env directly
pub fn emit_cargo_version() -> Version {
    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match resolve_for_build(&manifest_dir, &SystemCommandRunner, &OsFileSystem) {
        Ok(build) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = write_cargo_directives(&mut out, &build) {
                eprintln!("failed to write cargo directives: {}", e);
                process::exit(1);
            }
            build.version
        }
        Err(err) => {
            diagnostics::report(&err);
            process::exit(i32::from(err.exit_code()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::ErrorKind;
    use crate::resolver::testing::FakeRunner;

    fn package(metadata: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            format!(
                "[package]\nname = \"demo\"\nversion = \"0.0.0\"\n\n{}",
                metadata
            ),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_resolve_uses_manifest_dir_as_root() {
        let dir = package("");
        let build =
            resolve_for_build(dir.path(), &FakeRunner::new(b"1.0-2-gfeeb"), &OsFileSystem)
                .unwrap();
        assert_eq!(build.version, Version::new("1.0.dev2", "2", "gfeeb"));
        assert_eq!(build.root, dir.path());
        assert_eq!(build.version_file, Some(dir.path().join("version.txt")));
        assert_eq!(
            fs::read_to_string(dir.path().join("version.txt")).unwrap(),
            "1.0-2-gfeeb"
        );
    }

    #[test]
    fn test_resolve_reads_manifest_metadata() {
        let dir = package(
            "[package.metadata.vcversioner]\ninclude-dev-version = false\nversion-file = false\n",
        );
        let build =
            resolve_for_build(dir.path(), &FakeRunner::new(b"1.0-2-gfeeb"), &OsFileSystem)
                .unwrap();
        assert_eq!(build.version, Version::new("1.0", "2", "gfeeb"));
        assert_eq!(build.version_file, None);
        assert!(!dir.path().join("version.txt").exists());
    }

    #[test]
    fn test_resolve_failure() {
        let dir = package("");
        let err = resolve_for_build(dir.path(), &FakeRunner::new(b""), &OsFileSystem).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VcsUnavailableNoCache);
    }

    #[test]
    fn test_directives() {
        let build = BuildVersion {
            version: Version::new("1.0.dev2", "2", "gfeeb"),
            root: PathBuf::from("/project"),
            version_file: Some(PathBuf::from("/project/version.txt")),
        };
        let mut out = Vec::new();
        write_cargo_directives(&mut out, &build).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cargo:rustc-env=VCVERSIONER_VERSION=1.0.dev2");
        assert_eq!(lines[1], "cargo:rustc-env=VCVERSIONER_COMMITS=2");
        assert_eq!(lines[2], "cargo:rustc-env=VCVERSIONER_SHA=gfeeb");
        assert_eq!(lines.len(), 6);
        assert!(lines[5].ends_with("version.txt"));
    }
}
