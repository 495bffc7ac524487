//! Generated version modules.
//!
//! Python packages built alongside a Rust crate can import their version from
//! a small module written at build time. The format is fixed:
//!
//! ```text
//!
//! # This file is automatically generated by setup.py.
//! __version__ = '1.0.dev2'
//! __sha__ = 'gfeeb'
//! ```

use std::path::Path;

use crate::error::ResolveError;
use crate::resolver::FileSystem;
use crate::version::Version;

/// Render the module text for `version`.
pub fn render_version_module(version: &Version) -> String {
    format!(
        "\n# This file is automatically generated by setup.py.\n__version__ = '{}'\n__sha__ = '{}'\n",
        version.version, version.sha
    )
}

/// Write the module for `version` to every path, replacing existing files.
pub fn write_version_modules<P: AsRef<Path>>(
    version: &Version,
    paths: &[P],
    fs: &dyn FileSystem,
) -> Result<(), ResolveError> {
    if paths.is_empty() {
        return Ok(());
    }

    let contents = render_version_module(version);
    for path in paths {
        let path = path.as_ref();
        fs.write(path, &contents)
            .map_err(|e| ResolveError::io(path, e))?;
        tracing::debug!(path = %path.display(), "wrote version module");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::ErrorKind;
    use crate::resolver::OsFileSystem;
    use crate::resolver::testing::RaisingFileSystem;

    #[test]
    fn test_render() {
        let version = Version::new("1.0.dev2", "2", "gfeeb");
        assert_eq!(
            render_version_module(&version),
            "\n# This file is automatically generated by setup.py.\n\
             __version__ = '1.0.dev2'\n\
             __sha__ = 'gfeeb'\n"
        );
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_version.py");
        fs::write(&path, "stale contents that are longer than the module").unwrap();

        let version = Version::new("1.0", "0", "gbeef");
        write_version_modules(&version, &[&path], &OsFileSystem).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            render_version_module(&version)
        );
    }

    #[test]
    fn test_write_failure_names_path() {
        let fs = RaisingFileSystem::default();
        let version = Version::new("1.0", "0", "gbeef");
        let err = write_version_modules(&version, &["foo.py", "bar.py"], &fs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("foo.py"));
        // The first failure stops the loop.
        assert_eq!(fs.writes.borrow().len(), 1);
    }
}
