//! Resolver configuration and the distribution adapter.
//!
//! Configuration arrives as a generic key/value bag, usually the
//! `[package.metadata.vcversioner]` table of a Cargo manifest:
//!
//! ```toml
//! [package.metadata.vcversioner]
//! include-dev-version = false
//! version-file = "version.txt"      # or `false` to disable caching
//! vcs-args = ["git", "describe", "--tags", "--long"]
//! version-module-paths = ["src/_version.py"]
//! ```

use std::env;
use std::fs;
use std::path::{
    MAIN_SEPARATOR_STR,
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Deserializer,
};

use crate::error::ResolveError;
use crate::resolver::{
    CommandRunner,
    FileSystem,
    OsFileSystem,
    SystemCommandRunner,
    find_version,
};

/// Default name of the cached descriptor file.
pub const DEFAULT_VERSION_FILE: &str = "version.txt";

/// Default version-control command.
pub const DEFAULT_VCS_ARGS: [&str; 4] = ["git", "describe", "--tags", "--long"];

/// Name of the manifest metadata table holding the configuration bag.
pub const METADATA_KEY: &str = "vcversioner";

/// Inputs to [`find_version`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Append `.dev<commits>` when the build is past the last tag.
    pub include_dev_version: bool,

    /// Cache file; `None` disables caching and the fallback to it.
    #[serde(alias = "cache-file-path", deserialize_with = "deserialize_version_file")]
    pub version_file: Option<PathBuf>,

    /// Command printing the descriptor. `%(pwd)s` and `%(root)s` are
    /// substituted before it runs.
    #[serde(alias = "command")]
    pub vcs_args: Vec<String>,

    /// Project root. Defaults to the current working directory.
    pub root: Option<PathBuf>,

    /// Version modules to write after a successful resolution.
    pub version_module_paths: Vec<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            include_dev_version: true,
            version_file: Some(PathBuf::from(DEFAULT_VERSION_FILE)),
            vcs_args: DEFAULT_VCS_ARGS.iter().map(ToString::to_string).collect(),
            root: None,
            version_module_paths: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Build a configuration from a key/value bag. Missing keys keep their
    /// defaults; unknown keys are rejected.
    pub fn from_bag(bag: toml::Table) -> Result<Self, ResolveError> {
        Ok(toml::Value::Table(bag).try_into()?)
    }

    /// The configured root, or the current working directory.
    pub fn resolved_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => current_dir(),
        }
    }

    /// The cache file path, anchored at `root` when relative.
    pub fn resolved_version_file(&self, root: &Path) -> Option<PathBuf> {
        self.version_file
            .as_deref()
            .map(|path| anchor(root, path))
    }

    /// The version module paths, anchored at `root` when relative.
    pub fn resolved_version_module_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.version_module_paths
            .iter()
            .map(|path| anchor(root, path))
            .collect()
    }
}

/// Accept a path, or a boolean where `false` disables the version file and
/// `true` selects the default name.
fn deserialize_version_file<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Enabled(bool),
        Path(PathBuf),
    }

    Ok(match Setting::deserialize(deserializer)? {
        Setting::Enabled(false) => None,
        Setting::Enabled(true) => Some(PathBuf::from(DEFAULT_VERSION_FILE)),
        Setting::Path(path) => Some(path),
    })
}

pub(crate) fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Translate `/` into the platform separator.
pub(crate) fn translate_separators(value: &str) -> String {
    translate_separators_to(value, MAIN_SEPARATOR_STR)
}

fn translate_separators_to(value: &str, separator: &str) -> String {
    value.replace('/', separator)
}

fn anchor(root: &Path, path: &Path) -> PathBuf {
    anchor_with(root, path, MAIN_SEPARATOR_STR)
}

fn anchor_with(root: &Path, path: &Path, separator: &str) -> PathBuf {
    let translated = translate_separators_to(&path.to_string_lossy(), separator);
    root.join(translated)
}

/// Read the configuration bag from a Cargo manifest.
///
/// Looks in `[package.metadata.vcversioner]`, then
/// `[workspace.metadata.vcversioner]`. A manifest without either table yields
/// an empty bag.
pub fn load_manifest_config(manifest: &Path) -> Result<toml::Table, ResolveError> {
    let contents = fs::read_to_string(manifest).map_err(|e| ResolveError::io(manifest, e))?;
    let document: toml::Table = toml::from_str(&contents)?;

    let bag = ["package", "workspace"].into_iter().find_map(|section| {
        document
            .get(section)?
            .get("metadata")?
            .get(METADATA_KEY)?
            .as_table()
            .cloned()
    });

    Ok(bag.unwrap_or_default())
}

/// Metadata record nested in a [`Distribution`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionMetadata {
    pub version: Option<String>,
}

/// Caller-owned distribution record that receives the resolved version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    pub version: Option<String>,
    pub metadata: DistributionMetadata,
}

/// Resolve a version from `bag` and store it on `dist`.
pub fn setup(dist: &mut Distribution, bag: toml::Table) -> Result<(), ResolveError> {
    setup_with(dist, bag, &SystemCommandRunner, &OsFileSystem)
}

/// [`setup`] with explicit process and filesystem capabilities.
pub fn setup_with(
    dist: &mut Distribution,
    bag: toml::Table,
    runner: &dyn CommandRunner,
    fs: &dyn FileSystem,
) -> Result<(), ResolveError> {
    let config = ResolverConfig::from_bag(bag)?;
    let version = find_version(&config, runner, fs)?;
    dist.version = Some(version.version.clone());
    dist.metadata.version = Some(version.version);
    Ok(())
}
