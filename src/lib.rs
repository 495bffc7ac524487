#![doc = include_str!("../README.md")]

/// Cargo build script integration.
pub mod build_script;
/// Command implementations and argument types.
pub mod commands;
/// Resolver configuration and the distribution adapter.
pub mod config;
/// Prefixed diagnostic output.
pub mod diagnostics;
/// Resolution errors.
pub mod error;
/// Version resolution.
pub mod resolver;
/// The resolved version record.
pub mod version;
/// Generated version modules.
pub mod version_module;

pub use config::{
    Distribution,
    DistributionMetadata,
    ResolverConfig,
    setup,
};
pub use error::{
    ErrorKind,
    ResolveError,
};
pub use resolver::{
    CommandOutput,
    CommandRunner,
    FileSystem,
    OsFileSystem,
    SystemCommandRunner,
    find_version,
    find_version_default,
};
pub use version::Version;
