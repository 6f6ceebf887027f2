//! Buildpack packaging.
//!
//! [`Pack`] duplicates a buildpack source tree into a scratch directory, runs
//! its pre-package hook, selects the files named by the descriptor and writes
//! them into a single gzip tarball. Each step goes through a small trait so
//! it can be replaced; the default implementations live next to the traits.

mod bundler;
mod command;
mod config;
mod duplicator;
mod prepackager;
mod tarball;

use std::io::Read;
use std::path::Path;

pub use bundler::PatternBundler;
pub use command::{Pack, PackArgs};
pub use config::{BuildpackConfig, ConfigBuildpack, ConfigMetadata, TomlConfigParser};
pub use duplicator::TreeDuplicator;
pub use prepackager::ShellPrePackager;
pub use tarball::GzipTarBuilder;

/// A file selected for the output archive.
pub struct BundledFile {
    /// Path inside the archive, forward-slash separated.
    pub name: String,
    pub size: u64,
    /// Unix permission bits.
    pub mode: u32,
    pub content: Box<dyn Read + Send>,
}

impl std::fmt::Debug for BundledFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundledFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mode", &format_args!("{:o}", self.mode))
            .finish_non_exhaustive()
    }
}

/// Copies a directory tree.
pub trait DirectoryDuplicator {
    fn duplicate(&self, source: &Path, destination: &Path) -> anyhow::Result<()>;
}

/// Reads a buildpack descriptor.
pub trait ConfigParser {
    fn parse(&self, path: &Path) -> anyhow::Result<BuildpackConfig>;
}

/// Runs the descriptor's pre-package script inside the buildpack root.
pub trait PrePackager {
    fn execute(&self, script: &str, root_dir: &Path) -> anyhow::Result<()>;
}

/// Selects the files to package, ordered by name.
pub trait FileBundler {
    fn bundle(&self, root: &Path, patterns: &[String]) -> anyhow::Result<Vec<BundledFile>>;
}

/// Writes the output archive.
pub trait TarBuilder {
    fn build(&self, output: &Path, files: Vec<BundledFile>) -> anyhow::Result<()>;
}
