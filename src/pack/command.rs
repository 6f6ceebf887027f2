use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::debug;

use super::{
    ConfigParser, DirectoryDuplicator, FileBundler, GzipTarBuilder, PatternBundler, PrePackager,
    ShellPrePackager, TarBuilder, TomlConfigParser, TreeDuplicator,
};

/// Flags accepted by [`Pack::execute`].
///
/// All three are required; they are optional here so a missing one can be
/// reported by name.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pack", no_binary_name = true)]
pub struct PackArgs {
    /// Path to the buildpack descriptor (buildpack.toml)
    #[arg(long)]
    pub buildpack: Option<PathBuf>,

    /// Path of the tarball to write
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Version to package the buildpack as
    #[arg(long)]
    pub version: Option<String>,
}

/// Packages a buildpack into a single tarball.
///
/// Progress is written to `output`; everything else goes through the
/// collaborators handed to [`Pack::new`].
pub struct Pack<W: Write> {
    duplicator: Box<dyn DirectoryDuplicator>,
    parser: Box<dyn ConfigParser>,
    pre_packager: Box<dyn PrePackager>,
    bundler: Box<dyn FileBundler>,
    tar_builder: Box<dyn TarBuilder>,
    output: W,
}

impl<W: Write> Pack<W> {
    pub fn new(
        duplicator: impl DirectoryDuplicator + 'static,
        parser: impl ConfigParser + 'static,
        pre_packager: impl PrePackager + 'static,
        bundler: impl FileBundler + 'static,
        tar_builder: impl TarBuilder + 'static,
        output: W,
    ) -> Self {
        Self {
            duplicator: Box::new(duplicator),
            parser: Box::new(parser),
            pre_packager: Box::new(pre_packager),
            bundler: Box::new(bundler),
            tar_builder: Box::new(tar_builder),
            output,
        }
    }

    /// A command wired to the filesystem implementations.
    pub fn with_defaults(output: W) -> Self {
        Self::new(
            TreeDuplicator,
            TomlConfigParser,
            ShellPrePackager,
            PatternBundler,
            GzipTarBuilder,
            output,
        )
    }

    /// Where progress messages were written.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Parse `args` and package the buildpack.
    pub fn execute<I, T>(&mut self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = PackArgs::try_parse_from(args)?;
        self.run(args)
    }

    /// Package the buildpack described by already-parsed flags.
    pub fn run(&mut self, args: PackArgs) -> anyhow::Result<()> {
        let buildpack = args
            .buildpack
            .ok_or_else(|| anyhow!("missing required flag --buildpack"))?;
        let output = args
            .output
            .ok_or_else(|| anyhow!("missing required flag --output"))?;
        let version = args
            .version
            .ok_or_else(|| anyhow!("missing required flag --version"))?;

        let descriptor = buildpack
            .file_name()
            .ok_or_else(|| anyhow!("--buildpack {:?} does not name a file", buildpack))?;
        let source_dir = match buildpack.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let build_dir = tempfile::Builder::new()
            .prefix("buildpack")
            .tempdir()
            .context("failed to create build directory")?;
        let root = build_dir.path();

        debug!(source = %source_dir.display(), copy = %root.display(), "duplicating buildpack");
        self.duplicator
            .duplicate(source_dir, root)
            .context("failed to duplicate directory")?;

        let config = self
            .parser
            .parse(&root.join(descriptor))
            .context("failed to parse buildpack.toml")?;

        writeln!(
            self.output,
            "Packing {} {}...",
            config.buildpack.name, version
        )?;

        if let Some(script) = &config.metadata.pre_package {
            self.pre_packager
                .execute(script, root)
                .with_context(|| format!("failed to execute pre-packaging script {script:?}"))?;
        }

        let files = self
            .bundler
            .bundle(root, &config.metadata.include_files)
            .context("failed to bundle files")?;

        self.tar_builder
            .build(&output, files)
            .context("failed to create output")?;

        Ok(())
    }
}
