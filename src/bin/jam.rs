//! jam - package buildpacks and unpack archives safely
//!
//! # Examples
//!
//! ```bash
//! # Package a buildpack
//! jam pack --buildpack ./buildpack.toml --version 1.2.3 --output build/buildpack.tgz
//!
//! # Extract an archive (ZIP, TAR, TAR.GZ)
//! jam extract dependency.tgz -d /tmp/out --strip-components 1
//!
//! # Generate shell completions
//! jam completions bash > ~/.bash_completion.d/jam
//! ```

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use packit::pack::Pack;
use packit::{Decompressor, Error, TarArchive, TarGzipArchive, ZipArchive};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jam",
    about = "Package buildpacks and extract archives without Zip Slip",
    version,
    after_help = "EXAMPLES:
    jam pack --buildpack buildpack.toml --version 1.0.0 --output out.tgz
    jam extract archive.zip -d /tmp/out
    jam extract archive.tar.gz -d /tmp/out --strip-components 1"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - log each entry as it is extracted
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Package a buildpack into a tarball
    Pack {
        /// Flags for the pack command (--buildpack, --version, --output)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Extract an archive into a directory
    Extract {
        /// Archive file to extract (ZIP, TAR, TAR.GZ)
        archive: PathBuf,

        /// Destination directory (created if missing)
        #[arg(short, long, default_value = ".")]
        dest: PathBuf,

        /// Drop this many leading path components from every entry
        #[arg(long, default_value_t = 0)]
        strip_components: usize,
    },
    /// Generate shell completions for the specified shell
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

fn detect_format(path: &Path) -> ArchiveFormat {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        ArchiveFormat::TarGz
    } else if name.ends_with(".tar") {
        ArchiveFormat::Tar
    } else {
        ArchiveFormat::Zip
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Command::Pack { args } => Pack::with_defaults(io::stdout()).execute(args),
        Command::Extract {
            archive,
            dest,
            strip_components,
        } => extract(&archive, &dest, strip_components, cli.quiet),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "jam", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn extract(
    archive: &Path,
    dest: &Path,
    strip_components: usize,
    quiet: bool,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination {}", dest.display()))?;

    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let reader = BufReader::new(file);

    match detect_format(archive) {
        ArchiveFormat::Zip => unpack(
            ZipArchive::new(reader).strip_components(strip_components),
            dest,
        )?,
        ArchiveFormat::Tar => unpack(
            TarArchive::new(reader).strip_components(strip_components),
            dest,
        )?,
        ArchiveFormat::TarGz => unpack(
            TarGzipArchive::new(reader).strip_components(strip_components),
            dest,
        )?,
    }

    if !quiet {
        println!("Extracted {} to {}", archive.display(), dest.display());
    }
    Ok(())
}

fn unpack<D: Decompressor>(archive: D, dest: &Path) -> Result<(), Error> {
    archive.decompress(dest)
}
