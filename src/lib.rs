//! Buildpack packaging and safe archive decompression.
//!
//! The decompression engine materializes untrusted archives onto disk. Every
//! entry path is checked lexically against the destination before anything is
//! written for it, and symlinks are created only after all regular content
//! exists, once their targets have been evaluated and found inside the
//! destination.
//!
//! ```no_run
//! let file = std::fs::File::open("archive.zip")?;
//! packit::ZipArchive::new(file).decompress("/tmp/out")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
mod archive;
mod entry;
mod error;
mod extractor;
pub mod fs;
#[cfg(feature = "pack")]
pub mod pack;
pub mod path;

#[cfg(feature = "tar")]
pub use adapter::TarAdapter;
pub use adapter::{EntrySource, ZipAdapter};
#[cfg(feature = "tar")]
pub use archive::{TarArchive, TarGzipArchive};
pub use archive::{Decompressor, ZipArchive};
pub use entry::{EntryInfo, EntryKind};
pub use error::Error;
pub use extractor::Extractor;
