//! Decompression entry points.
//!
//! Each archive type wraps a raw byte stream and exposes a single
//! `decompress(destination)` call that runs the two-phase engine in
//! [`crate::Extractor`]. The destination must already exist.
//!
//! # Example
//!
//! ```no_run
//! use packit::ZipArchive;
//!
//! let file = std::fs::File::open("buildpack.zip")?;
//! ZipArchive::new(file).strip_components(1).decompress("/tmp/buildpack")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Cursor, Read};
use std::path::Path;

use crate::adapter::ZipAdapter;
#[cfg(feature = "tar")]
use crate::adapter::TarAdapter;
use crate::error::Error;
use crate::extractor::Extractor;

/// An archive that can be extracted into an existing directory.
///
/// Implemented by every archive type so callers can pick the format at
/// runtime and drive extraction generically.
pub trait Decompressor {
    /// Extract everything into `destination`, failing on the first error.
    fn decompress(self, destination: &Path) -> Result<(), Error>;
}

/// A ZIP archive read from any byte stream.
///
/// ZIP needs random access to its central directory, so the stream is read
/// into memory before decoding. Use [`crate::ZipAdapter`] with
/// [`crate::Extractor`] directly to decode a seekable file in place.
pub struct ZipArchive<R> {
    reader: R,
    strip_components: usize,
}

impl<R: Read> ZipArchive<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_components: 0,
        }
    }

    /// Drop the first `n` path components of every entry.
    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// Extract the archive into `destination`.
    ///
    /// Returns the first error encountered. Files written before the failure
    /// are left in place.
    pub fn decompress<P: AsRef<Path>>(mut self, destination: P) -> Result<(), Error> {
        let extractor = Extractor::new(destination)?.strip_components(self.strip_components);

        let mut buffer = Vec::new();
        self.reader
            .read_to_end(&mut buffer)
            .map_err(|e| Error::format("zip", e))?;

        let mut adapter = ZipAdapter::new(Cursor::new(buffer))?;
        extractor.extract(&mut adapter)
    }
}

impl<R: Read> Decompressor for ZipArchive<R> {
    fn decompress(self, destination: &Path) -> Result<(), Error> {
        ZipArchive::decompress(self, destination)
    }
}

/// An uncompressed TAR archive.
#[cfg(feature = "tar")]
pub struct TarArchive<R> {
    reader: R,
    strip_components: usize,
}

#[cfg(feature = "tar")]
impl<R: Read> TarArchive<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_components: 0,
        }
    }

    /// Drop the first `n` path components of every entry.
    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// Extract the archive into `destination`, streaming it front to back.
    pub fn decompress<P: AsRef<Path>>(self, destination: P) -> Result<(), Error> {
        let extractor = Extractor::new(destination)?.strip_components(self.strip_components);
        extractor.extract(&mut TarAdapter::new(self.reader))
    }
}

#[cfg(feature = "tar")]
impl<R: Read> Decompressor for TarArchive<R> {
    fn decompress(self, destination: &Path) -> Result<(), Error> {
        TarArchive::decompress(self, destination)
    }
}

/// A gzip-compressed TAR archive (`.tar.gz`, `.tgz`).
#[cfg(feature = "tar")]
pub struct TarGzipArchive<R> {
    reader: R,
    strip_components: usize,
}

#[cfg(feature = "tar")]
impl<R: Read> TarGzipArchive<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_components: 0,
        }
    }

    /// Drop the first `n` path components of every entry.
    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// Extract the archive into `destination`, decoding gzip on the fly.
    pub fn decompress<P: AsRef<Path>>(self, destination: P) -> Result<(), Error> {
        let extractor = Extractor::new(destination)?.strip_components(self.strip_components);
        extractor.extract(&mut TarAdapter::gz(self.reader))
    }
}

#[cfg(feature = "tar")]
impl<R: Read> Decompressor for TarGzipArchive<R> {
    fn decompress(self, destination: &Path) -> Result<(), Error> {
        TarGzipArchive::decompress(self, destination)
    }
}
