//! ZIP archive adapter.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use super::EntrySource;
use crate::entry::{EntryInfo, EntryKind};
use crate::error::Error;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

/// Adapter for ZIP archives.
///
/// ZIP keeps a central directory at the end of the file, so the underlying
/// reader has to be seekable. Entries are still visited once, in central
/// directory order.
pub struct ZipAdapter<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipAdapter<R> {
    /// Open a ZIP archive from a seekable reader.
    ///
    /// Fails with [`Error::Format`] if the central directory cannot be read.
    pub fn new(reader: R) -> Result<Self, Error> {
        let archive = zip::ZipArchive::new(reader).map_err(|e| Error::format("zip", e))?;
        Ok(Self { archive })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }
}

impl ZipAdapter<BufReader<File>> {
    /// Open a ZIP file from a path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::format("zip", e))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> EntrySource for ZipAdapter<R> {
    fn for_each<F>(&mut self, mut callback: F) -> Result<(), Error>
    where
        F: FnMut(EntryInfo, &mut dyn Read) -> Result<(), Error>,
    {
        for i in 0..self.archive.len() {
            let name = self
                .archive
                .name_for_index(i)
                .unwrap_or_default()
                .to_string();

            // Per-member failures, such as an unsupported compression method,
            // belong to the member rather than the container.
            let mut file = self.archive.by_index(i).map_err(|e| Error::EntryRead {
                entry: name.clone(),
                source: io::Error::other(e),
            })?;

            // Directory markers are recognized by their trailing slash or by
            // a directory file type in the unix mode.
            let mode = file.unix_mode();
            let kind = if file.is_dir() || mode.is_some_and(|m| m & S_IFMT == S_IFDIR) {
                EntryKind::Directory
            } else if file.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };

            let info = EntryInfo {
                name,
                kind,
                mode,
                size: file.size(),
            };

            callback(info, &mut file)?;
        }

        Ok(())
    }
}
