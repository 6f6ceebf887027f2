//! Two-phase extraction engine.
//!
//! Phase one walks the entry stream once, creating directories and regular
//! files and queueing every symlink. Phase two creates the queued symlinks
//! after the whole tree exists, so a link may precede its target in the
//! archive. Each target must exist and stay inside the destination. Modes of
//! listed directories are applied last, deepest first.
//!
//! Extraction is fail-fast and not atomic: the first error aborts the call and
//! whatever was already written is left on disk. Callers that need a clean
//! slate should retry against a fresh directory.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::adapter::EntrySource;
use crate::entry::{EntryInfo, EntryKind};
use crate::error::Error;
use crate::path;

/// A symlink seen in phase one, created in phase two.
#[derive(Debug)]
struct PendingSymlink {
    /// Archive-relative name, for error messages.
    entry: String,
    /// Absolute location of the link itself.
    link_path: PathBuf,
    /// Link target exactly as declared in the archive.
    target: String,
}

/// A listed directory whose mode is applied once extraction is complete.
#[derive(Debug)]
struct DeferredMode {
    entry: String,
    path: PathBuf,
    mode: u32,
}

/// Extracts an [`EntrySource`] into a destination directory.
///
/// The destination must already exist; the extractor never creates the root.
/// A single extractor performs no locking, so concurrent extractions into the
/// same destination must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Destination made absolute and lexically cleaned.
    root: PathBuf,
    strip_components: usize,
}

impl Extractor {
    /// Create an extractor for the given destination directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DestinationNotFound`] if the destination is not an
    /// existing directory.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self, Error> {
        let destination = destination.as_ref();
        let not_found = || Error::DestinationNotFound {
            path: destination.display().to_string(),
        };
        if !destination.is_dir() {
            return Err(not_found());
        }
        let absolute = std::path::absolute(destination).map_err(|_| not_found())?;

        Ok(Self {
            root: path::clean(&absolute),
            strip_components: 0,
        })
    }

    /// Drop the first `n` path components of every entry name.
    ///
    /// Entries with `n` or fewer components are skipped.
    pub fn strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// The destination directory.
    pub fn destination(&self) -> &Path {
        &self.root
    }

    /// Run both extraction phases over `source`.
    pub fn extract<S: EntrySource>(&self, source: &mut S) -> Result<(), Error> {
        let mut pending = Vec::new();
        let mut modes = Vec::new();
        let mut materialized = 0usize;

        source.for_each(|info, reader| {
            if self.extract_entry(info, reader, &mut pending, &mut modes)? {
                materialized += 1;
            }
            Ok(())
        })?;

        let links = pending.len();
        self.link_symlinks(pending)?;
        apply_directory_modes(modes)?;

        debug!(
            destination = %self.root.display(),
            entries = materialized,
            symlinks = links,
            "decompressed archive"
        );
        Ok(())
    }

    /// Phase one for a single entry. Returns whether anything was materialized.
    fn extract_entry(
        &self,
        info: EntryInfo,
        reader: &mut dyn Read,
        pending: &mut Vec<PendingSymlink>,
        modes: &mut Vec<DeferredMode>,
    ) -> Result<bool, Error> {
        let Some(relative) = path::entry_relative_path(&info.name, self.strip_components) else {
            trace!(entry = %info.name, "skipping top-level marker");
            return Ok(false);
        };

        let target = path::resolve(&self.root, &relative).ok_or_else(|| Error::PathTraversal {
            entry: info.name.clone(),
        })?;

        if target == self.root {
            trace!(entry = %info.name, "entry resolves to the destination root");
            return Ok(false);
        }

        match info.kind {
            EntryKind::Directory => {
                // The owner keeps write access until the children are in place.
                let mode = info.permissions();
                fs::create_dir_all(&target)
                    .and_then(|()| set_mode(&target, mode | 0o700))
                    .map_err(|source| Error::DirectoryCreate {
                        entry: info.name.clone(),
                        implicit: false,
                        source,
                    })?;
                debug!(entry = %info.name, "created directory");
                modes.push(DeferredMode {
                    entry: info.name,
                    path: target,
                    mode,
                });
            }
            EntryKind::File => {
                self.create_parent(&info.name, &target)?;
                write_file(&info, reader, &target)?;
                debug!(entry = %info.name, size = info.size, "extracted file");
            }
            EntryKind::Symlink => {
                let mut link_target = String::new();
                reader
                    .read_to_string(&mut link_target)
                    .map_err(|source| Error::EntryRead {
                        entry: info.name.clone(),
                        source,
                    })?;
                debug!(entry = %info.name, target = %link_target, "deferred symlink");
                pending.push(PendingSymlink {
                    entry: info.name,
                    link_path: target,
                    target: link_target,
                });
            }
        }

        Ok(true)
    }

    /// Phase two: create every queued symlink, in the order it was queued.
    fn link_symlinks(&self, pending: Vec<PendingSymlink>) -> Result<(), Error> {
        if pending.is_empty() {
            return Ok(());
        }

        // Targets are compared after symlink evaluation, so the root has to be
        // evaluated the same way.
        let canonical_root =
            fs::canonicalize(&self.root).map_err(|_| Error::DestinationNotFound {
                path: self.root.display().to_string(),
            })?;

        for link in pending {
            self.create_parent(&link.entry, &link.link_path)?;

            let parent = link.link_path.parent().unwrap_or(&self.root);
            let resolved = fs::canonicalize(parent.join(&link.target)).map_err(|source| {
                Error::SymlinkTargetMissing {
                    entry: link.entry.clone(),
                    target: link.target.clone(),
                    source,
                }
            })?;

            if !path::is_within(&canonical_root, &resolved) {
                return Err(Error::PathTraversal { entry: link.entry });
            }

            symlink(&link.target, &link.link_path).map_err(|source| Error::SymlinkCreate {
                entry: link.entry.clone(),
                source,
            })?;
            debug!(entry = %link.entry, target = %link.target, "created symlink");
        }

        Ok(())
    }

    /// Create the missing ancestors of an entry that was not listed as a directory.
    fn create_parent(&self, entry: &str, target: &Path) -> Result<(), Error> {
        match target.parent() {
            Some(parent) if parent != self.root => {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    entry: entry.to_string(),
                    implicit: true,
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Apply the declared modes of listed directories, deepest first so a
/// read-only parent never blocks its children.
fn apply_directory_modes(mut modes: Vec<DeferredMode>) -> Result<(), Error> {
    modes.sort_by_key(|d| std::cmp::Reverse(d.path.components().count()));

    for dir in modes {
        set_mode(&dir.path, dir.mode).map_err(|source| Error::DirectoryCreate {
            entry: dir.entry,
            implicit: false,
            source,
        })?;
    }

    Ok(())
}

/// Create or truncate `target` and stream the entry content into it.
fn write_file(info: &EntryInfo, reader: &mut dyn Read, target: &Path) -> Result<(), Error> {
    let file_err = |source| Error::FileCreate {
        entry: info.name.clone(),
        source,
    };

    // SECURITY: never write through a symlink that already sits at the target
    if let Ok(m) = fs::symlink_metadata(target) {
        if m.file_type().is_symlink() {
            fs::remove_file(target).map_err(file_err)?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(info.permissions());
    }
    let mut outfile = options.open(target).map_err(file_err)?;

    copy_entry(&info.name, reader, &mut outfile)?;

    // The open mode is filtered through the umask; set the declared bits exactly.
    set_mode(target, info.permissions()).map_err(file_err)
}

/// Copy an entry's content, attributing failures to the side that failed.
fn copy_entry<W: Write>(entry: &str, reader: &mut dyn Read, writer: &mut W) -> Result<u64, Error> {
    let mut total = 0u64;
    let mut buf = [0u8; 8192];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::EntryRead {
                    entry: entry.to_string(),
                    source,
                })
            }
        };

        writer
            .write_all(&buf[..n])
            .map_err(|source| Error::FileCreate {
                entry: entry.to_string(),
                source,
            })?;
        total += n as u64;
    }

    Ok(total)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &str, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are only extracted on unix",
    ))
}
