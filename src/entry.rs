//! Format-neutral description of an archive member.

/// What kind of filesystem object an entry materializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory marker.
    Directory,
    /// A regular file; its content stream is the file data.
    File,
    /// A symbolic link; its content stream is the link-target text.
    Symlink,
}

/// Metadata for one archive member, as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Archive-relative path, forward-slash separated, verbatim from the header.
    pub name: String,
    /// Entry type.
    pub kind: EntryKind,
    /// Unix mode from the header, if the archive recorded one.
    pub mode: Option<u32>,
    /// Declared content length. Only authoritative for regular files.
    pub size: u64,
}

impl EntryInfo {
    /// Permission bits to apply on disk.
    ///
    /// File-type and setuid/setgid/sticky bits are dropped. Entries without a
    /// recorded mode get `0o755` for directories and `0o644` otherwise.
    pub fn permissions(&self) -> u32 {
        match (self.mode, self.kind) {
            (Some(mode), _) => mode & 0o777,
            (None, EntryKind::Directory) => 0o755,
            (None, _) => 0o644,
        }
    }
}
