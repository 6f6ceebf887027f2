use std::fs;
use std::path::Path;

use anyhow::Context;
use walkdir::WalkDir;

use super::DirectoryDuplicator;

/// Recursively copies a tree, keeping file modes and symlinks as symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDuplicator;

impl DirectoryDuplicator for TreeDuplicator {
    fn duplicate(&self, source: &Path, destination: &Path) -> anyhow::Result<()> {
        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry?;
            let relative = entry.path().strip_prefix(source)?;
            let target = destination.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("failed to create {}", target.display()))?;
                fs::set_permissions(&target, entry.metadata()?.permissions())?;
            } else if file_type.is_symlink() {
                let link = fs::read_link(entry.path())?;
                copy_symlink(&link, &target)
                    .with_context(|| format!("failed to link {}", target.display()))?;
            } else {
                // fs::copy carries the permission bits over
                fs::copy(entry.path(), &target)
                    .with_context(|| format!("failed to copy {}", entry.path().display()))?;
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    fs::copy(link, target).map(|_| ())
}
