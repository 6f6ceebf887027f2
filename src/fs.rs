//! Filesystem probes used by the surrounding tooling.

use std::io;
use std::path::Path;

/// Whether `path` exists.
///
/// Returns `Ok(false)` when the path is simply absent and an error when it
/// cannot be statted for any other reason, such as a parent directory without
/// search permission.
pub fn file_exists<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("some-file");
        std::fs::write(&file, "hello file").unwrap();

        assert!(file_exists(&file).unwrap());
        assert!(file_exists(dir.path()).unwrap());
    }

    #[test]
    fn missing_path_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!file_exists(dir.path().join("some-file")).unwrap());
        assert!(!file_exists(dir.path().join("sub-dir/some-file")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_parent_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("some-file");
        std::fs::write(&file, "").unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users bypass directory permissions.
        let privileged = std::fs::metadata(&file).is_ok();
        let result = file_exists(&file);

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        if privileged {
            return;
        }

        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
