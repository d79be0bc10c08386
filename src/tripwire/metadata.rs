//! FSC-003: Metadata extraction.
//!
//! Uses lstat semantics (`symlink_metadata`) for both generation and check,
//! so a symlink contributes its own inode, mode and times. Metadata is read
//! before the content, leaving a TOCTOU window in which the file can change
//! between the two; a change in that window shows up as `changed` on the
//! next check rather than being detected here.

use crate::core::types::FileMetadataRecord;
use crate::error::FscError;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Read the attributes bound into a fingerprint.
pub fn extract(path: &Path) -> Result<FileMetadataRecord, FscError> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| FscError::Stat {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(record_from(&meta))
}

fn record_from(meta: &std::fs::Metadata) -> FileMetadataRecord {
    FileMetadataRecord {
        mode: meta.mode(),
        uid: meta.uid(),
        gid: meta.gid(),
        inode: meta.ino(),
        size: meta.size(),
        mtime: meta.mtime(),
        ctime: meta.ctime(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_fsc003_extract_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let rec = extract(&path).unwrap();
        assert_eq!(rec.size, 5);
        assert_eq!(rec.mode & 0o170000, 0o100000, "regular file type bits");
        assert!(rec.inode > 0);
    }

    #[test]
    fn test_fsc003_extract_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        assert_eq!(extract(&path).unwrap(), extract(&path).unwrap());
    }

    #[test]
    fn test_fsc003_extract_sees_mode_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let before = extract(&path).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
        let after = extract(&path).unwrap();
        assert_eq!(before.mode & 0o777, 0o644);
        assert_eq!(after.mode & 0o777, 0o600);
    }

    #[test]
    fn test_fsc003_extract_does_not_follow_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        std::fs::write(&target, "hello").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let t = extract(&target).unwrap();
        let l = extract(&link).unwrap();
        assert_ne!(t.inode, l.inode);
        assert_eq!(l.mode & 0o170000, 0o120000, "symlink type bits");
    }

    #[test]
    fn test_fsc003_extract_missing() {
        let result = extract(Path::new("/nonexistent/file.txt"));
        assert!(matches!(result, Err(FscError::Stat { .. })));
    }
}
