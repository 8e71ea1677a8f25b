use std::fs;
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Opaque identity of an inode on its device, or the sentinel `"()"` when the
/// platform exposes no such identity. Two files share an `inode_id` iff they
/// are hard links of each other (on filesystems that expose inode identity).
///
/// Uses `\` rather than `:` to join `dev`/`ino`: this string is embedded
/// inside a pass-1 key (`<length>\<inode_id>`), and sorted-file lines are
/// split on the first `:` to separate key from path. A `:` here would be
/// consumed as that delimiter instead, truncating the key and corrupting
/// the path.
pub fn inode_id(metadata: &fs::Metadata) -> String {
    #[cfg(unix)]
    {
        format!("{}\\{}", metadata.dev(), metadata.ino())
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        "()".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    #[cfg(unix)]
    fn hardlinks_share_inode_id() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"x").unwrap();
        fs::hard_link(&a, &b).unwrap();

        let ma = fs::symlink_metadata(&a).unwrap();
        let mb = fs::symlink_metadata(&b).unwrap();
        assert_eq!(inode_id(&ma), inode_id(&mb));
    }

    #[test]
    #[cfg(unix)]
    fn distinct_files_have_distinct_inode_ids() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"x").unwrap();

        let ma = fs::symlink_metadata(&a).unwrap();
        let mb = fs::symlink_metadata(&b).unwrap();
        assert_ne!(inode_id(&ma), inode_id(&mb));
    }
}
