use crate::error::{Error, Result};
use crate::metadata;
use crate::sorted_collector::SortedCollector;
use crate::stats::Stats;
use std::fs;
use std::path::{Path, PathBuf};

/// Policy knobs for the walk. Only one is currently exposed: whether
/// symbolic links to regular files are followed and reported. Directory
/// symlinks are never followed, regardless of this setting, to prevent
/// traversal cycles.
#[derive(Debug, Clone, Copy)]
pub struct WalkSettings {
    pub follow_file_symlinks: bool,
}

impl Default for WalkSettings {
    fn default() -> Self {
        WalkSettings { follow_file_symlinks: true }
    }
}

/// Depth-first traversal of `root`, pushing a `(length\inode_id, path)`
/// record into `collector` for every visited regular file. Per-entry
/// stat/read failures on individual files and symlinks are logged and the
/// offending entry is skipped. A failure to enumerate a directory itself
/// (`fs::read_dir`, or a bad `ReadDir` entry) is a traversal-level I/O
/// error: it is logged and aborts the whole walk with `Err(Error::Walk)`,
/// per spec -- the caller must discard whatever was collected so far
/// rather than feed a partial sorted file to the classifier.
pub fn walk(root: &Path, collector: &mut SortedCollector, settings: &WalkSettings) -> Result<Stats> {
    let mut to_scan = vec![root.to_path_buf()];
    let mut stats = Stats::default();

    while let Some(dir) = to_scan.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("aborting walk: cannot read directory {}: {}", dir.display(), e);
                return Err(Error::Walk(e));
            },
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::error!("aborting walk: cannot read a directory entry under {}: {}", dir.display(), e);
                    return Err(Error::Walk(e));
                },
            };
            visit(&entry.path(), &mut to_scan, collector, settings, &mut stats)?;
        }
    }

    Ok(stats)
}

fn visit(path: &Path, to_scan: &mut Vec<PathBuf>, collector: &mut SortedCollector, settings: &WalkSettings, stats: &mut Stats) -> Result<()> {
    let link_meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("cannot stat {}: {}", path.display(), e);
            stats.skipped += 1;
            return Ok(());
        },
    };

    if link_meta.is_dir() {
        to_scan.push(path.to_path_buf());
        return Ok(());
    }

    if link_meta.file_type().is_symlink() {
        if !settings.follow_file_symlinks {
            stats.skipped += 1;
            return Ok(());
        }
        // Following a symlink to a directory would risk cycles; only
        // symlinks resolving to a regular file are ever reported.
        let target_meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => {
                stats.skipped += 1;
                return Ok(()); // broken symlink
            },
        };
        if !target_meta.is_file() {
            stats.skipped += 1;
            return Ok(());
        }
        return push_file(collector, path, &target_meta, stats);
    }

    if !link_meta.is_file() {
        stats.skipped += 1;
        return Ok(());
    }

    push_file(collector, path, &link_meta, stats)
}

fn push_file(collector: &mut SortedCollector, path: &Path, metadata: &fs::Metadata, stats: &mut Stats) -> Result<()> {
    if metadata.len() == 0 {
        stats.skipped += 1;
        return Ok(());
    }
    if let Err(e) = fs::File::open(path) {
        log::warn!("skipping unreadable file {}: {}", path.display(), e);
        stats.skipped += 1;
        return Ok(());
    }

    let key = format!("{}\\{}", metadata.len(), metadata::inode_id(metadata));
    collector.push(key, path.to_string_lossy().into_owned())?;
    stats.added += 1;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines_of(path: &Path) -> Vec<String> {
        use std::io::BufRead;
        std::io::BufReader::new(fs::File::open(path).unwrap()).lines().map(|l| l.unwrap()).collect()
    }

    #[test]
    fn empty_files_are_never_pushed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty"), b"").unwrap();
        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        assert_eq!(c.finish().unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_files_are_never_pushed() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("secret");
        fs::write(&f, b"shh").unwrap();
        fs::set_permissions(&f, fs::Permissions::from_mode(0)).unwrap();
        let mut c = SortedCollector::new(dir.path());
        let result = walk(dir.path(), &mut c, &WalkSettings::default());
        fs::set_permissions(&f, fs::Permissions::from_mode(0o644)).unwrap(); // allow tempdir cleanup
        result.unwrap();
        assert_eq!(c.finish().unwrap(), None);
    }

    #[test]
    fn nested_directories_are_traversed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("a/b/c/f"), b"content").unwrap();
        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        let path = c.finish().unwrap().unwrap();
        let lines = lines_of(&path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("a/b/c/f"));
    }

    #[test]
    #[cfg(unix)]
    fn hardlinks_share_key() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"same").unwrap();
        fs::hard_link(&a, &b).unwrap();

        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        let path = c.finish().unwrap().unwrap();
        let lines = lines_of(&path);
        assert_eq!(lines.len(), 2);
        let keys: Vec<&str> = lines.iter().map(|l| l.split_once(':').unwrap().0).collect();
        assert_eq!(keys[0], keys[1]);
    }

    #[test]
    #[cfg(unix)]
    fn directory_symlinks_are_never_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/f"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        let path = c.finish().unwrap().unwrap();
        // Only the real file is reported once, never via the symlinked directory.
        assert_eq!(lines_of(&path).len(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn file_symlinks_followed_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        let path = c.finish().unwrap().unwrap();
        assert_eq!(lines_of(&path).len(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn file_symlinks_skipped_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut c = SortedCollector::new(dir.path());
        let settings = WalkSettings { follow_file_symlinks: false };
        walk(dir.path(), &mut c, &settings).unwrap();
        let path = c.finish().unwrap().unwrap();
        assert_eq!(lines_of(&path).len(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn inode_ids_do_not_collide_on_shared_device() {
        // Two distinct, non-hard-linked, same-length files on the same device
        // must get distinct pass-1 keys; if `inode_id` ever used a delimiter
        // that collides with the `key:path` split, they would wrongly key
        // identically.
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"abcd").unwrap();
        fs::write(dir.path().join("b"), b"abcd").unwrap();

        let mut c = SortedCollector::new(dir.path());
        walk(dir.path(), &mut c, &WalkSettings::default()).unwrap();
        let path = c.finish().unwrap().unwrap();
        let lines = lines_of(&path);
        assert_eq!(lines.len(), 2);
        let keys: Vec<&str> = lines.iter().map(|l| l.split_once(':').unwrap().0).collect();
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_subdirectory_aborts_the_walk() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("before"), b"visible").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret"), b"hidden").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0)).unwrap();

        let mut c = SortedCollector::new(dir.path());
        let result = walk(dir.path(), &mut c, &WalkSettings::default());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap(); // allow tempdir cleanup
        assert!(matches!(result, Err(Error::Walk(_))));
    }
}
