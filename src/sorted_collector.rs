use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

/// Entries held in memory before a run is spilled to disk.
pub const MAX_MAP_SIZE: usize = 100_000;

/// External-memory sorted multiset keyed by string.
///
/// Accumulates `(key, path)` pairs in a bounded in-memory map, flushing
/// capped runs to disk and merging them with the growing sorted file. The
/// sorted file this collector produces is never auto-deleted; the owner of
/// the collector is responsible for removing it once done reading it.
#[derive(Debug)]
pub struct SortedCollector {
    temp_dir: PathBuf,
    in_memory: BTreeMap<String, Vec<String>>,
    count: usize,
    sorted_file: Option<PathBuf>,
}

impl SortedCollector {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        SortedCollector {
            temp_dir: temp_dir.into(),
            in_memory: BTreeMap::new(),
            count: 0,
            sorted_file: None,
        }
    }

    /// Appends to the in-memory run, flushing first if the run is already at
    /// capacity.
    pub fn push(&mut self, key: String, path: String) -> Result<()> {
        if self.count >= MAX_MAP_SIZE {
            self.flush()?;
        }
        self.in_memory.entry(key).or_default().push(path);
        self.count += 1;
        Ok(())
    }

    /// Flushes any remaining in-memory run and returns the on-disk sorted
    /// file, or `None` if nothing was ever pushed.
    pub fn finish(&mut self) -> Result<Option<PathBuf>> {
        if !self.in_memory.is_empty() {
            self.flush()?;
        }
        Ok(self.sorted_file.clone())
    }

    /// The sorted file as of the last `finish()`/flush, if any.
    pub fn sorted_file(&self) -> Option<PathBuf> {
        self.sorted_file.clone()
    }

    fn flush(&mut self) -> Result<()> {
        if self.in_memory.is_empty() {
            return Ok(());
        }

        match self.sorted_file.clone() {
            None => {
                let (file, path) = self.create_temp_file().map_err(Error::Sorter)?;
                match write_sorted_lines(file, &self.in_memory) {
                    Ok(()) => {
                        self.sorted_file = Some(path);
                    },
                    Err(e) => {
                        log::warn!("failed writing initial sorted run to {}: {}", path.display(), e);
                        if let Err(remove_err) = fs::remove_file(&path) {
                            log::warn!("failed to delete partial sorted run {}: {}", path.display(), remove_err);
                        }
                        // Collector is left in an empty state: no sorted file exists,
                        // and the entries that failed to write are dropped.
                    },
                }
            },
            Some(old_path) => {
                let (new_file, new_path) = self.create_temp_file().map_err(Error::Sorter)?;
                match merge_into(&old_path, new_file, &self.in_memory) {
                    Ok(()) => {
                        if let Err(e) = fs::remove_file(&old_path) {
                            log::warn!("failed to delete superseded sorted run {}: {}", old_path.display(), e);
                        }
                        self.sorted_file = Some(new_path);
                    },
                    Err(e) => {
                        // Old file remains intact and is still the collector's sorted
                        // file; the partial new file is left behind, per the merge
                        // failure-mode contract.
                        return Err(Error::Sorter(e));
                    },
                }
            },
        }

        self.in_memory.clear();
        self.count = 0;
        Ok(())
    }

    fn create_temp_file(&self) -> io::Result<(File, PathBuf)> {
        let named = tempfile::Builder::new()
            .prefix("dupe-sort-")
            .suffix(".sorted")
            .tempfile_in(&self.temp_dir)?;
        named.keep().map_err(|e| e.error)
    }
}

fn write_sorted_lines(file: File, entries: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for (key, paths) in entries {
        for path in paths {
            writeln!(writer, "{}:{}", key, path)?;
        }
    }
    writer.flush()
}

/// Two-way merge of an existing sorted file with the in-memory run.
/// On a key tie, the on-disk entry is emitted first -- this is a required
/// contract that preserves the temporal order of equal keys pushed across
/// flush boundaries.
fn merge_into(old_path: &Path, new_file: File, mem: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
    let reader = BufReader::new(File::open(old_path)?);
    let mut disk_lines = reader.lines();
    let mut next_disk = read_next_disk_entry(&mut disk_lines)?;

    let mut mem_iter = mem.iter();
    let mut next_mem = mem_iter.next();

    let mut writer = BufWriter::new(new_file);

    loop {
        let take_disk = match (&next_disk, &next_mem) {
            (Some((dkey, _)), Some((mkey, _))) => mkey.as_str() >= dkey.as_str(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if take_disk {
            let (key, path) = next_disk.take().expect("checked Some above");
            writeln!(writer, "{}:{}", key, path)?;
            next_disk = read_next_disk_entry(&mut disk_lines)?;
        } else {
            let (key, paths) = next_mem.take().expect("checked Some above");
            for path in paths {
                writeln!(writer, "{}:{}", key, path)?;
            }
            next_mem = mem_iter.next();
        }
    }

    writer.flush()
}

fn read_next_disk_entry(lines: &mut Lines<BufReader<File>>) -> io::Result<Option<(String, String)>> {
    match lines.next() {
        None => Ok(None),
        Some(Err(e)) => Err(e),
        Some(Ok(line)) => match line.split_once(':') {
            Some((key, path)) => Ok(Some((key.to_string(), path.to_string()))),
            None => Ok(Some((line, String::new()))),
        },
    }
}
