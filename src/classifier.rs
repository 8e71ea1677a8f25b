use crate::checksum;
use crate::comparator;
use crate::error::{Error, Result};
use crate::report::ReportSink;
use crate::sorted_collector::SortedCollector;
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Below this many same-length entries, a direct pairwise byte compare is
/// cheaper than computing and comparing checksums.
const MIN_COUNT_CHECKSUM: usize = 3;

type Group = SmallVec<[String; 4]>;

/// Pass 1: scans the length/inode-keyed sorted file. Hard links are reported
/// directly; same-length clusters below the checksum threshold are held in
/// memory for a closing pairwise compare, clusters at or above it have their
/// members' Adler-32 checksums pushed into `collector2` for Pass 2.
pub fn pass_one(sorted_file: &Path, collector2: &mut SortedCollector, sink: &mut dyn ReportSink) -> Result<()> {
    let reader = BufReader::new(File::open(sorted_file).map_err(Error::Sorter)?);

    let mut prev_key: Option<String> = None;
    let mut prev_name: Option<String> = None;
    let mut prev_len: Option<String> = None;
    let mut group: Group = Group::new();
    let mut group_count: usize = 0;

    for line in reader.lines() {
        let line = line.map_err(Error::Sorter)?;
        let Some((key, path)) = line.split_once(':') else {
            continue;
        };
        let key = key.to_string();
        let path = path.to_string();
        let len_part = length_part(&key).to_string();

        if prev_key.as_deref() == Some(key.as_str()) {
            // Same length and inode: a hard link of the previously-seen file.
            sink.hard_link(&path, prev_name.as_deref().unwrap_or(""));
            continue;
        }

        if prev_len.as_deref() == Some(len_part.as_str()) {
            if group_count < MIN_COUNT_CHECKSUM {
                group.push(path.clone());
            } else if group_count == MIN_COUNT_CHECKSUM {
                for existing in group.iter() {
                    push_checksummed(existing, &len_part, collector2)?;
                }
                push_checksummed(&path, &len_part, collector2)?;
                group.clear();
            } else {
                push_checksummed(&path, &len_part, collector2)?;
            }
            group_count += 1;
            prev_key = Some(key);
            prev_name = Some(path);
        } else {
            close_group(&group, sink);
            group = Group::new();
            group.push(path.clone());
            group_count = 0;
            prev_len = Some(len_part);
            prev_key = Some(key);
            prev_name = Some(path);
        }
    }

    // The final cluster never sees a "length changed" line to trigger its
    // close; it must be flushed explicitly here.
    close_group(&group, sink);
    Ok(())
}

/// Pass 2: scans the checksum/length-keyed sorted file produced by Pass 1.
/// Within a `(checksum, length)` group, each incoming file is short-circuit
/// compared against already-seen representatives; a match is reported
/// immediately and the file is not added to the group. A group closes with
/// the same pairwise compare used in Pass 1.
pub fn pass_two(sorted_file: &Path, sink: &mut dyn ReportSink) -> Result<()> {
    let reader = BufReader::new(File::open(sorted_file).map_err(Error::Sorter)?);

    let mut prev_key: Option<String> = None;
    let mut group: Group = Group::new();

    for line in reader.lines() {
        let line = line.map_err(Error::Sorter)?;
        let Some((key, path)) = line.split_once(':') else {
            continue;
        };
        let key = key.to_string();
        let path = path.to_string();

        if prev_key.as_deref() == Some(key.as_str()) {
            let matched = group.iter().find(|existing| comparator::compare(Path::new(existing.as_str()), Path::new(&path)) == 0).cloned();
            match matched {
                Some(representative) => sink.duplicate(&representative, &path),
                None => group.push(path),
            }
        } else {
            close_group(&group, sink);
            group = Group::new();
            group.push(path.clone());
            prev_key = Some(key);
        }
    }

    close_group(&group, sink);
    Ok(())
}

fn push_checksummed(path: &str, len_part: &str, collector2: &mut SortedCollector) -> Result<()> {
    match checksum::adler32(Path::new(path)) {
        Ok(sum) => {
            let key = format!("{}\\{}", sum, len_part);
            collector2.push(key, path.to_string())
        },
        Err(e) => {
            log::warn!("failed to checksum {}: {}", path, e);
            Ok(())
        },
    }
}

/// Pairwise-compares the non-dominated members of a closing cluster/group,
/// reporting every equal pair exactly once and keeping the lowest-indexed
/// representative alive for subsequent comparisons.
fn close_group(group: &[String], sink: &mut dyn ReportSink) {
    let mut removed = vec![false; group.len()];
    for i in 0..group.len() {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..group.len() {
            if removed[j] {
                continue;
            }
            if comparator::compare(Path::new(&group[i]), Path::new(&group[j])) == 0 {
                sink.duplicate(&group[i], &group[j]);
                removed[j] = true;
            }
        }
    }
}

fn length_part(key: &str) -> &str {
    key.split('\\').next().unwrap_or(key)
}
