use crate::classifier;
use crate::error::{Error, Result};
use crate::report::ReportSink;
use crate::sorted_collector::SortedCollector;
use crate::stats::Stats;
use crate::walker::{self, WalkSettings};
use std::fs;
use std::path::Path;

/// Forwards every report to the wrapped sink while counting how many of
/// each kind were emitted, purely for the end-of-run log summary.
struct CountingSink<'a> {
    inner: &'a mut dyn ReportSink,
    stats: Stats,
}

impl ReportSink for CountingSink<'_> {
    fn hard_link(&mut self, path: &str, representative: &str) {
        self.stats.hard_links += 1;
        self.inner.hard_link(path, representative);
    }

    fn duplicate(&mut self, representative: &str, dup: &str) {
        self.stats.dupes += 1;
        self.inner.duplicate(representative, dup);
    }
}

/// Wires Walker -> Collector#1 -> Classifier Pass 1 -> Collector#2 ->
/// Classifier Pass 2 -> the report sink, and owns cleanup of both sorted
/// files once they have been fully consumed.
#[derive(Debug, Default)]
pub struct Driver {
    pub walk_settings: WalkSettings,
}

impl Driver {
    pub fn new() -> Self {
        Driver { walk_settings: WalkSettings::default() }
    }

    pub fn run(&self, root: &Path, sink: &mut dyn ReportSink) -> Result<()> {
        if !root.is_dir() {
            return Err(Error::InvalidInput(root.to_path_buf()));
        }

        let temp_dir = std::env::temp_dir();

        let mut collector1 = SortedCollector::new(&temp_dir);
        let walk_stats = match walker::walk(root, &mut collector1, &self.walk_settings) {
            Ok(stats) => stats,
            Err(e) => {
                // Traversal aborted partway through: whatever collector1 holds is a
                // partial inventory of the tree, never a complete one. Discard it
                // (and any temp file it already spilled to disk) instead of letting
                // it reach the classifier.
                if let Some(partial) = collector1.sorted_file() {
                    remove_sorted_file(&partial);
                }
                return Err(e);
            },
        };
        let Some(sorted1_path) = collector1.finish()? else {
            log::info!("no candidate files found under {}", root.display());
            walk_stats.log(root);
            return Ok(());
        };

        let mut counting = CountingSink { inner: sink, stats: walk_stats };

        let mut collector2 = SortedCollector::new(&temp_dir);
        let pass_one_result = classifier::pass_one(&sorted1_path, &mut collector2, &mut counting);
        remove_sorted_file(&sorted1_path);
        pass_one_result?;

        if let Some(sorted2_path) = collector2.finish()? {
            let pass_two_result = classifier::pass_two(&sorted2_path, &mut counting);
            remove_sorted_file(&sorted2_path);
            pass_two_result?;
        }

        counting.stats.log(root);
        Ok(())
    }
}

fn remove_sorted_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("failed to remove temporary sorted file {}: {}", path.display(), e);
    }
}
