/// Purely observational run counters, logged at the end of a scan. Unlike
/// the teacher's `scanner::Stats`, nothing here drives a merging decision --
/// this crate never merges files, it only reports pairs.
#[derive(Debug, Default, Copy, Clone)]
pub struct Stats {
    pub added: usize,
    pub skipped: usize,
    pub hard_links: usize,
    pub dupes: usize,
}

impl Stats {
    pub fn log(&self, root: &std::path::Path) {
        log::info!(
            "scanned {}: {} files catalogued, {} skipped, {} hard-link pairs, {} duplicate pairs",
            root.display(),
            self.added,
            self.skipped,
            self.hard_links,
            self.dupes
        );
    }
}
