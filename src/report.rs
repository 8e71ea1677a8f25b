/// Standard output is treated purely as a sink for textual duplicate
/// reports; this trait is the one collaborator the core classifier talks to.
pub trait ReportSink {
    /// `path` was just discovered to be a hard link of the already-seen
    /// `representative`.
    fn hard_link(&mut self, path: &str, representative: &str);
    /// `dup` was found to be byte-identical to the already-seen
    /// `representative`.
    fn duplicate(&mut self, representative: &str, dup: &str);
}

/// Writes the two bit-exact report line formats to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn hard_link(&mut self, path: &str, representative: &str) {
        println!("Hard Links: {}  =  {}", path, representative);
    }

    fn duplicate(&mut self, representative: &str, dup: &str) {
        println!("Dup  Files: {}  =  {}", representative, dup);
    }
}

/// Collects report lines in memory, in the same bit-exact formats `StdoutSink`
/// prints. Useful for tests that want to assert on exact report content
/// without parsing captured stdout.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl ReportSink for RecordingSink {
    fn hard_link(&mut self, path: &str, representative: &str) {
        self.lines.push(format!("Hard Links: {}  =  {}", path, representative));
    }

    fn duplicate(&mut self, representative: &str, dup: &str) {
        self.lines.push(format!("Dup  Files: {}  =  {}", representative, dup));
    }
}
