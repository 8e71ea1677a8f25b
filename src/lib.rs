mod checksum;
mod classifier;
mod comparator;
mod driver;
mod error;
mod metadata;
mod report;
mod sorted_collector;
mod stats;
mod walker;

pub mod cli;

pub use crate::driver::Driver;
pub use crate::error::{Error, Result};
pub use crate::report::{RecordingSink, ReportSink, StdoutSink};
pub use crate::walker::WalkSettings;
