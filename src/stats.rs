//! Per-subject tallies and the run summary
//!
//! Only canonical (first-seen) records reach `SubjectCounts::record`, so the
//! sum of all counts equals the number of distinct unique keys.

use fnv::FnvHashMap;
use std::io::{self, Write};

use crate::filter::SubjectFilter;

/// Map from subject code to the number of canonical records seen for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectCounts {
    counts: FnvHashMap<String, u64>,
}

impl SubjectCounts {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one canonical record for `subject`
    pub fn record(&mut self, subject: &str) {
        // Avoid allocating a key for subjects we have already seen
        if let Some(count) = self.counts.get_mut(subject) {
            *count += 1;
        } else {
            self.counts.insert(subject.to_string(), 1);
        }
    }

    /// Count for a single subject (0 if never seen)
    pub fn get(&self, subject: &str) -> u64 {
        self.counts.get(subject).copied().unwrap_or(0)
    }

    /// Number of distinct subjects
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries sorted ascending by subject (byte-wise string comparison)
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(subject, count)| (subject.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Sorted entries restricted to subjects the filter shows
    pub fn sorted_filtered<'a>(&'a self, filter: &SubjectFilter) -> Vec<(&'a str, u64)> {
        let mut entries = self.sorted();
        entries.retain(|(subject, _)| filter.should_show(subject));
        entries
    }
}

/// Result of one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub subject_counts: SubjectCounts,
    /// Every line read, malformed ones included (a skipped header is not)
    pub total_lines: u64,
    pub duplicate_count: u64,
    /// Canonical records, equal to `subject_counts.total()`
    pub unique_count: u64,
    /// Lines skipped under the skip policy
    pub malformed_count: u64,
}

impl AggregateSummary {
    /// Write the sorted `<subject>: <count>` lines and the totals line
    pub fn write_text<W: Write>(&self, out: &mut W, filter: &SubjectFilter) -> io::Result<()> {
        for (subject, count) in self.subject_counts.sorted_filtered(filter) {
            writeln!(out, "{}: {}", subject, count)?;
        }
        writeln!(
            out,
            "{} lines, {} duplicates",
            self.total_lines, self.duplicate_count
        )
    }

    /// Write the extended report (section/subject totals and record split)
    pub fn write_extended<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "total: {} sections, {} subjects",
            self.subject_counts.total(),
            self.subject_counts.len()
        )?;
        writeln!(
            out,
            "parsed {} records, removed {} duplicates",
            self.unique_count, self.duplicate_count
        )?;
        if self.malformed_count > 0 {
            writeln!(out, "skipped {} malformed records", self.malformed_count)?;
        }
        Ok(())
    }

    /// Print the text summary to stdout
    pub fn print_summary(&self, filter: &SubjectFilter) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_text(&mut lock, filter)
    }
}
