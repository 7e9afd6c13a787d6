//! Single-pass deduplicate-and-aggregate over a schedule file
//!
//! The first record seen for a unique key is canonical and counts toward its
//! subject. Every later record with the same key goes to the duplicates log.

use fnv::FnvHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::cli::MalformedPolicy;
use crate::duplicates::DuplicateLog;
use crate::error::{AggregateError, FileAction, Result};
use crate::record::{strip_line, ScheduleRecord, SubjectGrouping};
use crate::stats::AggregateSummary;

/// Knobs for one aggregation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub grouping: SubjectGrouping,
    pub on_malformed: MalformedPolicy,
    /// Discard the first line before processing
    pub skip_header: bool,
    /// Also log canonical records to the side file
    pub log_inserts: bool,
}

/// Stateful aggregator; all state is owned by one run
#[derive(Debug)]
pub struct ScheduleAggregator {
    config: AggregatorConfig,
    seen: FnvHashSet<Vec<u8>>,
    summary: AggregateSummary,
}

impl ScheduleAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            seen: FnvHashSet::default(),
            summary: AggregateSummary::default(),
        }
    }

    /// Process one raw input line (newline included or not)
    ///
    /// `line_number` is 1-based and only used in error messages. Keys are
    /// compared byte for byte, so input need not be valid UTF-8.
    pub fn process_line<W: Write>(
        &mut self,
        raw: &[u8],
        line_number: u64,
        log: &mut DuplicateLog<W>,
    ) -> Result<()> {
        let line = strip_line(raw);
        self.summary.total_lines += 1;

        let record = match ScheduleRecord::parse(line, line_number) {
            Ok(record) => record,
            Err(err)
                if err.is_malformed_record() && self.config.on_malformed == MalformedPolicy::Skip =>
            {
                tracing::warn!("Skipping {}", err);
                self.summary.malformed_count += 1;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let key = record.unique_key();
        if self.seen.contains(&key) {
            tracing::trace!(line_number, key = %String::from_utf8_lossy(&key), "duplicate");
            log.duplicate(record.line())?;
            self.summary.duplicate_count += 1;
        } else {
            log.insert(record.line())?;
            self.seen.insert(key);
            self.summary
                .subject_counts
                .record(&record.subject(self.config.grouping));
            self.summary.unique_count += 1;
        }

        Ok(())
    }

    /// Number of distinct unique keys seen so far
    pub fn distinct_keys(&self) -> usize {
        self.seen.len()
    }

    /// Consume the aggregator and return the result
    pub fn finish(self) -> AggregateSummary {
        self.summary
    }
}

/// Aggregate every line of `reader`, writing duplicates to `sink`
///
/// Lines are handled as raw bytes. Only the subject is decoded, lossily.
pub fn aggregate<R: BufRead, W: Write>(
    mut reader: R,
    sink: W,
    config: &AggregatorConfig,
) -> Result<AggregateSummary> {
    let mut aggregator = ScheduleAggregator::new(*config);
    let mut log = DuplicateLog::new(sink, config.log_inserts);
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        if line_number == 1 && config.skip_header {
            tracing::debug!("Skipping header line");
            continue;
        }

        aggregator.process_line(&buf, line_number, &mut log)?;
    }

    let log_entries = log.written();
    log.finish()?;

    let distinct_keys = aggregator.distinct_keys();
    let summary = aggregator.finish();
    tracing::debug!(
        total_lines = summary.total_lines,
        distinct_keys,
        log_entries,
        unique = summary.unique_count,
        duplicates = summary.duplicate_count,
        malformed = summary.malformed_count,
        subjects = summary.subject_counts.len(),
        "Aggregation pass complete"
    );
    Ok(summary)
}

/// Open `input` for reading and `duplicates` for writing, then aggregate
///
/// The side file is truncated. If the input cannot be opened the side file
/// is left untouched.
pub fn aggregate_files(
    input: &Path,
    duplicates: &Path,
    config: &AggregatorConfig,
) -> Result<AggregateSummary> {
    let start = Instant::now();

    let reader = File::open(input).map_err(|source| AggregateError::FileAccess {
        path: input.to_path_buf(),
        action: FileAction::Read,
        source,
    })?;
    let writer = File::create(duplicates).map_err(|source| AggregateError::FileAccess {
        path: duplicates.to_path_buf(),
        action: FileAction::Write,
        source,
    })?;

    tracing::debug!(
        input = %input.display(),
        duplicates = %duplicates.display(),
        "Opened schedule and duplicates files"
    );

    let summary = aggregate(BufReader::new(reader), BufWriter::new(writer), config)?;

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Run finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, config: &AggregatorConfig) -> (AggregateSummary, String) {
        let mut sink = Vec::new();
        let summary = aggregate(input.as_bytes(), &mut sink, config).unwrap();
        (summary, String::from_utf8(sink).unwrap())
    }

    #[test]
    fn test_reference_example() {
        let input = "A1\tB1\tMATH-101\nA1\tB1\tMATH-101\nA2\tB2\tPHYS-201\n";
        let (summary, dups) = run(input, &AggregatorConfig::default());

        assert_eq!(summary.subject_counts.sorted(), vec![("MATH", 1), ("PHYS", 1)]);
        assert_eq!(summary.duplicate_count, 1);
        assert_eq!(summary.total_lines, 3);
        assert_eq!(summary.unique_count, 2);
        assert_eq!(dups, "DUPLICATE: 'A1\tB1\tMATH-101'\n");
    }

    #[test]
    fn test_duplicate_detection_ignores_subject_field() {
        // Same key, different subject: the second record is still a duplicate
        let input = "A\tB\tMATH-1\nA\tB\tPHYS-2\n";
        let (summary, dups) = run(input, &AggregatorConfig::default());
        assert_eq!(summary.subject_counts.get("MATH"), 1);
        assert_eq!(summary.subject_counts.get("PHYS"), 0);
        assert_eq!(summary.duplicate_count, 1);
        assert!(dups.contains("PHYS-2"));
    }

    #[test]
    fn test_all_distinct_keys_have_no_duplicates() {
        let input = "1\ta\tX-1\n2\ta\tX-2\n3\ta\tY-1\n";
        let (summary, dups) = run(input, &AggregatorConfig::default());
        assert_eq!(summary.duplicate_count, 0);
        assert_eq!(summary.subject_counts.total(), 3);
        assert!(dups.is_empty());
    }

    #[test]
    fn test_no_trailing_newline_and_crlf() {
        let input = "A\tB\tMATH-1\r\nA\tB\tMATH-1";
        let (summary, dups) = run(input, &AggregatorConfig::default());
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.duplicate_count, 1);
        assert_eq!(dups, "DUPLICATE: 'A\tB\tMATH-1'\n");
    }

    #[test]
    fn test_empty_input() {
        let (summary, dups) = run("", &AggregatorConfig::default());
        assert_eq!(summary, AggregateSummary::default());
        assert!(dups.is_empty());
    }

    #[test]
    fn test_malformed_aborts_by_default() {
        let input = "A\tB\tMATH-1\nonly\tTwo\n";
        let mut sink = Vec::new();
        let err = aggregate(input.as_bytes(), &mut sink, &AggregatorConfig::default()).unwrap_err();
        match err {
            AggregateError::MalformedRecord {
                line_number,
                field_count,
                ..
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(field_count, 2);
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_skipped_under_skip_policy() {
        let config = AggregatorConfig {
            on_malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let input = "A\tB\tMATH-1\n\nbad line\nA\tB\tMATH-1\n";
        let (summary, _) = run(input, &config);
        assert_eq!(summary.total_lines, 4);
        assert_eq!(summary.malformed_count, 2);
        assert_eq!(summary.duplicate_count, 1);
        assert_eq!(summary.unique_count, 1);
    }

    #[test]
    fn test_skip_header() {
        let config = AggregatorConfig {
            skip_header: true,
            ..Default::default()
        };
        let input = "term\tcode\tsubject\nA\tB\tMATH-1\n";
        let (summary, _) = run(input, &config);
        assert_eq!(summary.total_lines, 1);
        assert_eq!(summary.subject_counts.sorted(), vec![("MATH", 1)]);
    }

    #[test]
    fn test_header_line_is_counted_without_skip() {
        let input = "term\tcode\tsubject\nA\tB\tMATH-1\n";
        let (summary, _) = run(input, &AggregatorConfig::default());
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.subject_counts.get("subject"), 1);
    }

    #[test]
    fn test_section_grouping() {
        let config = AggregatorConfig {
            grouping: SubjectGrouping::Section,
            ..Default::default()
        };
        let input = "1\ta\tMATH-1\n2\ta\tMATH-2\n3\ta\tMATH-1\n";
        let (summary, _) = run(input, &config);
        assert_eq!(
            summary.subject_counts.sorted(),
            vec![("MATH-1", 2), ("MATH-2", 1)]
        );
    }

    #[test]
    fn test_log_inserts() {
        let config = AggregatorConfig {
            log_inserts: true,
            ..Default::default()
        };
        let (_, dups) = run("A\tB\tX-1\nA\tB\tX-1\n", &config);
        assert_eq!(dups, "INSERTING: 'A\tB\tX-1'\nDUPLICATE: 'A\tB\tX-1'\n");
    }

    #[test]
    fn test_invalid_utf8_subject_is_decoded_lossily() {
        let input: &[u8] = b"A\tB\tMATH-1\nC\tD\t\xffBAD-2\n";
        let mut sink = Vec::new();
        let summary = aggregate(input, &mut sink, &AggregatorConfig::default()).unwrap();
        assert_eq!(summary.unique_count, 2);
        assert_eq!(summary.subject_counts.get("\u{FFFD}BAD"), 1);
    }

    #[test]
    fn test_keys_differing_only_in_invalid_bytes_are_distinct() {
        let input: &[u8] = b"A\xff\tB\tMATH-1\nA\xfe\tB\tPHYS-1\n";
        let mut sink = Vec::new();
        let summary = aggregate(input, &mut sink, &AggregatorConfig::default()).unwrap();
        assert_eq!(summary.duplicate_count, 0);
        assert_eq!(summary.subject_counts.sorted(), vec![("MATH", 1), ("PHYS", 1)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_duplicate_with_invalid_bytes_is_logged_verbatim() {
        let input: &[u8] = b"A\xfe\tB\tPHYS-1\nA\xfe\tB\tPHYS-1\r\n";
        let mut sink = Vec::new();
        let summary = aggregate(input, &mut sink, &AggregatorConfig::default()).unwrap();
        assert_eq!(summary.duplicate_count, 1);
        assert_eq!(sink, b"DUPLICATE: 'A\xfe\tB\tPHYS-1'\n".to_vec());
    }

    #[test]
    fn test_process_line_tracks_distinct_keys() {
        let mut aggregator = ScheduleAggregator::new(AggregatorConfig::default());
        let mut log = DuplicateLog::new(Vec::new(), false);
        aggregator.process_line(b"A\tB\tX-1\n", 1, &mut log).unwrap();
        aggregator.process_line(b"A\tB\tX-1\n", 2, &mut log).unwrap();
        aggregator.process_line(b"A\tC\tX-1\n", 3, &mut log).unwrap();
        assert_eq!(aggregator.distinct_keys(), 2);
        let summary = aggregator.finish();
        assert_eq!(summary.subject_counts.get("X"), 2);
        assert_eq!(summary.duplicate_count, 1);
    }
}
