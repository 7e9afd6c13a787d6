//! Positional view over one tab-delimited schedule line
//!
//! Records are never materialized into owned structs: a `ScheduleRecord`
//! borrows the stripped line bytes and exposes the fields the aggregator
//! needs. Keys are compared as raw bytes; only the subject is decoded.

use std::borrow::Cow;

use crate::error::{AggregateError, Result};

/// Minimum number of tab-separated fields a record must carry
pub const MIN_FIELDS: usize = 3;

/// How the subject is derived from the subject-and-section field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubjectGrouping {
    /// Prefix before the first hyphen (`MATH-101` -> `MATH`)
    #[default]
    Subject,
    /// The whole field (`MATH-101` -> `MATH-101`)
    Section,
}

/// A parsed schedule line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRecord<'a> {
    line: &'a [u8],
    code_part_a: &'a [u8],
    code_part_b: &'a [u8],
    subject_and_section: &'a [u8],
}

impl<'a> ScheduleRecord<'a> {
    /// Split an already stripped line into fields
    ///
    /// `line_number` is 1-based and only used for error reporting.
    pub fn parse(line: &'a [u8], line_number: u64) -> Result<Self> {
        let mut fields = line.split(|&b| b == b'\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(code_part_a), Some(code_part_b), Some(subject_and_section)) => Ok(Self {
                line,
                code_part_a,
                code_part_b,
                subject_and_section,
            }),
            _ => Err(AggregateError::MalformedRecord {
                line_number,
                field_count: line.split(|&b| b == b'\t').count(),
                line: String::from_utf8_lossy(line).into_owned(),
            }),
        }
    }

    /// The stripped line this record was parsed from
    pub fn line(&self) -> &'a [u8] {
        self.line
    }

    /// Composite identity: field 0 and field 1 concatenated without separator
    pub fn unique_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.code_part_a.len() + self.code_part_b.len());
        key.extend_from_slice(self.code_part_a);
        key.extend_from_slice(self.code_part_b);
        key
    }

    pub fn subject_and_section(&self) -> &'a [u8] {
        self.subject_and_section
    }

    /// Subject code under the requested grouping
    ///
    /// Invalid UTF-8 in the subject is replaced with U+FFFD for display.
    pub fn subject(&self, grouping: SubjectGrouping) -> Cow<'a, str> {
        let field = self.subject_and_section();
        let bytes = match grouping {
            SubjectGrouping::Subject => subject_of(field),
            SubjectGrouping::Section => field,
        };
        String::from_utf8_lossy(bytes)
    }
}

/// Portion of a subject-and-section field before its first hyphen
///
/// Returns the whole field when it has no hyphen.
pub fn subject_of(subject_and_section: &[u8]) -> &[u8] {
    subject_and_section
        .iter()
        .position(|&b| b == b'-')
        .map_or(subject_and_section, |end| &subject_and_section[..end])
}

/// Strip the trailing newline and ASCII whitespace from a raw input line
pub fn strip_line(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |last| last + 1);
    &raw[..end]
}
