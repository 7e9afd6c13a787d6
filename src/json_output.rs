//! JSON output format for the run summary

use serde::{Deserialize, Serialize};

use crate::filter::SubjectFilter;
use crate::stats::AggregateSummary;

/// One subject row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonSubject {
    pub subject: String,
    pub count: u64,
}

/// Totals for the run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonSummary {
    /// Lines read (a skipped header excluded)
    pub total_lines: u64,
    pub duplicates: u64,
    /// Canonical records
    pub unique: u64,
    /// Lines skipped as malformed
    #[serde(skip_serializing_if = "is_zero", default)]
    pub malformed: u64,
    /// Distinct subjects, before filtering
    pub subjects: usize,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Subjects sorted ascending
    pub subjects: Vec<JsonSubject>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document from a summary, applying the subject filter
    pub fn from_summary(summary: &AggregateSummary, filter: &SubjectFilter) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "schedtally-json-v1".to_string(),
            subjects: summary
                .subject_counts
                .sorted_filtered(filter)
                .into_iter()
                .map(|(subject, count)| JsonSubject {
                    subject: subject.to_string(),
                    count,
                })
                .collect(),
            summary: JsonSummary {
                total_lines: summary.total_lines,
                duplicates: summary.duplicate_count,
                unique: summary.unique_count,
                malformed: summary.malformed_count,
                subjects: summary.subject_counts.len(),
            },
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
