//! CSV output format for subject counts

use crate::filter::SubjectFilter;
use crate::stats::AggregateSummary;

/// CSV formatter: `subject,count` rows followed by totals rows
#[derive(Debug)]
pub struct CsvSummaryOutput<'a> {
    rows: Vec<(&'a str, u64)>,
    total_lines: u64,
    duplicates: u64,
}

impl<'a> CsvSummaryOutput<'a> {
    pub fn from_summary(summary: &'a AggregateSummary, filter: &SubjectFilter) -> Self {
        Self {
            rows: summary.subject_counts.sorted_filtered(filter),
            total_lines: summary.total_lines,
            duplicates: summary.duplicate_count,
        }
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    ///
    /// A leading `#` is quoted too, so a subject never reads as a totals row.
    fn escape_field(field: &str) -> String {
        if field.starts_with('#') || field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Generate CSV output as string
    ///
    /// Totals rows use the reserved keys `#lines` and `#duplicates`, which
    /// only ever appear unquoted after the subject rows.
    pub fn to_csv(&self) -> String {
        let mut output = String::from("subject,count\n");

        for (subject, count) in &self.rows {
            output.push_str(&Self::escape_field(subject));
            output.push(',');
            output.push_str(&count.to_string());
            output.push('\n');
        }

        output.push_str(&format!("#lines,{}\n", self.total_lines));
        output.push_str(&format!("#duplicates,{}\n", self.duplicates));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(CsvSummaryOutput::escape_field("MATH"), "MATH");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(CsvSummaryOutput::escape_field("A,B"), "\"A,B\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(
            CsvSummaryOutput::escape_field("say \"hi\""),
            "\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn test_csv_escape_field_with_carriage_return() {
        assert_eq!(CsvSummaryOutput::escape_field("MA\rTH"), "\"MA\rTH\"");
    }

    #[test]
    fn test_subject_named_like_totals_row_is_quoted() {
        let mut summary = AggregateSummary::default();
        summary.subject_counts.record("#lines");
        summary.total_lines = 1;

        let csv = CsvSummaryOutput::from_summary(&summary, &SubjectFilter::all()).to_csv();
        assert_eq!(
            csv,
            "subject,count\n\"#lines\",1\n#lines,1\n#duplicates,0\n"
        );
    }

    #[test]
    fn test_csv_output() {
        let mut summary = AggregateSummary::default();
        summary.subject_counts.record("PHYS");
        summary.subject_counts.record("MATH");
        summary.total_lines = 3;
        summary.duplicate_count = 1;

        let csv = CsvSummaryOutput::from_summary(&summary, &SubjectFilter::all()).to_csv();
        assert_eq!(
            csv,
            "subject,count\nMATH,1\nPHYS,1\n#lines,3\n#duplicates,1\n"
        );
    }

    #[test]
    fn test_csv_empty_summary() {
        let summary = AggregateSummary::default();
        let csv = CsvSummaryOutput::from_summary(&summary, &SubjectFilter::all()).to_csv();
        assert_eq!(csv, "subject,count\n#lines,0\n#duplicates,0\n");
    }
}
