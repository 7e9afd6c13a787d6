#![no_main]

use libfuzzer_sys::fuzz_target;
use schedtally::aggregator::{aggregate, AggregatorConfig};
use schedtally::cli::MalformedPolicy;

fuzz_target!(|data: &[u8]| {
    let config = AggregatorConfig {
        on_malformed: MalformedPolicy::Skip,
        ..Default::default()
    };
    if let Ok(summary) = aggregate(data, std::io::sink(), &config) {
        assert_eq!(summary.subject_counts.total(), summary.unique_count);
        assert_eq!(
            summary.total_lines,
            summary.unique_count + summary.duplicate_count + summary.malformed_count
        );
    }
});
