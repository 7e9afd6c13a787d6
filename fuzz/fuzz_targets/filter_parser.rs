#![no_main]

use libfuzzer_sys::fuzz_target;
use schedtally::filter::SubjectFilter;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must not panic regardless of input
        if let Ok(filter) = SubjectFilter::from_expr(input) {
            let _ = filter.should_show(input);
        }
    }
});
