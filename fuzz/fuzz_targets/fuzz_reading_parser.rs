#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (timestamp, density) = data;
    if let Some(od) = growth_core::normalize::parse_density(density) {
        assert!(od.is_finite());
    }
    let _ = growth_core::normalize::parse_timestamp(timestamp);
});
