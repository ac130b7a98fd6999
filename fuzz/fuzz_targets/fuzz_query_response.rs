//! Fuzz target: `parse_query_response`
//!
//! Arbitrary Moonraker replies must either fail to decode or produce a
//! snapshot with exactly the requested number of gates.
//!
//! cargo fuzz run fuzz_query_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use spoolgate::moonraker::parse_query_response;

fuzz_target!(|data: &[u8]| {
    let gate_count = data.first().map_or(0, |b| (*b % 33) as usize);
    let body = data.get(1..).unwrap_or_default();

    if let Ok(snapshot) = parse_query_response(body, "mmu_pre_gate_", gate_count) {
        assert_eq!(snapshot.len(), gate_count);
    }
});
