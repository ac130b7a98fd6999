//! Fuzz target: `LineAssembler::feed` + `parse_line`
//!
//! Drives arbitrary reader output through the line splitter and the scan
//! parser, asserting that neither panics and that every emitted line fits
//! the assembler's buffer.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use spoolgate::scan::{LineAssembler, MAX_LINE_LEN, ScanLine, parse_line};

fuzz_target!(|data: &[u8]| {
    let mut assembler = LineAssembler::new();

    assembler.feed(data, |line| {
        assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
        assert!(!line.contains('\n'), "terminator leaked into line");
        if let ScanLine::Scan(event) = parse_line(&line) {
            assert!(event.identifier.len() < MAX_LINE_LEN);
        }
    });
    assert!(assembler.pending_len() <= MAX_LINE_LEN);

    // After a reset the assembler must accept bytes cleanly again.
    assembler.reset();
    assembler.feed(data, |_| {});
});
