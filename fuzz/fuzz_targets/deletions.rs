#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use vwsimplify::arbtests;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let _ = arbtests::deletions_are_consistent(&mut u);
    let _ = arbtests::tolerance_is_monotonic(&mut u);
    let _ = arbtests::quota_is_met(&mut u);
    let _ = arbtests::shared_rings_are_idempotent(&mut u);
});
