#![no_main]

use libfuzzer_sys::fuzz_target;
use vpucost_workload::{infer_input_dims, output_dim};

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let word = |i: usize| u32::from_le_bytes(data[i * 4..i * 4 + 4].try_into().unwrap());
    let (o, k, p, s) = (word(0), word(1), word(2), word(3));

    // Inference must never panic, and any accepted result must reproduce
    // the requested output when the forward formula is re-applied.
    if let Ok(dims) = infer_input_dims(&[o], &[k], &[p], &[s]) {
        assert_eq!(output_dim(dims[0], k, p, s), Some(o));
    }
});
