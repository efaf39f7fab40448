#![no_main]

use cardinality_sketch::AdaptiveCounter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must either decode cleanly or be rejected, never panic
    if let Ok(counter) = AdaptiveCounter::from_bytes(data) {
        assert_eq!(counter.to_bytes(), data);

        let mut destination = AdaptiveCounter::new(counter.precision()).unwrap();
        destination.merge_bytes(&[data]).unwrap();
        assert_eq!(destination.card(), counter.card());
    }
});
