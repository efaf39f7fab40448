#![no_main]

use cardinality_sketch::AdaptiveCounter;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut counter1 = AdaptiveCounter::new(8).unwrap();
    for chunk in first_half.chunks(4) {
        counter1.offer(chunk);
        assert!(counter1.card() > 0);
        assert!(!counter1.is_empty());
    }

    let mut counter2 = AdaptiveCounter::new(8).unwrap();
    for chunk in second_half.chunks(4) {
        counter2.offer(chunk);
    }

    let before: Vec<u8> = counter1.registers().to_vec();
    counter1.merge_bytes(&[&counter2.to_bytes()]).unwrap();

    // merge may only raise registers
    for (merged, original) in counter1.registers().iter().zip(&before) {
        assert!(merged >= original);
    }
});
