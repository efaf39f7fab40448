//! End-to-end counting and merge scenarios.

use cardinality_sketch::{AdaptiveCounter, Error};

fn offer_range(counter: &mut AdaptiveCounter, range: std::ops::RangeInclusive<u64>) {
    for i in range {
        counter.offer(&i.to_le_bytes());
    }
}

/// From 1 to 500000 distinct elements, sample the adaptive estimate every
/// 50000 and require the relative error to stay within a narrow band that
/// does not grow with the stream length.
#[test]
fn adaptive_error_stays_bounded_while_counting() {
    let mut counter = AdaptiveCounter::new(16).unwrap();

    for i in 1u64..=500_000 {
        counter.offer(&i.to_le_bytes());

        if i % 50_000 == 0 {
            let estimate = counter.card();
            let error = (estimate as f64 - i as f64).abs() / i as f64;
            assert!(
                error < 0.03,
                "actual: {}, estimated: {}, error: {:.2}%",
                i,
                estimate,
                error * 100.0
            );
        }
    }
}

/// Same stream through the loglog estimator. Its small-range bias is real,
/// so only the checkpoints past a few multiples of the register count are
/// held to a bound.
#[test]
fn loglog_error_stays_bounded_once_loaded() {
    let mut counter = AdaptiveCounter::new(16).unwrap();
    let m = counter.num_registers() as u64;

    for i in 1u64..=500_000 {
        counter.offer(&i.to_le_bytes());

        if i % 50_000 == 0 && i >= 3 * m {
            let estimate = counter.card_loglog();
            let error = (estimate as f64 - i as f64).abs() / i as f64;
            assert!(
                error < 0.05,
                "actual: {}, estimated: {}, error: {:.2}%",
                i,
                estimate,
                error * 100.0
            );
        }
    }
}

/// Serialize-and-merge scenario:
/// 1. The destination counts 1 to 20000.
/// 2. One source counts 10000 to 30000, serialized to `buf1`.
/// 3. Another counts 20000 to 40000, serialized to `buf2`.
/// 4. Merging both buffers must estimate the union {1..40000}, not the sum
///    of the three counts.
#[test]
fn merging_buffers_estimates_the_union() {
    let mut ctx = AdaptiveCounter::new(16).unwrap();
    let mut tbm1 = AdaptiveCounter::new(16).unwrap();
    let mut tbm2 = AdaptiveCounter::new(16).unwrap();

    offer_range(&mut ctx, 1..=20_000);
    offer_range(&mut tbm1, 10_000..=30_000);
    offer_range(&mut tbm2, 20_000..=40_000);

    let buf1 = tbm1.to_bytes();
    let buf2 = tbm2.to_bytes();
    ctx.merge_bytes(&[&buf1, &buf2]).unwrap();

    let estimate = ctx.card();
    let error = (estimate as f64 - 40_000.0).abs() / 40_000.0;
    assert!(
        error < 0.02,
        "actual: 40000, estimated: {}, error: {:.2}%",
        estimate,
        error * 100.0
    );
}

/// The merged sketch must be register-identical to a single sketch that
/// observed every element itself.
#[test]
fn merged_sketch_equals_directly_built_sketch() {
    let mut merged = AdaptiveCounter::new(14).unwrap();
    let mut part1 = AdaptiveCounter::new(14).unwrap();
    let mut part2 = AdaptiveCounter::new(14).unwrap();
    let mut whole = AdaptiveCounter::new(14).unwrap();

    offer_range(&mut merged, 1..=10_000);
    offer_range(&mut part1, 5_000..=15_000);
    offer_range(&mut part2, 12_000..=20_000);
    offer_range(&mut whole, 1..=20_000);

    merged
        .merge_bytes(&[&part1.to_bytes(), &part2.to_bytes()])
        .unwrap();

    assert_eq!(merged, whole);
    assert_eq!(merged.card(), whole.card());
    assert_eq!(merged.card_loglog(), whole.card_loglog());
}

#[test]
fn merging_rejects_other_precisions() {
    let mut ctx = AdaptiveCounter::new(16).unwrap();
    let mut other = AdaptiveCounter::new(12).unwrap();
    offer_range(&mut other, 1..=100);

    assert_eq!(
        ctx.merge_bytes(&[&other.to_bytes()]),
        Err(Error::PrecisionMismatch {
            expected: 16,
            actual: 12
        })
    );
    assert_eq!(ctx.card(), 0);
}

#[test]
fn merging_rejects_corrupt_buffers() {
    let mut ctx = AdaptiveCounter::new(12).unwrap();
    offer_range(&mut ctx, 1..=1_000);
    let before = ctx.card();

    let mut truncated = ctx.to_bytes();
    truncated.pop();
    assert!(matches!(
        ctx.merge_bytes(&[&truncated]),
        Err(Error::LengthMismatch { .. })
    ));

    let mut wrong_version = ctx.to_bytes();
    wrong_version[0] = 0;
    assert_eq!(
        ctx.merge_bytes(&[&wrong_version]),
        Err(Error::UnsupportedVersion(0))
    );

    assert_eq!(ctx.card(), before);
}

/// Serialization survives a full restart of the counting pipeline: bytes
/// written by one sketch reconstruct a sketch with the same estimates.
#[test]
fn serialized_sketch_restores_estimates() {
    let mut original = AdaptiveCounter::new(16).unwrap();
    offer_range(&mut original, 1..=75_000);

    let restored = AdaptiveCounter::from_bytes(&original.to_bytes()).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored.card(), original.card());

    // the restored sketch keeps counting seamlessly
    let mut restored = restored;
    offer_range(&mut restored, 75_001..=80_000);
    let error = (restored.card() as f64 - 80_000.0).abs() / 80_000.0;
    assert!(error < 0.03);
}
