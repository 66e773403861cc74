//! Shard size calculator properties.

use proptest::prelude::*;
use sv_core::sizing::{
    is_safe_raw_size, safe_shard_size, safe_shard_size_for_ratio, shard_count, SizingError,
    BASE64_EXPANSION, DOCUMENT_LIMIT, METADATA_RESERVE,
};

#[test]
fn base_shard_fits_a_document_once_encoded() {
    let s = safe_shard_size();
    let encoded = (s as f64 * BASE64_EXPANSION).ceil() as u64;
    assert!(encoded + METADATA_RESERVE <= DOCUMENT_LIMIT);
    assert!(is_safe_raw_size(s));
}

#[test]
fn ratio_outside_unit_interval_is_rejected() {
    for ratio in [0.0, -0.5, 1.5, f64::NAN] {
        assert!(matches!(
            safe_shard_size_for_ratio(ratio),
            Err(SizingError::InvalidRatio(_))
        ));
    }
}

proptest! {
    #[test]
    fn better_compression_allows_larger_chunks(a in 0.01f64..=1.0, b in 0.01f64..=1.0) {
        prop_assume!((a - b).abs() > 1e-6);
        let (better, worse) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(
            safe_shard_size_for_ratio(better).unwrap() > safe_shard_size_for_ratio(worse).unwrap()
        );
    }

    #[test]
    fn shard_count_covers_the_payload(total in 0u64..(1 << 36)) {
        let count = shard_count(total);
        let size = safe_shard_size();
        prop_assert!(count * size >= total);
        prop_assert!(count == 0 || (count - 1) * size < total);
    }
}
