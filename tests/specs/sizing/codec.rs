//! Compression codec round trips.

use proptest::prelude::*;
use sv_core::codec::{compress, decompress};
use sv_core::CompressionType;

proptest! {
    #[test]
    fn every_codec_round_trips(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        for algorithm in CompressionType::ALL {
            let packed = compress(&data, algorithm).unwrap();
            prop_assert_eq!(decompress(&packed, algorithm).unwrap(), data.clone());
        }
    }
}

#[test]
fn none_is_identity() {
    let data = b"as stored".to_vec();
    assert_eq!(compress(&data, CompressionType::None).unwrap(), data);
}
