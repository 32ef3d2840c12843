#![no_main]

use libfuzzer_sys::fuzz_target;
use seqmatch::index::intset::AnyIntset;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode to a valid set or fail cleanly
    if let Ok(set) = AnyIntset::read(&mut &data[..]) {
        assert!(set.validate().is_ok());
        let values: Vec<u64> = set.iter().collect();
        assert_eq!(values.len(), set.size());
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        for (idx, &value) in values.iter().enumerate() {
            assert_eq!(set.get(idx).ok(), Some(value));
            assert_eq!(set.get_idx_smallest_geq(value), idx);
            assert!(set.is_member(value));
        }
        if let Some(past_last) = values.last().map_or(Some(0), |&last| last.checked_add(1)) {
            assert_eq!(set.get_idx_smallest_geq(past_last), set.capacity());
        }
    }
});
