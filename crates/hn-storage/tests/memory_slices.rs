//! Range reads behave like clamped slicing.

use hn_storage::{MemoryBackend, PrivateAppStorage};
use proptest::prelude::*;

proptest! {
    #[test]
    fn read_slice_matches_clamped_slice(
        data in prop::collection::vec(any::<u8>(), 0..256),
        offset in 0_u64..300,
        length in 0_u64..300,
    ) {
        let backend = MemoryBackend::new();
        let storage = backend.app("prop");
        storage.save("blob", &data).unwrap();

        let start = (offset as usize).min(data.len());
        let end = ((offset + length) as usize).min(data.len());
        prop_assert_eq!(storage.read_slice("blob", offset, length), Some(data[start..end].to_vec()));
        prop_assert_eq!(storage.size("blob"), Some(data.len() as u64));
    }
}
