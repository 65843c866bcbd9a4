use bgate::hash::XxHasher;
use bgate::pipeline::process_file;
use bgate::store::SledIndexStore;
use bgate::types::{ReadStrategy, Tier};
use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;

proptest! {
    /// The tier at which a decision is reached never decreases as more
    /// files sharing a size bucket are admitted — a fresh size always
    /// resolves at `Size`, never later.
    #[test]
    fn first_file_at_a_never_before_seen_size_always_resolves_at_size_tier(
        bytes in prop::collection::vec(any::<u8>(), 1..4096),
    ) {
        let root = tempdir().unwrap();
        let store = SledIndexStore::open(&root.path().join("db"), ReadStrategy::SeekFringe).unwrap();
        let hasher = XxHasher;
        let path = root.path().join("f.bin");
        fs::write(&path, &bytes).unwrap();

        let decision = process_file(&path, &store, &hasher, None);
        prop_assert_eq!(decision.tier, Tier::Size);
    }

    /// Reprocessing byte-identical content a second time never resolves at
    /// an earlier tier than the first admission (tiers only increase as
    /// collisions accumulate).
    #[test]
    fn repeated_identical_content_resolves_at_tier_full_or_later(
        bytes in prop::collection::vec(any::<u8>(), 1..4096),
    ) {
        let root = tempdir().unwrap();
        let store = SledIndexStore::open(&root.path().join("db"), ReadStrategy::SeekFringe).unwrap();
        let hasher = XxHasher;
        let a = root.path().join("a.bin");
        let b = root.path().join("b.bin");
        fs::write(&a, &bytes).unwrap();
        fs::write(&b, &bytes).unwrap();

        let first = process_file(&a, &store, &hasher, None);
        let second = process_file(&b, &store, &hasher, None);

        prop_assert!(first.tier <= second.tier);
        prop_assert_eq!(second.tier, Tier::Full);
    }
}
