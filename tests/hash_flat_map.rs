use std::collections::BTreeMap;

use flatrb::HashFlatMap;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Generates random keys in a range small enough to cause collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both HashFlatMap and the
    /// ordered std model and asserts identical results at every step. The map
    /// starts tiny so the sequence crosses several rehash boundaries.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut hash_map: HashFlatMap<i64, i64> = HashFlatMap::with_capacity(2);
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(hash_map.insert(*k, *v), bt_map.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(hash_map.remove(k), bt_map.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(hash_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(hash_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(hash_map.first_key_value(), bt_map.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(hash_map.last_key_value(), bt_map.last_key_value(), "last_key_value");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(hash_map.pop_first(), bt_map.pop_first(), "pop_first");
                }
                MapOp::PopLast => {
                    prop_assert_eq!(hash_map.pop_last(), bt_map.pop_last(), "pop_last");
                }
            }
            prop_assert_eq!(hash_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(hash_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Tests that ordered iteration matches BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut hash_map: HashFlatMap<i64, i64> = HashFlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, v) in &entries {
            hash_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        let hash_items: Vec<_> = hash_map.iter().map(|(&k, &v)| (k, v)).collect();
        let bt_items: Vec<_> = bt_map.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&hash_items, &bt_items, "iter() mismatch");

        let hash_rev: Vec<_> = hash_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        let bt_rev: Vec<_> = bt_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&hash_rev, &bt_rev, "iter().rev() mismatch");

        let hash_keys: Vec<_> = hash_map.keys().copied().collect();
        let bt_keys: Vec<_> = bt_map.keys().copied().collect();
        prop_assert_eq!(&hash_keys, &bt_keys, "keys() mismatch");

        let hash_into: Vec<_> = hash_map.clone().into_iter().collect();
        let bt_into: Vec<_> = bt_map.clone().into_iter().collect();
        prop_assert_eq!(&hash_into, &bt_into, "into_iter() mismatch");
    }

    /// Tests that range() yields the same slice of the key space as
    /// BTreeMap::range.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        bound_a in key_strategy(),
        bound_b in key_strategy(),
    ) {
        let mut hash_map: HashFlatMap<i64, i64> = HashFlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            hash_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        let lo = bound_a.min(bound_b);
        let hi = bound_a.max(bound_b);

        let hash_range: Vec<_> = hash_map.range(lo..hi).map(|(&k, &v)| (k, v)).collect();
        let bt_range: Vec<_> = bt_map.range(lo..hi).map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&hash_range, &bt_range, "range({}..{}) mismatch", lo, hi);

        let hash_incl: Vec<_> = hash_map.range(lo..=hi).rev().map(|(&k, &v)| (k, v)).collect();
        let bt_incl: Vec<_> = bt_map.range(lo..=hi).rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&hash_incl, &bt_incl, "range({}..={}).rev() mismatch", lo, hi);
    }

    /// Tests the Entry API against BTreeMap's.
    #[test]
    fn entry_api_matches_btreemap(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entry_keys in proptest::collection::vec(key_strategy(), TEST_SIZE / 2),
    ) {
        let mut hash_map: HashFlatMap<i64, i64> = initial.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = initial.iter().copied().collect();

        for k in &entry_keys {
            let hash_val = hash_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(0);
            let bt_val = bt_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(0);
            prop_assert_eq!(*hash_val, *bt_val, "entry({})", k);
        }
        prop_assert!(hash_map.iter().eq(bt_map.iter()));
    }

    /// Tests OccupiedEntry::remove and VacantEntry::insert round trips.
    #[test]
    fn entry_remove_and_insert(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        keys in proptest::collection::vec(key_strategy(), 200),
    ) {
        use flatrb::hash_flat_map::Entry;

        let mut hash_map: HashFlatMap<i64, i64> = initial.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = initial.iter().copied().collect();

        for k in &keys {
            match hash_map.entry(*k) {
                Entry::Occupied(entry) => {
                    let removed = entry.remove();
                    prop_assert_eq!(Some(removed), bt_map.remove(k), "occupied remove({})", k);
                }
                Entry::Vacant(entry) => {
                    prop_assert_eq!(entry.key(), k);
                    entry.insert(*k ^ 0x5a);
                    bt_map.insert(*k, *k ^ 0x5a);
                }
            }
            prop_assert_eq!(hash_map.len(), bt_map.len());
        }
        prop_assert!(hash_map.iter().eq(bt_map.iter()));
    }

    /// Tests that append matches BTreeMap::append.
    #[test]
    fn append_matches_btreemap(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
    ) {
        let mut hash_a: HashFlatMap<i64, i64> = entries_a.iter().copied().collect();
        let mut hash_b: HashFlatMap<i64, i64> = entries_b.iter().copied().collect();
        let mut bt_a: BTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let mut bt_b: BTreeMap<i64, i64> = entries_b.iter().copied().collect();

        hash_a.append(&mut hash_b);
        bt_a.append(&mut bt_b);

        prop_assert!(hash_b.is_empty());
        prop_assert!(hash_a.iter().eq(bt_a.iter()));
    }

    /// Tests that shrink_to_fit preserves contents while reducing capacity.
    #[test]
    fn shrink_preserves_contents(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let mut hash_map: HashFlatMap<i64, i64> = HashFlatMap::with_capacity(TEST_SIZE * 2);
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            hash_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        let before = hash_map.capacity();
        hash_map.shrink_to_fit();
        prop_assert!(hash_map.capacity() <= before);
        prop_assert!(hash_map.capacity() >= hash_map.len());
        prop_assert!(hash_map.iter().eq(bt_map.iter()));
    }
}

// ─── Directed scenarios ──────────────────────────────────────────────────────

mod directed {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Growing a tiny table by a factor of hundreds crosses many rehash
    /// boundaries; every record must survive each move.
    #[test]
    fn growth_across_rehash_boundaries() {
        let mut map: HashFlatMap<u32, u32> = HashFlatMap::with_capacity(2);
        for k in 0..999 {
            assert_eq!(map.insert(k, k * 2), None);
            assert_eq!(map.first_key_value(), Some((&0, &0)));
            assert_eq!(map.last_key_value(), Some((&k, &(k * 2))));
        }
        assert_eq!(map.len(), 999);
        assert!(map.capacity() >= 999);
        for k in 0..999 {
            assert_eq!(map.get(&k), Some(&(k * 2)));
        }
        let keys: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (0..999).collect();
        assert_eq!(keys, expected);
    }

    /// Interleaved churn over a small key space, against the std model.
    #[test]
    fn random_churn_matches_model() {
        // Deterministic LCG so the scenario is reproducible.
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            state >> 33
        };

        let mut map: HashFlatMap<u64, u64> = HashFlatMap::with_capacity(4);
        let mut model: BTreeMap<u64, u64> = BTreeMap::new();
        for _ in 0..5000 {
            let k = next() % 700;
            let v = next();
            if v % 3 == 0 {
                assert_eq!(map.remove(&k), model.remove(&k));
            } else {
                assert_eq!(map.insert(k, v), model.insert(k, v));
            }
        }
        assert_eq!(map.len(), model.len());
        let ordered: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        let expected: Vec<_> = model.into_iter().collect();
        assert_eq!(ordered, expected);
    }

    /// Draining from the minimum end exercises the ordered cursors after
    /// collision-chain compaction.
    #[test]
    fn drain_from_the_minimum() {
        let mut map: HashFlatMap<u32, u32> = (0..500).map(|k| (k * 7 % 500, k)).collect();
        let mut expected = 0;
        while let Some((k, _)) = map.pop_first() {
            assert_eq!(k, expected);
            expected += 1;
        }
        assert_eq!(expected, 500);
        assert!(map.is_empty());
    }

    #[test]
    fn reserve_grows_capacity() {
        let mut map: HashFlatMap<u32, u32> = HashFlatMap::with_capacity(4);
        map.insert(1, 1);
        map.reserve(1000);
        assert!(map.capacity() >= 1001);
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn clear_resets_the_table() {
        let mut map: HashFlatMap<u32, u32> = (0..100).map(|k| (k, k)).collect();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.first_key_value(), None);
        map.insert(7, 7);
        assert_eq!(map.get(&7), Some(&7));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn custom_hasher_builds_equal_map() {
        use flatrb::DefaultHashBuilder;

        let hasher = DefaultHashBuilder::default();
        let mut map: HashFlatMap<u32, u32, _> = HashFlatMap::with_capacity_and_hasher(8, hasher);
        for k in [5u32, 3, 8, 1] {
            map.insert(k, k);
        }
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, [1, 3, 5, 8]);
    }

    #[test]
    fn index_returns_value() {
        let map = HashFlatMap::from([(1u32, 10u32), (2, 20)]);
        assert_eq!(map[&1], 10);
        assert_eq!(map[&2], 20);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map: HashFlatMap<u32, u32> = HashFlatMap::new();
        let _ = map[&42];
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end")]
    fn inverted_range_panics() {
        let map = HashFlatMap::from([(1u32, 1u32), (2, 2)]);
        let _ = map.range(2..1);
    }

    #[test]
    #[should_panic(expected = "`capacity` must be at least 1")]
    fn zero_capacity_is_rejected() {
        let _map: HashFlatMap<u32, u32> = HashFlatMap::with_capacity(0);
    }

    #[test]
    fn debug_formats_as_map() {
        let map = HashFlatMap::from([(2u32, 20u32), (1, 10)]);
        assert_eq!(format!("{map:?}"), "{1: 10, 2: 20}");
    }
}
