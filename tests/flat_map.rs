use std::collections::BTreeMap;

use flatrb::FlatMap;
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
    GetKeyValue(i64),
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
        1 => key_strategy().prop_map(MapOp::GetKeyValue),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of insert/remove/get operations on both
    /// FlatMap and BTreeMap and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(flat_map.insert(*k, *v), bt_map.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(flat_map.remove(k), bt_map.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(flat_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(flat_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                }
                MapOp::GetKeyValue(k) => {
                    prop_assert_eq!(flat_map.get_key_value(k), bt_map.get_key_value(k), "get_key_value({})", k);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(flat_map.first_key_value(), bt_map.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(flat_map.last_key_value(), bt_map.last_key_value(), "last_key_value");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(flat_map.pop_first(), bt_map.pop_first(), "pop_first");
                }
                MapOp::PopLast => {
                    prop_assert_eq!(flat_map.pop_last(), bt_map.pop_last(), "pop_last");
                }
            }
            prop_assert_eq!(flat_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(flat_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Tests that iteration order matches BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, v) in &entries {
            flat_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        // Forward iteration
        let flat_items: Vec<_> = flat_map.iter().map(|(&k, &v)| (k, v)).collect();
        let bt_items: Vec<_> = bt_map.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_items, &bt_items, "iter() mismatch");

        // Reverse iteration
        let flat_rev: Vec<_> = flat_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        let bt_rev: Vec<_> = bt_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_rev, &bt_rev, "iter().rev() mismatch");

        // Keys
        let flat_keys: Vec<_> = flat_map.keys().copied().collect();
        let bt_keys: Vec<_> = bt_map.keys().copied().collect();
        prop_assert_eq!(&flat_keys, &bt_keys, "keys() mismatch");

        // Values
        let flat_vals: Vec<_> = flat_map.values().copied().collect();
        let bt_vals: Vec<_> = bt_map.values().copied().collect();
        prop_assert_eq!(&flat_vals, &bt_vals, "values() mismatch");

        // into_iter
        let flat_into: Vec<_> = flat_map.clone().into_iter().collect();
        let bt_into: Vec<_> = bt_map.clone().into_iter().collect();
        prop_assert_eq!(&flat_into, &bt_into, "into_iter() mismatch");

        // into_keys / into_values
        let flat_into_keys: Vec<_> = flat_map.clone().into_keys().collect();
        prop_assert_eq!(&flat_into_keys, &bt_keys, "into_keys() mismatch");
        let flat_into_vals: Vec<_> = flat_map.clone().into_values().collect();
        prop_assert_eq!(&flat_into_vals, &bt_vals, "into_values() mismatch");
    }

    /// Exercises the double-ended iterator from both ends and checks the
    /// exact-size accounting.
    #[test]
    fn iter_size_and_double_ended(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        for (k, v) in &entries {
            flat_map.insert(*k, *v);
        }

        let mut iter = flat_map.iter();
        let mut remaining = flat_map.len();
        let mut from_front = true;
        while remaining > 0 {
            prop_assert_eq!(iter.len(), remaining);
            let next = if from_front { iter.next() } else { iter.next_back() };
            prop_assert!(next.is_some());
            from_front = !from_front;
            remaining -= 1;
        }
        prop_assert_eq!(iter.next(), None);
        prop_assert_eq!(iter.next_back(), None);
    }

    /// Tests that range() yields the same slice of the key space as
    /// BTreeMap::range for random inclusive/exclusive bounds.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        bound_a in key_strategy(),
        bound_b in key_strategy(),
    ) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            flat_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        let lo = bound_a.min(bound_b);
        let hi = bound_a.max(bound_b);

        let flat_range: Vec<_> = flat_map.range(lo..hi).map(|(&k, &v)| (k, v)).collect();
        let bt_range: Vec<_> = bt_map.range(lo..hi).map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_range, &bt_range, "range({}..{}) mismatch", lo, hi);

        let flat_incl: Vec<_> = flat_map.range(lo..=hi).map(|(&k, &v)| (k, v)).collect();
        let bt_incl: Vec<_> = bt_map.range(lo..=hi).map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_incl, &bt_incl, "range({}..={}) mismatch", lo, hi);

        let flat_from: Vec<_> = flat_map.range(lo..).map(|(&k, &v)| (k, v)).collect();
        let bt_from: Vec<_> = bt_map.range(lo..).map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_from, &bt_from, "range({}..) mismatch", lo);

        let flat_to: Vec<_> = flat_map.range(..hi).map(|(&k, &v)| (k, v)).collect();
        let bt_to: Vec<_> = bt_map.range(..hi).map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_to, &bt_to, "range(..{}) mismatch", hi);

        let flat_rev: Vec<_> = flat_map.range(lo..=hi).rev().map(|(&k, &v)| (k, v)).collect();
        let bt_rev: Vec<_> = bt_map.range(lo..=hi).rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&flat_rev, &bt_rev, "range({}..={}).rev() mismatch", lo, hi);
    }

    /// Tests that get_mut changes are observable and match BTreeMap.
    #[test]
    fn get_mut_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        keys_to_mutate in proptest::collection::vec(key_strategy(), 100),
    ) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            flat_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        for k in &keys_to_mutate {
            if let Some(v) = flat_map.get_mut(k) {
                *v = v.wrapping_add(1);
            }
            if let Some(v) = bt_map.get_mut(k) {
                *v = v.wrapping_add(1);
            }
        }
        prop_assert!(flat_map.iter().eq(bt_map.iter()));
    }

    /// Tests that iter_mut and values_mut write through to the map.
    #[test]
    fn iter_mut_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut flat_map: FlatMap<i64, i64> = FlatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();
        for (k, v) in &entries {
            flat_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        for (k, v) in flat_map.iter_mut() {
            *v = v.wrapping_mul(3).wrapping_add(*k);
        }
        for (k, v) in bt_map.iter_mut() {
            *v = v.wrapping_mul(3).wrapping_add(*k);
        }
        prop_assert!(flat_map.iter().eq(bt_map.iter()));

        for v in flat_map.values_mut() {
            *v = v.wrapping_sub(7);
        }
        for v in bt_map.values_mut() {
            *v = v.wrapping_sub(7);
        }
        prop_assert!(flat_map.iter().eq(bt_map.iter()));
    }

    /// Tests that append matches BTreeMap::append, including the overwrite
    /// semantics for duplicate keys.
    #[test]
    fn append_matches_btreemap(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
    ) {
        let mut flat_a: FlatMap<i64, i64> = entries_a.iter().copied().collect();
        let mut flat_b: FlatMap<i64, i64> = entries_b.iter().copied().collect();
        let mut bt_a: BTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let mut bt_b: BTreeMap<i64, i64> = entries_b.iter().copied().collect();

        flat_a.append(&mut flat_b);
        bt_a.append(&mut bt_b);

        prop_assert!(flat_b.is_empty());
        prop_assert!(flat_a.iter().eq(bt_a.iter()));
    }

    /// Tests the Entry API against BTreeMap's.
    #[test]
    fn entry_api_matches_btreemap(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entry_keys in proptest::collection::vec(key_strategy(), TEST_SIZE / 2),
    ) {
        let mut flat_map: FlatMap<i64, i64> = initial.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = initial.iter().copied().collect();

        for k in &entry_keys {
            let flat_val = flat_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(0);
            let bt_val = bt_map.entry(*k).and_modify(|v| *v = v.wrapping_add(1)).or_insert(0);
            prop_assert_eq!(*flat_val, *bt_val, "entry({})", k);
        }
        prop_assert!(flat_map.iter().eq(bt_map.iter()));
    }

    /// Tests OccupiedEntry::remove and VacantEntry::insert round trips.
    #[test]
    fn entry_remove_and_insert(
        initial in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        keys in proptest::collection::vec(key_strategy(), 200),
    ) {
        use flatrb::flat_map::Entry;

        let mut flat_map: FlatMap<i64, i64> = initial.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = initial.iter().copied().collect();

        for k in &keys {
            match flat_map.entry(*k) {
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
            prop_assert_eq!(flat_map.len(), bt_map.len());
        }
        prop_assert!(flat_map.iter().eq(bt_map.iter()));
    }

    /// Tests that FromIterator, Clone, and Eq agree with BTreeMap.
    #[test]
    fn from_iter_clone_eq(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let flat_map: FlatMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        prop_assert_eq!(flat_map.len(), bt_map.len());
        let clone = flat_map.clone();
        prop_assert_eq!(&clone, &flat_map);
        prop_assert!(clone.iter().eq(bt_map.iter()));
    }

    /// Tests lower_bound and upper_bound against BTreeMap range queries.
    #[test]
    fn bounds_match_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        probe in key_strategy(),
    ) {
        let flat_map: FlatMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let bt_lower = bt_map.range(probe..).next().map(|(&k, &v)| (k, v));
        prop_assert_eq!(flat_map.lower_bound(&probe).map(|(&k, &v)| (k, v)), bt_lower, "lower_bound({})", probe);

        let bt_upper = bt_map.range((std::ops::Bound::Excluded(probe), std::ops::Bound::Unbounded))
            .next()
            .map(|(&k, &v)| (k, v));
        prop_assert_eq!(flat_map.upper_bound(&probe).map(|(&k, &v)| (k, v)), bt_upper, "upper_bound({})", probe);
    }
}

// ─── Directed scenarios ──────────────────────────────────────────────────────

mod directed {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Sequential ascending inserts ride the cached-maximum fast path; the
    /// map must still come out fully ordered.
    #[test]
    fn sequential_inserts_stay_ordered() {
        let mut map = FlatMap::new();
        for k in 0..999 {
            assert_eq!(map.insert(k, k * 2), None);
            assert_eq!(map.first_key_value(), Some((&0, &0)));
            assert_eq!(map.last_key_value(), Some((&k, &(k * 2))));
        }
        assert_eq!(map.len(), 999);
        let keys: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (0..999).collect();
        assert_eq!(keys, expected);
    }

    /// Descending inserts ride the cached-minimum fast path.
    #[test]
    fn descending_inserts_stay_ordered() {
        let mut map = FlatMap::new();
        for k in (0..999).rev() {
            map.insert(k, ());
            assert_eq!(map.first_key_value(), Some((&k, &())));
        }
        let keys: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (0..999).collect();
        assert_eq!(keys, expected);
    }

    /// Draining from the minimum end repeatedly exercises the erase path
    /// where the extremum cache must be recomputed.
    #[test]
    fn drain_from_the_minimum() {
        let mut map: FlatMap<i32, i32> = (0..500).map(|k| (k * 7 % 500, k)).collect();
        let mut expected = 0;
        while let Some((k, _)) = map.pop_first() {
            assert_eq!(k, expected);
            expected += 1;
            if let Some((&first, _)) = map.first_key_value() {
                assert_eq!(first, expected);
            }
        }
        assert_eq!(expected, 500);
        assert!(map.is_empty());
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

        let mut map: FlatMap<u64, u64> = FlatMap::new();
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
        let flat: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        let expected: Vec<_> = model.into_iter().collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut map = FlatMap::with_capacity(64);
        for k in 0..50 {
            map.insert(k, k);
        }
        let capacity = map.capacity();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        map.insert(1, 1);
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn index_returns_value() {
        let map = FlatMap::from([("a", 1), ("b", 2)]);
        assert_eq!(map["a"], 1);
        assert_eq!(map["b"], 2);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map: FlatMap<&str, i32> = FlatMap::new();
        let _ = map["missing"];
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end")]
    fn inverted_range_panics() {
        let map = FlatMap::from([(1, "a"), (2, "b")]);
        let _ = map.range(2..1);
    }

    #[test]
    fn empty_range_yields_nothing() {
        let map = FlatMap::from([(1, "a"), (5, "b")]);
        assert_eq!(map.range(2..5).count(), 0);
        assert_eq!(map.range(6..).count(), 0);
        assert_eq!(map.range(..1).count(), 0);
    }

    #[test]
    fn borrowed_key_lookups() {
        let mut map: FlatMap<String, i32> = FlatMap::new();
        map.insert(String::from("alpha"), 1);
        map.insert(String::from("beta"), 2);
        assert_eq!(map.get("alpha"), Some(&1));
        assert!(map.contains_key("beta"));
        assert_eq!(map.remove("alpha"), Some(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn debug_formats_as_map() {
        let map = FlatMap::from([(2, "b"), (1, "a")]);
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }
}
