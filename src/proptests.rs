use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_trie<V>(t: &TrieCore<V>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");
}

fn model_prefix<'a>(
    m: &'a BTreeMap<Vec<u8>, u64>,
    prefix: &'a [u8],
) -> impl Iterator<Item = &'a Vec<u8>> + 'a {
    m.range(prefix.to_vec()..)
        .take_while(move |(k, _)| k.starts_with(prefix))
        .map(|(k, _)| k)
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    Prefix(Vec<u8>, usize),
    Batch(Vec<(Vec<u8>, u64)>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A tiny alphabet forces heavy prefix sharing and repeated keys.
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', 0x00, 0xFF]), 0..=8)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Get),
        15 => (key.clone(), 0usize..6).prop_map(|(k, n)| Op::Prefix(k, n)),
        5 => prop::collection::vec((key.clone(), any::<u64>()), 0..=16).prop_map(Op::Batch),
    ];
    prop::collection::vec(op, 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: TrieCore<u64> = TrieCore::with_config(Config {
            dense_threshold: 4,
            ..Config::default()
        });
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(&key, value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key).copied(), m.get(key.as_slice()).copied());
                }
                Op::Prefix(prefix, max) => {
                    let expected: Vec<Vec<u8>> = model_prefix(&m, &prefix).cloned().collect();
                    let got = t.enumerate(&prefix, max);
                    prop_assert!(got.len() <= max);
                    prop_assert_eq!(&got[..], &expected[..expected.len().min(max)]);
                    prop_assert_eq!(t.count_prefix(&prefix), expected.len());
                    if !prefix.is_empty() {
                        prop_assert_eq!(t.prefix_search(&prefix), !expected.is_empty());
                    }
                }
                Op::Batch(entries) => {
                    let new_keys = {
                        let mut seen = std::collections::BTreeSet::new();
                        entries
                            .iter()
                            .filter(|(k, _)| !m.contains_key(k) && seen.insert(k.clone()))
                            .count()
                    };
                    let added = t
                        .insert_all(entries.iter().map(|(k, v)| (k.as_slice(), *v)))
                        .unwrap();
                    prop_assert_eq!(added, new_keys);
                    m.extend(entries);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_delete_everything_leaves_root(keys in prop::collection::vec(key_strategy(), 0..=64)) {
        let mut t: TrieCore<u64> = TrieCore::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i as u64).unwrap();
        }
        for k in &keys {
            t.remove(k);
            validate_trie(&t);
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn prop_prefix_consistency(
        keys in prop::collection::vec(key_strategy(), 1..=32),
        prefix in key_strategy(),
    ) {
        let mut t: TrieCore<u64> = TrieCore::new();
        for k in &keys {
            t.insert(k, 0).unwrap();
        }
        let found = t.prefix_search(&prefix);
        prop_assert_eq!(found, t.count_prefix(&prefix) > 0);
        prop_assert_eq!(found, !t.enumerate(&prefix, usize::MAX).is_empty());
        for key in t.enumerate(&prefix, usize::MAX) {
            prop_assert!(key.starts_with(&prefix));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_set() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"b".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_set();
    let mut shape: Option<usize> = None;

    for_each_permutation(&keys, |perm| {
        let mut t: TrieCore<u64> = TrieCore::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(&k, v).unwrap(), m.insert(k, v));
        }

        validate_trie(&t);
        // The structure does not depend on insertion order.
        let nodes = *shape.get_or_insert(t.node_count());
        assert_eq!(t.node_count(), nodes);
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_trie: TrieCore<u64> = TrieCore::new();
    let mut base_map: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_trie.insert(k, v).unwrap(), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_trie.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(k.as_slice()));
            assert_eq!(t.len(), m.len());
            validate_trie(&t);
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.node_count(), 1);
    });
}
