#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// inspect chain lengths alongside the public surface.

use crate::chained_hash_table::ChainedHashTable;
use crate::config::TableConfig;
use crate::key_hasher::KeyHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (1usize..=6, proptest::collection::vec("[a-z]{0,5}", 1..=10)).prop_flat_map(
        |(buckets, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
                idx.clone().prop_map(Op::Remove),
                idx.clone().prop_map(Op::Get),
                prop_oneof![
                    contains_pool.prop_map(|s: String| s),
                    "[a-z]{0,5}".prop_map(|s| s)
                ]
                .prop_map(Op::Contains),
                (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
                Just(Op::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (buckets, pool.clone(), ops))
        },
    )
}

fn check_against_model<H>(
    mut sut: ChainedHashTable<String, i32, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<String> + KeyHasher<str>,
{
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k.as_str()), model.remove(k));
                prop_assert!(!sut.contains_key(k.as_str()));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k.as_str()) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.wrapping_add(d);
                }
            }
            Op::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.chain_lengths().sum::<usize>(), model.len());
        prop_assert!(sut.load_factor() <= sut.max_load_factor());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the replaced value exactly when the key was present.
// - `remove`/`get`/`contains_key` agree with the model; removal is final.
// - `get_mut` updates are observed by later reads.
// - Chains hold exactly `len` entries and the load factor never stays
//   above its maximum after an operation returns.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        let sut = ChainedHashTable::with_buckets(buckets);
        check_against_model(sut, &pool, ops)?;
    }
}

// Collision variant: every key shares one chain, so equality alone has to
// tell entries apart, including across growth.
#[derive(Clone, Copy, Debug, Default)]
struct ConstHasher;
impl<Q: ?Sized> KeyHasher<Q> for ConstHasher {
    fn hash_key(&self, _key: &Q) -> u32 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_collisions((buckets, pool, ops) in arb_scenario()) {
        let config = TableConfig::new().initial_buckets(buckets);
        let sut = ChainedHashTable::with_config_and_hasher(&config, ConstHasher);
        check_against_model(sut, &pool, ops)?;
    }
}

// Property: after `n` distinct insertions into `b` buckets the bucket count
// is the smallest `b * 2^k` with `n / (b * 2^k) <= 1`, and every entry
// keeps its value.
proptest! {
    #[test]
    fn prop_growth_schedule(b in 1usize..=8, n in 0usize..200) {
        let mut t: ChainedHashTable<String, usize> = ChainedHashTable::with_buckets(b);
        for i in 0..n {
            t.put(format!("k{i}"), i);
        }
        let mut expected = b;
        while n > expected {
            expected *= 2;
        }
        prop_assert_eq!(t.bucket_count(), expected);
        for i in 0..n {
            let key = format!("k{i}");
            prop_assert_eq!(t.get(key.as_str()), Some(&i));
        }
    }
}
