//! ChainedHashTable: separate-chaining map with synchronous doubling growth.
//!
//! Every bucket is a [`BucketList`] of entries. A key lives in the bucket
//! `digest % bucket_count`, where the digest is computed once when the
//! entry is created and cached next to it. New keys are prepended to their
//! chain. When an insertion pushes `len / bucket_count` past the configured
//! maximum, the bucket array doubles before `put` returns and every entry
//! is relinked using its cached digest; the hasher is never consulted
//! during growth.
//!
//! Values release whatever they own through `Drop`: overwriting a key hands
//! the previous value back to the caller, and removal or table drop drops
//! it in place. Values that themselves hold tables tear those down exactly
//! once, at that point.

use crate::bucket_list::BucketList;
use crate::config::TableConfig;
use crate::key_hasher::{Djb2, KeyHasher};
use core::borrow::Borrow;
use core::mem;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u32,
}

#[derive(Debug)]
pub struct ChainedHashTable<K, V, H = Djb2> {
    buckets: Vec<BucketList<Entry<K, V>>>,
    len: usize,
    max_load_factor: f64,
    hasher: H,
}

fn empty_buckets<T>(count: usize) -> Vec<BucketList<T>> {
    core::iter::repeat_with(BucketList::new)
        .take(count)
        .collect()
}

impl<K, V> ChainedHashTable<K, V> {
    pub fn new() -> Self {
        Self::with_config(&TableConfig::default())
    }

    pub fn with_buckets(count: usize) -> Self {
        Self::with_config(&TableConfig::new().initial_buckets(count))
    }

    pub fn with_config(config: &TableConfig) -> Self {
        Self::with_config_and_hasher(config, Djb2)
    }
}

impl<K, V> Default for ChainedHashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> ChainedHashTable<K, V, H> {
    pub fn with_config_and_hasher(config: &TableConfig, hasher: H) -> Self {
        Self {
            buckets: empty_buckets(config.initial_buckets.max(1)),
            len: 0,
            max_load_factor: config.max_load_factor,
            hasher,
        }
    }

    /// Number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Chain length of every bucket, in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(BucketList::len)
    }

    /// Entries in bucket order, each chain head first.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(BucketList::iter)
            .map(|e| (&e.key, &e.value))
    }

    /// Mutable access to every value; order is unspecified.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.buckets
            .iter_mut()
            .flat_map(BucketList::items_mut)
            .map(|e| (&e.key, &mut e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Drops every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    #[inline]
    fn bucket_index(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    fn exceeds_load_factor(&self) -> bool {
        self.load_factor() > self.max_load_factor
    }

    /// Doubles the bucket array and relinks every entry by its cached digest.
    ///
    /// Old chains are drained head first and each entry is prepended to its
    /// new chain, as a fresh `put` would do. Entries move; nothing is dropped.
    fn grow(&mut self) {
        let old_count = self.buckets.len();
        let new_count = old_count * 2;
        let mut buckets = empty_buckets(new_count);
        for bucket in mem::take(&mut self.buckets) {
            for entry in bucket {
                let idx = entry.hash as usize % new_count;
                buckets[idx].push_front(entry);
            }
        }
        self.buckets = buckets;
        log::trace!(
            "Grew chained hash table from {old_count} to {new_count} buckets ({} entries)",
            self.len
        );
    }
}

impl<K, V, H> ChainedHashTable<K, V, H>
where
    K: Eq,
{
    fn locate<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: KeyHasher<Q>,
    {
        self.bucket_index(self.hasher.hash_key(key))
    }

    /// Whether `key` is stored. O(1 + chain length).
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        self.get(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let idx = self.locate(key);
        self.buckets[idx]
            .find(|e| e.key.borrow() == key)
            .map(|e| &e.value)
    }

    /// Mutable access to a stored value, for in-place updates.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let idx = self.locate(key);
        self.buckets[idx]
            .find_mut(|e| e.key.borrow() == key)
            .map(|e| &mut e.value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let idx = self.locate(key);
        self.buckets[idx]
            .find(|e| e.key.borrow() == key)
            .map(|e| (&e.key, &e.value))
    }

    /// Stores `value` under `key`.
    ///
    /// A new key is prepended to its chain and may trigger growth before
    /// this returns. An existing key keeps its stored key, has its value
    /// replaced, and the previous value is returned; `len` is unchanged.
    pub fn put(&mut self, key: K, value: V) -> Option<V>
    where
        H: KeyHasher<K>,
    {
        let hash = self.hasher.hash_key(&key);
        let idx = self.bucket_index(hash);
        let bucket = &mut self.buckets[idx];

        if let Some(entry) = bucket.find_mut(|e| e.key == key) {
            return Some(mem::replace(&mut entry.value, value));
        }

        bucket.push_front(Entry { key, value, hash });
        self.len += 1;

        while self.exceeds_load_factor() {
            self.grow();
        }
        None
    }

    /// Removes `key`, returning its value. `None` leaves the table untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let idx = self.locate(key);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.position(|e| e.key.borrow() == key)?;
        let entry = bucket.remove_at(pos)?;
        self.len -= 1;
        Some((entry.key, entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    /// Sends every key to the same chain.
    #[derive(Clone, Copy, Debug, Default)]
    struct ConstHasher;
    impl<Q: ?Sized> KeyHasher<Q> for ConstHasher {
        fn hash_key(&self, _key: &Q) -> u32 {
            0
        }
    }

    fn collide<K, V>() -> ChainedHashTable<K, V, ConstHasher> {
        ChainedHashTable::with_config_and_hasher(&TableConfig::new().initial_buckets(4), ConstHasher)
    }

    /// Counts drops of values stored in a table.
    struct Tracked(Rc<Cell<usize>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Scenario: 2 buckets, three string keys. The second put sits exactly
    /// at the threshold, the third doubles the table; all values survive.
    #[test]
    fn grows_only_past_threshold() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::with_buckets(2);
        t.put("a".into(), 1);
        t.put("b".into(), 2);
        assert_eq!(t.bucket_count(), 2);
        assert_eq!(t.load_factor(), 1.0);

        t.put("c".into(), 3);
        assert_eq!(t.bucket_count(), 4);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("b"), Some(&2));
        assert_eq!(t.get("c"), Some(&3));
    }

    /// Invariant: chain selection is `djb2(key) % bucket_count`.
    #[test]
    fn keys_land_in_djb2_bucket() {
        let mut t: ChainedHashTable<String, ()> = ChainedHashTable::with_buckets(4);
        // djb2: a=177670, b=177671, c=177672
        t.put("a".into(), ());
        t.put("b".into(), ());
        t.put("c".into(), ());
        assert_eq!(t.chain_lengths().collect::<Vec<_>>(), vec![1, 0, 1, 1]);
    }

    #[test]
    fn remove_missing_on_empty_is_none() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        assert_eq!(t.remove("missing"), None);
        assert_eq!(t.len(), 0);
    }

    /// Invariant: removal drops exactly one entry and the key disappears.
    #[test]
    fn remove_present_key() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        t.put("x".into(), 1);
        t.put("y".into(), 2);
        assert_eq!(t.remove("x"), Some(1));
        assert!(!t.contains_key("x"));
        assert!(t.contains_key("y"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.remove("x"), None);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: overwriting keeps `len` and hands back the old value.
    #[test]
    fn overwrite_replaces_value_in_place() {
        let mut t: ChainedHashTable<String, String> = ChainedHashTable::new();
        assert_eq!(t.put("k".into(), "v1".into()), None);
        assert_eq!(t.put("k".into(), "a longer value".into()), Some("v1".to_string()));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("k").map(String::as_str), Some("a longer value"));
    }

    #[test]
    fn get_mut_updates_are_visible() {
        let mut t: ChainedHashTable<String, u32> = ChainedHashTable::new();
        t.put("book".into(), 0);
        if let Some(purchases) = t.get_mut("book") {
            *purchases += 3;
        }
        assert_eq!(t.get("book"), Some(&3));
        assert!(t.get_mut("nope").is_none());
    }

    /// Invariant: colliding keys share one chain, newest first, and are
    /// told apart by equality alone.
    #[test]
    fn collisions_resolve_by_equality() {
        let mut t = collide::<&'static str, i32>();
        t.put("first", 1);
        t.put("second", 2);
        t.put("third", 3);
        assert_eq!(t.chain_lengths().next(), Some(3));
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec!["third", "second", "first"]);
        assert_eq!(t.get(&"second"), Some(&2));

        assert_eq!(t.remove(&"second"), Some(2));
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec!["third", "first"]);
    }

    /// Invariant: growth reverses chain order, since each drained entry is
    /// prepended to its new chain.
    #[test]
    fn growth_relinks_by_prepending() {
        let mut t = collide::<i32, ()>();
        for k in 0..4 {
            t.put(k, ());
        }
        assert_eq!(t.bucket_count(), 4);
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);

        t.put(4, ());
        assert_eq!(t.bucket_count(), 8);
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn bucket_count_follows_doubling_schedule() {
        let mut t: ChainedHashTable<String, usize> = ChainedHashTable::with_buckets(3);
        for n in 1..=100usize {
            t.put(format!("key-{n}"), n);
            let mut expected = 3;
            while n as f64 / expected as f64 > 1.0 {
                expected *= 2;
            }
            assert_eq!(t.bucket_count(), expected, "after {n} insertions");
        }
        for n in 1..=100usize {
            assert_eq!(t.get(format!("key-{n}").as_str()), Some(&n));
        }
    }

    /// A small load factor may need more than one doubling per insertion.
    #[test]
    fn fractional_load_factor_keeps_invariant() {
        let config = TableConfig::new().initial_buckets(1).max_load_factor(0.25);
        let mut t: ChainedHashTable<String, ()> = ChainedHashTable::with_config(&config);
        t.put("only".into(), ());
        assert_eq!(t.bucket_count(), 4);
        assert!(t.load_factor() <= 0.25);
    }

    /// Invariant: overwritten and removed values are dropped exactly once;
    /// growth moves values without dropping them.
    #[test]
    fn values_drop_once_on_overwrite_remove_and_growth() {
        let drops = Rc::new(Cell::new(0));
        let mut t: ChainedHashTable<String, Tracked> = ChainedHashTable::with_buckets(1);

        for k in ["a", "b", "c", "d", "e"] {
            t.put(k.into(), Tracked(drops.clone()));
        }
        assert_eq!(t.bucket_count(), 8);
        assert_eq!(drops.get(), 0, "growth must not drop values");

        drop(t.put("a".into(), Tracked(drops.clone())));
        assert_eq!(drops.get(), 1);

        assert!(t.remove("b").is_some());
        assert_eq!(drops.get(), 2);

        drop(t);
        assert_eq!(drops.get(), 6);
    }

    /// Scenario: a value owning its own table. Removing the outer entry
    /// tears the inner table down once, with all of its entries.
    #[test]
    fn nested_table_is_released_with_its_owner() {
        let drops = Rc::new(Cell::new(0));
        let mut outer: ChainedHashTable<String, ChainedHashTable<String, Tracked>> =
            ChainedHashTable::new();

        outer.put("X".into(), ChainedHashTable::new());
        outer
            .get_mut("X")
            .expect("just inserted")
            .put("k1".into(), Tracked(drops.clone()));
        assert!(outer.get("X").is_some_and(|defs| defs.contains_key("k1")));

        let inner = outer.remove("X").expect("present");
        assert_eq!(drops.get(), 0);
        drop(inner);
        assert_eq!(drops.get(), 1);
        assert!(outer.is_empty());
    }

    #[test]
    fn iteration_yields_each_entry_once() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::with_buckets(2);
        let keys = ["k1", "k2", "k3", "k4", "k5"];
        for (i, k) in keys.iter().enumerate() {
            t.put((*k).to_string(), i as i32);
        }
        let seen: BTreeSet<String> = t.keys().cloned().collect();
        let expected: BTreeSet<String> = keys.iter().map(|s| (*s).to_string()).collect();
        assert_eq!(seen, expected);

        for (_k, v) in t.iter_mut() {
            *v += 10;
        }
        let sum: i32 = t.values().sum();
        assert_eq!(sum, (0..5).map(|i| i + 10).sum());
    }

    #[test]
    fn clear_keeps_bucket_count() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::with_buckets(1);
        t.put("a".into(), 1);
        t.put("b".into(), 2);
        let buckets = t.bucket_count();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), buckets);
        assert!(!t.contains_key("a"));
    }

    #[test]
    fn get_key_value_returns_stored_key() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        t.put("stored".into(), 7);
        let (k, v) = t.get_key_value("stored").expect("present");
        assert_eq!(k, "stored");
        assert_eq!(*v, 7);
    }
}
