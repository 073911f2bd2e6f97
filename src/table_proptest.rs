#![cfg(test)]

// Property tests kept inside the crate so they can check table bookkeeping
// that the public API does not expose.

use crate::config::HashConfig;
use crate::hash_map::HashMap;
use crate::primes;
use crate::raw_table::{RawTable, Slot};
use crate::strategy::{FnStrategy, HashingStrategy, Natural};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    PutIfAbsent(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Adjust(usize, i32),
    RetainEven,
    CursorRemove(usize),
    Compact,
    Reserve(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), -1_000_000i32..1_000_000).prop_map(|(i, v)| Op::Put(i, v)),
            2 => (idx.clone(), -1_000_000i32..1_000_000).prop_map(|(i, v)| Op::PutIfAbsent(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => "[a-z]{0,4}".prop_map(Op::Contains),
            1 => (idx.clone(), -100i32..100).prop_map(|(i, d)| Op::Adjust(i, d)),
            1 => Just(Op::RetainEven),
            1 => (0usize..8).prop_map(Op::CursorRemove),
            1 => Just(Op::Compact),
            1 => (0usize..40).prop_map(Op::Reserve),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_bookkeeping<K, H>(t: &RawTable<K, H>) -> Result<(), TestCaseError> {
    let full = t.slots().iter().filter(|s| matches!(s, Slot::Full(_))).count();
    let removed = t.slots().iter().filter(|s| matches!(s, Slot::Removed)).count();
    prop_assert_eq!(full, t.len());
    prop_assert_eq!(removed, t.removed());
    prop_assert_eq!(t.len() + t.removed() + t.free(), t.capacity());
    prop_assert!(t.free() >= 1, "at least one EMPTY slot must remain");
    prop_assert!(t.max_size() >= t.len());
    prop_assert!(t.max_size() < t.capacity());
    prop_assert!(primes::is_prime(t.capacity() as u64));
    Ok(())
}

fn run_scenario<H>(
    mut sut: HashMap<String, i32, H>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: HashingStrategy<String> + HashingStrategy<str>,
{
    let mut model: BTreeMap<String, i32> = BTreeMap::new();
    let none = *sut.no_entry_value();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                let mprev = model.insert(k, v);
                prop_assert_eq!(prev, mprev.unwrap_or(none));
            }
            Op::PutIfAbsent(i, v) => {
                let k = pool[i].clone();
                let got = sut.put_if_absent(k.clone(), v);
                match model.get(&k) {
                    Some(&present) => prop_assert_eq!(got, present),
                    None => {
                        prop_assert_eq!(got, none);
                        model.insert(k, v);
                    }
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove_entry(k.as_str());
                let want = model.remove(k);
                prop_assert_eq!(got.map(|(_, v)| v), want);
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get_ref(k.as_str()), model.get(k));
                prop_assert_eq!(sut.get(k.as_str()), model.get(k).copied().unwrap_or(none));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            Op::Adjust(i, d) => {
                let k = &pool[i];
                let adjusted = sut.adjust_value(k.as_str(), d);
                prop_assert_eq!(adjusted, model.contains_key(k));
                if let Some(v) = model.get_mut(k) {
                    *v += d;
                }
            }
            Op::RetainEven => {
                sut.retain(|_, v| *v % 2 == 0);
                model.retain(|_, v| *v % 2 == 0);
            }
            Op::CursorRemove(n) => {
                let mut cur = sut.cursor();
                let mut seen = 0;
                while cur.next().is_some() {
                    if seen == n {
                        let (k, v) = cur.remove().expect("current entry");
                        prop_assert_eq!(model.remove(&k), Some(v));
                        break;
                    }
                    seen += 1;
                }
            }
            Op::Compact => {
                let before = sut.capacity();
                sut.compact();
                prop_assert_eq!(sut.table().removed(), 0);
                prop_assert!(sut.capacity() <= before, "compact grew {} -> {}", before, sut.capacity());
            }
            Op::Reserve(n) => {
                sut.ensure_capacity(n);
                prop_assert!(sut.max_size() - sut.len() >= n);
            }
            Op::Iterate => {
                let s: BTreeSet<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<(String, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check_bookkeeping(sut.table())?;
    }
    Ok(())
}

// Property: state-machine equivalence against an ordered std map.
// - `put`/`remove` return the previous value or the sentinel, like the model.
// - `put_if_absent` never overwrites.
// - the cursor removes exactly the entry it stands on.
// - after every op: len parity, slot-state counts match the counters,
//   an EMPTY slot remains, capacity is prime, budget covers the size.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: HashMap<String, i32> = HashMap::with_no_entry(
            HashConfig::default(),
            Natural::default(),
            None,
            i32::MIN,
        ).unwrap();
        run_scenario(sut, pool, ops)?;
    }

    #[test]
    fn prop_state_machine_full_load((pool, ops) in arb_scenario()) {
        let sut: HashMap<String, i32> =
            HashMap::with_capacity_and_load_factor(3, 1.0).unwrap();
        run_scenario(sut, pool, ops)?;
    }

    // Load factors where `capacity * lf` lands on whole numbers for small
    // primes, plus arbitrary ones.
    #[test]
    fn prop_state_machine_any_load(
        load in prop_oneof![
            Just(0.2f32),
            Just(1.0f32 / 3.0),
            Just(0.25f32),
            Just(0.75f32),
            0.05f32..=1.0f32,
        ],
        cap in 0usize..30,
        (pool, ops) in arb_scenario(),
    ) {
        let sut: HashMap<String, i32> =
            HashMap::with_capacity_and_load_factor(cap, load).unwrap();
        run_scenario(sut, pool, ops)?;
    }
}

// Collision variant: every key hashes alike, so every probe walks the full
// chain and tombstone reuse is on the hot path.
#[derive(Clone, Default)]
struct Colliding;

impl HashingStrategy<String> for Colliding {
    fn hash(&self, _: &String) -> u64 {
        17
    }
    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }
}

impl HashingStrategy<str> for Colliding {
    fn hash(&self, _: &str) -> u64 {
        17
    }
    fn equals(&self, a: &str, b: &str) -> bool {
        a == b
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_colliding((pool, ops) in arb_scenario()) {
        let sut: HashMap<String, i32, Colliding> = HashMap::with_strategy(Colliding);
        run_scenario(sut, pool, ops)?;
    }

    // Tombstone reuse: remove a key and insert another that collides with
    // it; without growth in between, the new key lands in the vacated slot.
    #[test]
    fn prop_tombstone_reuse(keys in proptest::collection::btree_set(0u32..1000, 2..5), fresh in 1000u32..2000) {
        let strategy = FnStrategy::new(|_: &u32| 3, |a: &u32, b: &u32| a == b);
        let mut sut: HashMap<u32, u32, _> =
            HashMap::with_config(HashConfig::new(23, 0.5), strategy).unwrap();
        let keys: Vec<u32> = keys.into_iter().collect();
        for &k in &keys {
            sut.put(k, k);
        }
        let victim = keys[keys.len() / 2];
        let cap = sut.capacity();
        let slot = sut.table().find(&victim).unwrap();
        sut.remove(&victim);
        sut.put(fresh, fresh);
        prop_assert_eq!(sut.capacity(), cap);
        prop_assert_eq!(sut.table().find(&fresh), Some(slot));
    }
}
