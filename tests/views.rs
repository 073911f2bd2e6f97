use primehash::{Error, HashMap, HashSet};
use std::collections::BTreeSet;

fn numbered(n: i32) -> HashMap<String, i32> {
    let mut map = HashMap::new();
    for i in 1..=n {
        map.put(i.to_string(), i);
    }
    map
}

#[test]
fn key_set_reflects_map() {
    let mut map = numbered(20);
    let keys = map.key_set();
    assert_eq!(keys.len(), 20);
    for i in 1..=20 {
        assert!(keys.contains(i.to_string().as_str()));
    }
    let collected: BTreeSet<String> = keys.iter().cloned().collect();
    assert_eq!(collected.len(), 20);

    let expected: HashSet<String> = (1..=20).map(|i| i.to_string()).collect();
    assert!(keys == expected);
}

#[test]
fn key_set_to_array_sizes() {
    let mut map = numbered(20);
    let keys = map.key_set();

    let exact = keys.to_array_in(vec![None; 20]);
    assert_eq!(exact.len(), 20);
    assert!(exact.iter().all(Option::is_some));

    let grown = keys.to_array_in(Vec::new());
    assert_eq!(grown.len(), 20);

    let marker = Some("marker".to_string());
    let longer = keys.to_array_in(vec![marker.clone(); 25]);
    assert_eq!(longer.len(), 25);
    assert!(longer[..20].iter().all(|k| k.is_some() && *k != marker));
    assert_eq!(longer[20], None);
    assert!(longer[21..].iter().all(|k| *k == marker));
}

#[test]
fn key_set_retain_all_and_remove_all() {
    let mut map = numbered(20);
    {
        let mut keys = map.key_set();
        let wanted: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        assert!(keys.retain_all(&wanted));
        assert!(!keys.retain_all(&wanted));
        assert_eq!(keys.len(), 10);

        // Only part of the list is present.
        let some_absent = ["3".to_string(), "4".to_string(), "15".to_string()];
        assert!(keys.remove_all(&some_absent));
        assert_eq!(keys.len(), 8);
        assert!(!keys.remove_all(&some_absent));
    }
    assert!(!map.contains_key("3"));
    assert!(!map.contains_key("11"));
    assert_eq!(map.get("5"), 5);
}

#[test]
fn value_collection_bulk_operations() {
    let mut map = numbered(20);
    let mut values = map.value_collection();
    assert!(values.contains_all(&[1, 2, 20]));
    assert!(!values.contains_all(&[1, 21]));

    assert!(values.retain_all(&[2, 4, 6, 8]));
    assert_eq!(values.len(), 4);
    assert!(values.remove_all(&vec![2, 8, 99]));
    assert_eq!(values.len(), 2);

    let mut kept = values.to_vec();
    kept.sort_unstable();
    assert_eq!(kept, vec![4, 6]);
    drop(values);
    assert_eq!(map.get("4"), 4);
    assert!(!map.contains_key("2"));
}

#[test]
fn value_collection_hash_code_matches_equal_contents() {
    let mut a = numbered(10);
    let mut b: HashMap<String, i32> = HashMap::with_capacity(50).unwrap();
    for i in (1..=10).rev() {
        b.put(format!("k{}", i), i);
    }
    let va = a.value_collection();
    let vb = b.value_collection();
    assert_eq!(va.hash_code(), vb.hash_code());
    assert!(va == vb);
}

#[test]
fn value_collection_sentinel_array() {
    let mut map = numbered(3);
    let values = map.value_collection();
    let out = values.to_sentinel_array_in(vec![42; 6]);
    assert_eq!(out.len(), 6);
    let mut prefix = out[..3].to_vec();
    prefix.sort_unstable();
    assert_eq!(prefix, vec![1, 2, 3]);
    assert_eq!(out[3], 0);
    assert_eq!(&out[4..], &[42, 42]);
}

#[test]
fn duplicate_values_removed_one_at_a_time() {
    let mut map: HashMap<u8, u8> = HashMap::new();
    map.put(1, 7);
    map.put(2, 7);
    map.put(3, 8);
    let mut values = map.value_collection();
    assert!(values.remove(&7));
    assert_eq!(values.len(), 2);
    assert!(values.contains(&7));
    assert!(values.remove(&7));
    assert!(!values.remove(&7));
    assert_eq!(values.len(), 1);
}

#[test]
fn entry_set_write_through_and_membership() {
    let mut map = numbered(20);
    {
        let mut entries = map.entry_set();
        assert!(entries.contains(&("5".to_string(), 5)));
        assert!(!entries.contains(&("5".to_string(), 6)));

        for mut e in entries.iter_mut() {
            let doubled = *e.value() * 2;
            e.set_value(doubled);
        }
        assert!(entries.contains(&("5".to_string(), 10)));

        assert!(!entries.remove(&("6".to_string(), 6)));
        assert!(entries.remove(&("6".to_string(), 12)));
        assert_eq!(entries.len(), 19);
    }
    assert_eq!(map.get("5"), 10);
    assert!(!map.contains_key("6"));
}

#[test]
fn entry_set_bulk_operations() {
    let mut map = numbered(6);
    let mut entries = map.entry_set();
    let keep = vec![
        ("1".to_string(), 1),
        ("2".to_string(), 2),
        ("3".to_string(), 99),
    ];
    assert!(entries.retain_all(&keep));
    assert_eq!(entries.len(), 2);
    assert!(entries.contains_all(&keep[..2]));
    assert!(entries.remove_all(&keep[..1]));
    assert_eq!(entries.to_vec(), vec![("2".to_string(), 2)]);
}

#[test]
fn additions_through_views_fail() {
    let mut map = numbered(5);
    assert_eq!(
        map.key_set().add("6".into()),
        Err(Error::UnsupportedMutation("KeySet::add"))
    );
    assert_eq!(
        map.value_collection().add(6),
        Err(Error::UnsupportedMutation("ValueCollection::add"))
    );
    assert_eq!(
        map.entry_set().add(("6".into(), 6)),
        Err(Error::UnsupportedMutation("EntrySet::add"))
    );
    assert_eq!(map.len(), 5);
}

#[test]
fn clearing_a_view_clears_the_map() {
    let mut map = numbered(5);
    map.key_set().clear();
    assert!(map.is_empty());

    let mut map = numbered(5);
    map.value_collection().clear();
    assert!(map.is_empty());

    let mut map = numbered(5);
    map.entry_set().clear();
    assert!(map.is_empty());
}

#[test]
fn entry_set_hash_matches_map() {
    let mut map = numbered(8);
    let expected = map.hash_code();
    assert_eq!(map.entry_set().hash_code(), expected);
}
