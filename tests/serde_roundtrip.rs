#![cfg(feature = "serde")]

use primehash::{HashConfig, HashMap, HashSet, Natural};

#[test]
fn map_round_trip_keeps_sizing_and_sentinels() {
    let mut map: HashMap<String, i64> = HashMap::with_no_entry(
        HashConfig::new(40, 0.75),
        Natural::default(),
        Some(String::new()),
        -1,
    )
    .unwrap();
    for i in 0..25 {
        map.put(format!("k{}", i), i * 3);
    }
    map.remove("k4");

    let json = serde_json::to_string(&map).unwrap();
    let back: HashMap<String, i64> = serde_json::from_str(&json).unwrap();

    assert_eq!(back, map);
    assert_eq!(back.capacity(), map.capacity());
    assert_eq!(back.load_factor(), 0.75);
    assert_eq!(back.no_entry_value(), &-1);
    assert_eq!(back.no_entry_key(), Some(&String::new()));
    assert_eq!(back.get("k4"), -1);
}

#[test]
fn set_round_trip() {
    let set: HashSet<u32> = (0..100).collect();
    let json = serde_json::to_string(&set).unwrap();
    let back: HashSet<u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
    assert_eq!(back.capacity(), set.capacity());
}

#[test]
fn invalid_load_factor_fails_to_deserialize() {
    let json = r#"{"capacity":11,"load_factor":2.0,"entries":[1,2]}"#;
    let res: Result<HashSet<u32>, _> = serde_json::from_str(json);
    let err = res.unwrap_err().to_string();
    assert!(err.contains("invalid load factor"), "{}", err);
}
