use keypath::{delete, extend, get, is_child, set, KeyPath, Segment, TreeMap, TreeValue};
use proptest::prelude::*;
use proptest::sample::Index;

fn leaf() -> impl Strategy<Value = TreeValue> {
    prop_oneof![
        Just(TreeValue::null()),
        any::<bool>().prop_map(TreeValue::from),
        any::<i64>().prop_map(TreeValue::from),
        "[a-z]{0,6}".prop_map(TreeValue::from),
    ]
}

fn tree() -> impl Strategy<Value = TreeValue> {
    leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(TreeValue::from_list),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..5).prop_map(|entries| {
                TreeValue::from_map(entries.into_iter().collect::<TreeMap>())
            }),
        ]
    })
}

/// Every addressable node, keyed by the structured path that reaches it.
fn all_paths(root: &TreeValue) -> Vec<KeyPath> {
    fn walk(node: &TreeValue, prefix: &mut Vec<Segment>, out: &mut Vec<KeyPath>) {
        out.push(KeyPath::new(prefix.clone()));
        match node {
            TreeValue::Map(map) => {
                for (key, child) in map.iter() {
                    prefix.push(Segment::key(key.as_str()));
                    walk(child, prefix, out);
                    prefix.pop();
                }
            }
            TreeValue::List(list) => {
                for (index, child) in list.iter().enumerate() {
                    prefix.push(Segment::Index(index));
                    walk(child, prefix, out);
                    prefix.pop();
                }
            }
            TreeValue::Scalar(_) => {}
        }
    }
    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

fn unrelated(a: &KeyPath, b: &KeyPath) -> bool {
    a != b && !is_child(a.segments(), b.segments()) && !is_child(b.segments(), a.segments())
}

proptest! {
    #[test]
    fn set_then_get_roundtrips(root in tree(), pick in any::<Index>(), value in tree()) {
        let paths = all_paths(&root);
        let path = &paths[pick.index(paths.len())];
        let next = set(&root, path, value.clone()).unwrap();
        prop_assert_eq!(get(&next, path).unwrap(), Some(&value));
    }

    #[test]
    fn set_shares_unrelated_subtrees(root in tree(), pick in any::<Index>(), value in leaf()) {
        let paths = all_paths(&root);
        let path = &paths[pick.index(paths.len())];
        let next = set(&root, path, value).unwrap();
        for other in paths.iter().filter(|other| unrelated(path, other)) {
            let before = get(&root, other).unwrap().unwrap();
            let after = get(&next, other).unwrap().unwrap();
            prop_assert!(TreeValue::ptr_eq(before, after), "{} not shared after set at {}", other, path);
        }
    }

    #[test]
    fn edits_never_mutate_the_input(root in tree(), pick in any::<Index>(), value in tree()) {
        let snapshot = serde_json::Value::from(&root);
        let paths = all_paths(&root);
        let path = &paths[pick.index(paths.len())];

        let _ = set(&root, path, value.clone());
        let _ = delete(&root, path);
        let _ = extend(&root, path, value);
        prop_assert_eq!(serde_json::Value::from(&root), snapshot);
    }

    #[test]
    fn delete_of_map_key_reads_back_absent(root in tree(), pick in any::<Index>()) {
        let paths = all_paths(&root);
        let path = &paths[pick.index(paths.len())];
        prop_assume!(matches!(path.last(), Some(Segment::Key(_))));
        let next = delete(&root, path).unwrap();
        prop_assert_eq!(get(&next, path).unwrap(), None);
    }

    #[test]
    fn predicate_picks_first_match(ids in prop::collection::vec(0u8..4, 1..12), target in 0u8..4) {
        let rows: Vec<TreeValue> = ids
            .iter()
            .enumerate()
            .map(|(pos, id)| {
                let mut row = TreeMap::new();
                row.insert("id".to_string(), TreeValue::from(i64::from(*id)));
                row.insert("pos".to_string(), TreeValue::from(pos as i64));
                TreeValue::from_map(row)
            })
            .collect();
        let root = TreeValue::from_list(rows);
        let path = format!("id={target}.pos");
        let expected = ids.iter().position(|id| *id == target).map(|pos| TreeValue::from(pos as i64));
        for _ in 0..2 {
            prop_assert_eq!(get(&root, path.as_str()).unwrap().cloned(), expected.clone());
        }
    }

    #[test]
    fn extend_with_disjoint_keys_equals_sets(base in prop::collection::vec(("[a-m]{1,3}", leaf()), 0..5),
                                            patch in prop::collection::vec(("[n-z]{1,3}", leaf()), 0..5)) {
        let root = TreeValue::from_map(base.into_iter().collect::<TreeMap>());
        let patch: TreeMap = patch.into_iter().collect();

        let extended = extend(&root, "", TreeValue::from_map(patch.clone())).unwrap();
        let mut sequential = root.clone();
        for (key, value) in patch.iter() {
            sequential = set(&sequential, &[Segment::key(key.as_str())], value.clone()).unwrap();
        }
        prop_assert_eq!(extended, sequential);
    }
}
