use std::collections::{BTreeMap, HashMap};

use son_core::{Document, Mapping, SonError, UpdateSource, Value};

fn abc() -> Document {
    Document::from_pairs([("a", 1), ("b", 2), ("c", 3)])
}

fn keys(doc: &Document) -> Vec<&str> {
    doc.keys().collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn new_document_is_empty() {
    let doc = Document::new();
    assert!(doc.is_empty());
    assert_eq!(doc.len(), 0);
    assert_eq!(doc.keys().count(), 0);
}

#[test]
fn from_pairs_keeps_first_position_of_duplicates() {
    let doc = Document::from_pairs([("x", 1), ("y", 2), ("x", 3)]);
    assert_eq!(keys(&doc), ["x", "y"]);
    assert_eq!(doc["x"], Value::Int(3));
}

#[test]
fn from_map_uses_mapping_key_order() {
    let mut map = BTreeMap::new();
    map.insert("b".to_string(), Value::Int(2));
    map.insert("a".to_string(), Value::Int(1));
    let doc = Document::from_map(&map).unwrap();
    assert_eq!(keys(&doc), ["a", "b"]);
}

#[test]
fn collect_from_iterator() {
    let doc: Document = vec![("k1", "v1"), ("k2", "v2")].into_iter().collect();
    assert_eq!(keys(&doc), ["k1", "k2"]);
    assert_eq!(doc.get("k2"), Some(&Value::String("v2".into())));
}

// ============================================================================
// get / set / delete
// ============================================================================

#[test]
fn get_missing_with_default() {
    let doc = abc();
    let fallback = Value::String("none".into());
    assert_eq!(doc.get("zzz"), None);
    assert_eq!(doc.get_or("zzz", &fallback), &fallback);
    assert_eq!(doc.get_or("a", &fallback), &Value::Int(1));
}

#[test]
fn set_existing_key_keeps_position() {
    let mut doc = abc();
    let previous = doc.set("a", 100);
    assert_eq!(previous, Some(Value::Int(1)));
    assert_eq!(keys(&doc), ["a", "b", "c"]);
    assert_eq!(doc["a"], Value::Int(100));
}

#[test]
fn set_new_key_appends() {
    let mut doc = abc();
    assert_eq!(doc.set("d", 4), None);
    assert_eq!(keys(&doc), ["a", "b", "c", "d"]);
}

#[test]
fn delete_then_reinsert_moves_to_end() {
    let mut doc = abc();
    doc.delete("a").unwrap();
    assert_eq!(keys(&doc), ["b", "c"]);
    doc.set("a", 1);
    assert_eq!(keys(&doc), ["b", "c", "a"]);
}

#[test]
fn delete_missing_key_fails() {
    let mut doc = abc();
    let err = doc.delete("nope").unwrap_err();
    assert!(matches!(err, SonError::KeyNotFound(ref k) if k == "nope"));
    assert_eq!(doc.len(), 3);
}

#[test]
fn get_mut_edits_in_place() {
    let mut doc = abc();
    if let Some(Value::Int(n)) = doc.get_mut("b") {
        *n += 40;
    }
    assert_eq!(doc["b"], Value::Int(42));
    assert!(doc.get_mut("missing").is_none());
}

#[test]
fn contains_and_len() {
    let doc = abc();
    assert!(doc.contains("b"));
    assert!(!doc.contains("B"));
    assert_eq!(doc.len(), 3);
}

#[test]
fn set_default_inserts_only_when_absent() {
    let mut doc = abc();
    assert_eq!(*doc.set_default("a", 9), Value::Int(1));
    assert_eq!(*doc.set_default("z", 9), Value::Int(9));
    assert_eq!(keys(&doc), ["a", "b", "c", "z"]);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn values_and_items_align_with_keys() {
    let mut doc = abc();
    doc.set("b", "two");
    let values: Vec<&Value> = doc.values().collect();
    assert_eq!(
        values,
        [&Value::Int(1), &Value::String("two".into()), &Value::Int(3)]
    );
    let items: Vec<(&str, &Value)> = doc.items().collect();
    assert_eq!(items[1], ("b", &Value::String("two".into())));
}

#[test]
fn owned_iteration_yields_pairs_in_order() {
    let pairs: Vec<(String, Value)> = abc().into_iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
            ("c".to_string(), Value::Int(3)),
        ]
    );
}

#[test]
fn borrowed_iteration() {
    let doc = abc();
    let mut seen = Vec::new();
    for (key, _) in &doc {
        seen.push(key);
    }
    assert_eq!(seen, ["a", "b", "c"]);
}

#[test]
fn borrowed_iterator_is_sized_and_reversible() {
    let doc = abc();
    let iter = (&doc).into_iter();
    assert_eq!(iter.len(), 3);
    let reversed: Vec<&str> = iter.rev().map(|(key, _)| key).collect();
    assert_eq!(reversed, ["c", "b", "a"]);

    let mut iter = doc.iter();
    assert_eq!(iter.next_back(), Some(("c", &Value::Int(3))));
    assert_eq!(iter.next(), Some(("a", &Value::Int(1))));
    assert_eq!(iter.len(), 1);
}

#[test]
fn draining_after_churn_yields_stored_values() {
    let mut doc = abc();
    doc.delete("b").unwrap();
    doc.set("b", "again");
    doc.set("a", 10);
    doc.pop("c").unwrap();

    let mut drained = doc.clone();
    assert_eq!(drained.pop_item().unwrap(), ("a".to_string(), Value::Int(10)));
    assert_eq!(
        drained.pop_item().unwrap(),
        ("b".to_string(), Value::String("again".into()))
    );

    let owned: Vec<(String, Value)> = doc.into_iter().collect();
    assert_eq!(
        owned,
        vec![
            ("a".to_string(), Value::Int(10)),
            ("b".to_string(), Value::String("again".into())),
        ]
    );
}

// ============================================================================
// update
// ============================================================================

#[test]
fn update_from_document_preserves_source_order() {
    let mut doc = Document::from_pairs([("b", 0)]);
    let source = Document::from_pairs([("c", 3), ("a", 1), ("b", 2)]);
    doc.update(UpdateSource::Document(&source)).unwrap();
    assert_eq!(keys(&doc), ["b", "c", "a"]);
    assert_eq!(doc["b"], Value::Int(2));
}

#[test]
fn update_from_mapping() {
    let mut map = HashMap::new();
    map.insert("x".to_string(), Value::Bool(true));
    let mut doc = abc();
    doc.update(UpdateSource::Mapping(&map)).unwrap();
    assert_eq!(keys(&doc), ["a", "b", "c", "x"]);
}

#[test]
fn update_from_pairs() {
    let mut doc = abc();
    doc.update(UpdateSource::Pairs(vec![
        ("c".to_string(), Value::Null),
        ("d".to_string(), Value::Int(4)),
    ]))
    .unwrap();
    assert_eq!(keys(&doc), ["a", "b", "c", "d"]);
    assert_eq!(doc["c"], Value::Null);
}

#[test]
fn update_from_value_pairs_array() {
    let pairs = Value::Array(vec![
        Value::Array(vec![Value::String("z".into()), Value::Int(26)]),
        Value::Array(vec![Value::String("y".into()), Value::Int(25)]),
    ]);
    let mut doc = Document::new();
    doc.update(UpdateSource::Value(&pairs)).unwrap();
    assert_eq!(keys(&doc), ["z", "y"]);
}

#[test]
fn update_from_unsupported_value_fails_without_changes() {
    let mut doc = abc();
    let err = doc.update(UpdateSource::Value(&Value::Int(5))).unwrap_err();
    assert!(matches!(err, SonError::ArgumentError(_)));

    // One good pair followed by a malformed one: nothing is applied.
    let mixed = Value::Array(vec![
        Value::Array(vec![Value::String("ok".into()), Value::Int(1)]),
        Value::Array(vec![Value::Int(1), Value::Int(2)]),
    ]);
    let err = doc.update(UpdateSource::Value(&mixed)).unwrap_err();
    assert!(matches!(err, SonError::ArgumentError(_)));
    assert_eq!(doc, abc());
}

#[test]
fn update_with_overrides_applied_last() {
    let mut doc = Document::new();
    let source = Document::from_pairs([("a", 1), ("b", 2)]);
    doc.update_with(Some(UpdateSource::Document(&source)), [("a", 10), ("c", 3)])
        .unwrap();
    assert_eq!(keys(&doc), ["a", "b", "c"]);
    assert_eq!(doc["a"], Value::Int(10));
}

struct BrokenMapping;

impl Mapping for BrokenMapping {
    fn mapping_keys(&self) -> Vec<String> {
        vec!["ghost".to_string()]
    }

    fn lookup(&self, _key: &str) -> Option<&Value> {
        None
    }
}

#[test]
fn mapping_with_dangling_key_is_rejected() {
    let mut doc = Document::new();
    let err = doc.update(UpdateSource::Mapping(&BrokenMapping)).unwrap_err();
    assert!(matches!(err, SonError::ArgumentError(_)));
    assert!(doc.is_empty());
}

// ============================================================================
// copy / clear / pop / pop_item
// ============================================================================

#[test]
fn copy_is_equal_and_independent() {
    let original = abc();
    let mut copy = original.copy();
    assert_eq!(copy, original);
    copy.set("a", 0);
    assert_eq!(original["a"], Value::Int(1));
}

#[test]
fn clear_leaves_usable_empty_document() {
    let mut doc = abc();
    doc.clear();
    assert!(doc.is_empty());
    doc.set("n", 1);
    assert_eq!(keys(&doc), ["n"]);
}

#[test]
fn pop_present_key() {
    let mut doc = abc();
    assert_eq!(doc.pop("b").unwrap(), Value::Int(2));
    assert_eq!(keys(&doc), ["a", "c"]);
}

#[test]
fn pop_missing_key_without_default_fails() {
    let mut doc = abc();
    assert!(matches!(doc.pop("q"), Err(SonError::KeyNotFound(_))));
}

#[test]
fn pop_missing_key_with_default() {
    let mut doc = abc();
    assert_eq!(doc.pop_or("q", Value::Int(-1)), Value::Int(-1));
    assert_eq!(
        doc.pop_with("q", &[Value::Bool(false)]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(doc.len(), 3);
}

#[test]
fn pop_with_two_defaults_is_an_argument_error() {
    let mut doc = abc();
    let err = doc
        .pop_with("a", &[Value::Null, Value::Null])
        .unwrap_err();
    assert!(matches!(err, SonError::ArgumentError(_)));
    assert!(doc.contains("a"));
}

#[test]
fn pop_item_takes_earliest_surviving_pair() {
    let mut doc = abc();
    doc.delete("a").unwrap();
    assert_eq!(doc.pop_item().unwrap(), ("b".to_string(), Value::Int(2)));
    assert_eq!(keys(&doc), ["c"]);
}

#[test]
fn pop_item_on_empty_fails() {
    let mut doc = Document::new();
    assert!(matches!(doc.pop_item(), Err(SonError::EmptyContainer)));
}

// ============================================================================
// Equality and representation
// ============================================================================

#[test]
fn document_equality_is_order_sensitive() {
    let ab = Document::from_pairs([("a", 1), ("b", 2)]);
    let ba = Document::from_pairs([("b", 2), ("a", 1)]);
    assert_ne!(ab, ba);
    assert_eq!(ab, Document::from_pairs([("a", 1), ("b", 2)]));
}

#[test]
fn equality_with_hash_map_ignores_order() {
    let ba = Document::from_pairs([("b", 2), ("a", 1)]);
    let mut map = HashMap::new();
    map.insert("a".to_string(), Value::Int(1));
    map.insert("b".to_string(), Value::Int(2));
    assert!(ba == map);
    assert!(map == ba);
    map.insert("c".to_string(), Value::Int(3));
    assert!(ba != map);
}

#[test]
fn debug_representation_lists_pairs() {
    let doc = Document::from_pairs([("name", Value::from("x")), ("n", Value::Int(1))]);
    assert_eq!(
        format!("{doc:?}"),
        r#"Document([("name", String("x")), ("n", Int(1))])"#
    );
}

#[test]
fn nested_display() {
    let inner = Document::from_pairs([("k", true)]);
    let doc = Document::from_pairs([
        ("d", Value::Document(inner)),
        ("xs", Value::Array(vec![Value::Int(1), Value::Null])),
    ]);
    assert_eq!(
        doc.to_string(),
        r#"Document([("d", Document([("k", true)])), ("xs", [1, null])])"#
    );
}
