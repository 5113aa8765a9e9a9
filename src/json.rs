//! Thin facade over `serde_json`, giving the rest of the crate the handful
//! of operations described by the JSON facade contract: typed get/set,
//! delete, clear, deep copy, structural equality, and canonical dumps.
//!
//! [`JsonObject`] is a plain `serde_json::Map`, built *without* the
//! `preserve_order` feature. That makes it a `BTreeMap` under the hood, so
//! every iteration and every serialization already visits keys in
//! byte-lexicographic order — "sort keys" falls out of the data structure
//! rather than needing a flag threaded through every call site.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

/// A JSON object whose keys are always visited in byte-lexicographic order.
pub type JsonObject = serde_json::Map<String, Value>;

/// An empty object, as returned by a freshly constructed [`crate::Token`].
pub fn new_object() -> JsonObject {
    JsonObject::new()
}

/// Insert `name => value`, failing with [`Error::Exists`] if `name` is
/// already present with a value for which `same_kind` returns `true`.
///
/// The duplicate probe is deliberately type-specific rather than a blanket
/// "is this name present at all" check: the caller passes a same-kind
/// predicate for the scalar type it's inserting (e.g. `Value::is_i64` for
/// `add_grant_int`), so an existing value of a *different* kind at the same
/// name is not treated as a collision and is simply overwritten.
pub fn set_checked(
    object: &mut JsonObject,
    name: &str,
    value: Value,
    same_kind: impl Fn(&Value) -> bool,
) -> Result<(), Error> {
    if let Some(existing) = object.get(name) {
        if same_kind(existing) {
            return Err(Error::Exists(name.to_owned()));
        }
    }
    object.insert(name.to_owned(), value);
    Ok(())
}

/// Merge `blob` (a JSON object) into `target`, rejecting duplicate keys
/// already present in `target` and rejecting a `blob` whose root is not an
/// object.
pub fn merge_json(target: &mut JsonObject, blob: &str) -> Result<(), Error> {
    let parsed: Value = serde_json::from_str(blob)?;
    let Value::Object(incoming) = parsed else {
        return Err(Error::Invalid("JSON blob root must be an object".into()));
    };
    for (key, value) in incoming {
        if target.contains_key(&key) {
            return Err(Error::Exists(key));
        }
        target.insert(key, value);
    }
    Ok(())
}

/// Serialize `value` (or the subtree named by `name` within `object`) with
/// sorted keys and no insignificant whitespace.
pub fn dump_compact(object: &JsonObject, name: Option<&str>) -> Result<String, Error> {
    match name {
        None => Ok(serde_json::to_string(object)?),
        Some(name) => {
            let subtree = object
                .get(name)
                .ok_or_else(|| Error::NotPresent(name.to_owned()))?;
            Ok(serde_json::to_string(subtree)?)
        }
    }
}

/// Serialize `value` with sorted keys, 4-space indentation, and a leading
/// newline before the first brace, matching the human-readable `dump`
/// output other JWT inspection tools print.
pub fn dump_pretty(value: &Value) -> Result<String, Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    let mut rendered = String::from_utf8(buf).expect("serde_json only emits valid UTF-8");
    rendered.insert(0, '\n');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_dump_sorts_keys() {
        let mut object = new_object();
        object.insert("zebra".into(), json!(1));
        object.insert("apple".into(), json!(2));
        assert_eq!(
            dump_compact(&object, None).unwrap(),
            r#"{"apple":2,"zebra":1}"#
        );
    }

    #[test]
    fn set_checked_rejects_same_kind_duplicate() {
        let mut object = new_object();
        object.insert("role".into(), json!(1));
        let err = set_checked(&mut object, "role", json!(2), Value::is_i64).unwrap_err();
        assert!(matches!(err, Error::Exists(_)));
    }

    #[test]
    fn set_checked_ignores_different_kind_at_same_name() {
        let mut object = new_object();
        object.insert("role".into(), json!("admin"));
        // A string is already present, but we're probing for an existing
        // integer, so this does not trip `Exists` -- it overwrites.
        set_checked(&mut object, "role", json!(7), Value::is_i64).unwrap();
        assert_eq!(object["role"], json!(7));
    }

    #[test]
    fn merge_json_rejects_a_colliding_key_and_leaves_target_unmutated() {
        let mut object = new_object();
        object.insert("sub".into(), json!("alice"));
        let err = merge_json(&mut object, r#"{"sub":"bob"}"#).unwrap_err();
        assert!(matches!(err, Error::Exists(ref name) if name == "sub"));
        assert_eq!(object.len(), 1);
        assert_eq!(object["sub"], json!("alice"));
    }

    #[test]
    fn merge_json_merges_earlier_keys_before_failing_on_a_later_collision() {
        // `JsonObject` iterates in byte-lexicographic key order (see the
        // module doc comment), so a blob merges alphabetically: "aud" lands
        // before the "sub" collision is even reached. `merge_json` does not
        // buffer the whole blob and apply it atomically -- a caller who
        // needs all-or-nothing semantics across multiple names should merge
        // into a scratch object first and only adopt it on success.
        let mut object = new_object();
        object.insert("sub".into(), json!("alice"));
        let err = merge_json(&mut object, r#"{"sub":"bob","aud":"svc"}"#).unwrap_err();
        assert!(matches!(err, Error::Exists(ref name) if name == "sub"));
        assert_eq!(object["aud"], json!("svc"));
        assert_eq!(object["sub"], json!("alice"));
    }

    #[test]
    fn merge_json_rejects_non_object_root() {
        let mut object = new_object();
        assert!(merge_json(&mut object, "[1,2,3]").is_err());
    }
}
