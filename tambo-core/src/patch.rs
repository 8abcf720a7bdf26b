//! RFC 6902 JSON Patch application.
//!
//! Used to apply incremental prop/state updates to streamed component blocks
//! without resending the whole object. [`apply`] never mutates the caller's
//! value; it returns a patched copy, so a failed batch leaves the target
//! untouched and the caller simply drops the delta.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One RFC 6902 operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert or set a value.
    Add {
        /// Target location.
        path: String,
        /// Value to insert.
        value: Value,
    },
    /// Remove a value.
    Remove {
        /// Target location.
        path: String,
    },
    /// Replace an existing value.
    Replace {
        /// Target location.
        path: String,
        /// Replacement value.
        value: Value,
    },
    /// Move a value from one location to another.
    Move {
        /// Source location.
        from: String,
        /// Target location.
        path: String,
    },
    /// Copy a value from one location to another.
    Copy {
        /// Source location.
        from: String,
        /// Target location.
        path: String,
    },
    /// Assert a value; failure aborts the whole batch.
    Test {
        /// Target location.
        path: String,
        /// Expected value.
        value: Value,
    },
}

/// Why a patch batch could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The pointer is not valid RFC 6901 syntax (or targets the root where
    /// the operation forbids it).
    #[error("invalid JSON pointer: {0}")]
    InvalidPointer(String),
    /// The pointer walks through a location that does not exist.
    #[error("path not found: {0}")]
    PathNotFound(String),
    /// An array segment is not a valid index for the operation.
    #[error("bad array index in: {0}")]
    BadArrayIndex(String),
    /// A `move` would relocate a value into its own child.
    #[error("cannot move into own child: {0}")]
    InvalidMove(String),
    /// A `test` assertion failed; the whole batch is dropped.
    #[error("test failed at: {0}")]
    TestFailed(String),
}

/// Apply a batch of operations, returning the patched value.
///
/// The batch is atomic: any failure (including a failed `test`) returns an
/// error and `target` is left exactly as it was.
pub fn apply(target: &Value, ops: &[PatchOp]) -> Result<Value, PatchError> {
    let mut doc = target.clone();
    for op in ops {
        apply_one(&mut doc, op)?;
    }
    Ok(doc)
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    match op {
        PatchOp::Add { path, value } => add(doc, path, value.clone()),
        PatchOp::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOp::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOp::Move { from, path } => {
            if path == from {
                return Ok(());
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::InvalidMove(path.clone()));
            }
            let moved = remove(doc, from)?;
            add(doc, path, moved)
        }
        PatchOp::Copy { from, path } => {
            let copied = get(doc, from)?.clone();
            add(doc, path, copied)
        }
        PatchOp::Test { path, value } => {
            if get(doc, path)? == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

/// Split a pointer into unescaped reference tokens (RFC 6901).
fn tokens(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PatchError::InvalidPointer(pointer.to_string()));
    }
    Ok(pointer[1..]
        .split('/')
        .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Parse an array index token. Leading zeros and sign characters are
/// rejected per RFC 6901.
fn index(token: &str, pointer: &str) -> Result<usize, PatchError> {
    let valid = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token.len() == 1 || !token.starts_with('0'));
    if !valid {
        return Err(PatchError::BadArrayIndex(pointer.to_string()));
    }
    token
        .parse()
        .map_err(|_| PatchError::BadArrayIndex(pointer.to_string()))
}

fn get<'a>(doc: &'a Value, pointer: &str) -> Result<&'a Value, PatchError> {
    let mut current = doc;
    for token in tokens(pointer)? {
        current = match current {
            Value::Object(map) => map
                .get(&token)
                .ok_or_else(|| PatchError::PathNotFound(pointer.to_string()))?,
            Value::Array(arr) => {
                let i = index(&token, pointer)?;
                arr.get(i)
                    .ok_or_else(|| PatchError::PathNotFound(pointer.to_string()))?
            }
            _ => return Err(PatchError::PathNotFound(pointer.to_string())),
        };
    }
    Ok(current)
}

/// Walk to the parent of the pointer's final token.
fn parent_of<'a>(
    doc: &'a mut Value,
    pointer: &str,
) -> Result<(&'a mut Value, String), PatchError> {
    let mut toks = tokens(pointer)?;
    let last = toks
        .pop()
        .ok_or_else(|| PatchError::InvalidPointer(pointer.to_string()))?;
    let mut current = doc;
    for token in toks {
        current = match current {
            Value::Object(map) => map
                .get_mut(&token)
                .ok_or_else(|| PatchError::PathNotFound(pointer.to_string()))?,
            Value::Array(arr) => {
                let i = index(&token, pointer)?;
                arr.get_mut(i)
                    .ok_or_else(|| PatchError::PathNotFound(pointer.to_string()))?
            }
            _ => return Err(PatchError::PathNotFound(pointer.to_string())),
        };
    }
    Ok((current, last))
}

fn add(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchError> {
    if pointer.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, last) = parent_of(doc, pointer)?;
    match parent {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(arr) => {
            if last == "-" {
                arr.push(value);
                return Ok(());
            }
            let i = index(&last, pointer)?;
            if i > arr.len() {
                return Err(PatchError::BadArrayIndex(pointer.to_string()));
            }
            arr.insert(i, value);
            Ok(())
        }
        _ => Err(PatchError::PathNotFound(pointer.to_string())),
    }
}

fn remove(doc: &mut Value, pointer: &str) -> Result<Value, PatchError> {
    if pointer.is_empty() {
        return Err(PatchError::InvalidPointer("cannot remove the root".into()));
    }
    let (parent, last) = parent_of(doc, pointer)?;
    match parent {
        Value::Object(map) => map
            .remove(&last)
            .ok_or_else(|| PatchError::PathNotFound(pointer.to_string())),
        Value::Array(arr) => {
            let i = index(&last, pointer)?;
            if i >= arr.len() {
                return Err(PatchError::PathNotFound(pointer.to_string()));
            }
            Ok(arr.remove(i))
        }
        _ => Err(PatchError::PathNotFound(pointer.to_string())),
    }
}

fn replace(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchError> {
    if pointer.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, last) = parent_of(doc, pointer)?;
    match parent {
        Value::Object(map) => match map.get_mut(&last) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PatchError::PathNotFound(pointer.to_string())),
        },
        Value::Array(arr) => {
            let i = index(&last, pointer)?;
            match arr.get_mut(i) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(PatchError::PathNotFound(pointer.to_string())),
            }
        }
        _ => Err(PatchError::PathNotFound(pointer.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn op(raw: Value) -> PatchOp {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_replace_nested() {
        let target = json!({"x": {"y": 1}});
        let patched = apply(
            &target,
            &[op(json!({"op": "replace", "path": "/x/y", "value": 5}))],
        )
        .unwrap();
        assert_eq!(patched, json!({"x": {"y": 5}}));
        assert_eq!(target, json!({"x": {"y": 1}}));
    }

    #[test]
    fn test_add_to_object_and_array() {
        let target = json!({"items": [1, 3]});
        let patched = apply(
            &target,
            &[
                op(json!({"op": "add", "path": "/items/1", "value": 2})),
                op(json!({"op": "add", "path": "/items/-", "value": 4})),
                op(json!({"op": "add", "path": "/label", "value": "nums"})),
            ],
        )
        .unwrap();
        assert_eq!(patched, json!({"items": [1, 2, 3, 4], "label": "nums"}));
    }

    #[test]
    fn test_remove() {
        let target = json!({"a": 1, "b": [10, 20]});
        let patched = apply(
            &target,
            &[
                op(json!({"op": "remove", "path": "/a"})),
                op(json!({"op": "remove", "path": "/b/0"})),
            ],
        )
        .unwrap();
        assert_eq!(patched, json!({"b": [20]}));
    }

    #[test]
    fn test_move_and_copy() {
        let target = json!({"src": {"v": 7}, "dst": {}});
        let patched = apply(
            &target,
            &[
                op(json!({"op": "copy", "from": "/src/v", "path": "/dst/copied"})),
                op(json!({"op": "move", "from": "/src/v", "path": "/dst/moved"})),
            ],
        )
        .unwrap();
        assert_eq!(patched, json!({"src": {}, "dst": {"copied": 7, "moved": 7}}));
    }

    #[test]
    fn test_move_into_own_child_rejected() {
        let target = json!({"a": {"b": 1}});
        let err = apply(
            &target,
            &[op(json!({"op": "move", "from": "/a", "path": "/a/c"}))],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::InvalidMove(_)));
    }

    #[test]
    fn test_failed_test_aborts_batch_without_corruption() {
        let target = json!({"x": 1, "y": 1});
        let err = apply(
            &target,
            &[
                op(json!({"op": "replace", "path": "/x", "value": 2})),
                op(json!({"op": "test", "path": "/x", "value": 99})),
                op(json!({"op": "replace", "path": "/y", "value": 2})),
            ],
        )
        .unwrap_err();
        assert_eq!(err, PatchError::TestFailed("/x".to_string()));
        // The caller's value never saw the partial application.
        assert_eq!(target, json!({"x": 1, "y": 1}));
    }

    #[test]
    fn test_passing_test_continues() {
        let target = json!({"x": 1});
        let patched = apply(
            &target,
            &[
                op(json!({"op": "test", "path": "/x", "value": 1})),
                op(json!({"op": "replace", "path": "/x", "value": 2})),
            ],
        )
        .unwrap();
        assert_eq!(patched, json!({"x": 2}));
    }

    #[rstest]
    #[case("/a~1b", json!({"a/b": 1}), json!(1))]
    #[case("/m~0n", json!({"m~n": 2}), json!(2))]
    fn test_pointer_unescaping(#[case] pointer: &str, #[case] doc: Value, #[case] expected: Value) {
        assert_eq!(get(&doc, pointer).unwrap(), &expected);
    }

    #[rstest]
    #[case("x/y")]
    #[case("x")]
    fn test_pointer_must_start_with_slash(#[case] pointer: &str) {
        let target = json!({"x": {"y": 1}});
        let err = apply(
            &target,
            &[PatchOp::Remove {
                path: pointer.to_string(),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPointer(_)));
    }

    #[rstest]
    #[case("/items/01")]
    #[case("/items/+1")]
    #[case("/items/two")]
    fn test_bad_array_indices(#[case] pointer: &str) {
        let target = json!({"items": [1, 2, 3]});
        let err = apply(
            &target,
            &[PatchOp::Remove {
                path: pointer.to_string(),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::BadArrayIndex(_)));
    }

    #[test]
    fn test_replace_missing_path() {
        let target = json!({"x": 1});
        let err = apply(
            &target,
            &[op(json!({"op": "replace", "path": "/nope", "value": 2}))],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::PathNotFound(_)));
    }

    #[test]
    fn test_root_replacement() {
        let target = json!({"old": true});
        let patched = apply(
            &target,
            &[op(json!({"op": "replace", "path": "", "value": {"new": true}}))],
        )
        .unwrap();
        assert_eq!(patched, json!({"new": true}));
    }

    #[test]
    fn test_op_serde_shape() {
        let raw = json!({"op": "add", "path": "/x", "value": 1});
        let parsed: PatchOp = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }
}
