//! Structured Containers - Tuples and Indexed Splits

use indexmap::IndexMap;

use crate::error::FuncError;
use crate::value::{kind_of, Value};

/// Immutable, position-indexed sequence built from a call's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    items: Vec<Value>,
}

impl Tuple {
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bounds-checked positional access.
    pub fn get(&self, index: i64) -> Result<&Value, FuncError> {
        position(index.into(), self.items.len()).map(|i| &self.items[i])
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Value::Seq(t.items)
    }
}

/// Capture the argument list, in order.
pub fn tuple(items: &[Value]) -> Tuple {
    Tuple::new(items.iter().cloned())
}

fn position(index: i128, len: usize) -> Result<usize, FuncError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(FuncError::OutOfRange { index, len })
}

/// Look up `key` in a sequence (by position) or a mapping (by string key).
///
/// A missing mapping key yields nil. Non-null references are followed.
pub fn index(container: &Value, key: &Value) -> Result<Value, FuncError> {
    match container {
        Value::Seq(items) => {
            let i = match key {
                Value::Int(n) => i128::from(*n),
                Value::Uint(n) => i128::from(*n),
                other => {
                    return Err(FuncError::InvalidArgument(format!(
                        "cannot index slice with {}",
                        kind_of(other)
                    )))
                }
            };
            position(i, items.len()).map(|i| items[i].clone())
        }
        Value::Map(entries) => match key {
            Value::String(k) => Ok(entries.get(k).cloned().unwrap_or(Value::Nil)),
            other => Err(FuncError::InvalidArgument(format!(
                "cannot index map with {}",
                kind_of(other)
            ))),
        },
        Value::Ref(r) => match r.target() {
            Some(target) => index(target, key),
            None => Err(FuncError::InvalidArgument("cannot index null reference".into())),
        },
        other => Err(FuncError::InvalidArgument(format!(
            "cannot index into {}",
            kind_of(other)
        ))),
    }
}

/// Segments of a split, keyed `_0`, `_1`, ... in segment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMap {
    segments: IndexMap<String, String>,
}

impl SplitMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.segments.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<SplitMap> for Value {
    fn from(m: SplitMap) -> Self {
        Value::Map(
            m.segments
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }
}

pub fn ordinal_key(n: usize) -> String {
    format!("_{}", n)
}

/// Split `subject` on every literal occurrence of `separator`.
///
/// Empty segments are kept. An empty separator does not split: the whole
/// subject becomes `_0`.
pub fn split(separator: &str, subject: &str) -> SplitMap {
    let segments: Vec<&str> = if separator.is_empty() {
        vec![subject]
    } else {
        subject.split(separator).collect()
    };

    SplitMap {
        segments: segments
            .into_iter()
            .enumerate()
            .map(|(n, seg)| (ordinal_key(n), seg.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Reference;
    use pretty_assertions::assert_eq;

    fn keys(m: &SplitMap) -> Vec<&str> {
        m.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_split_basic() {
        let m = split("/", "foo/bar/baz");
        assert_eq!(m.len(), 3);
        assert_eq!(m.get("_0"), Some("foo"));
        assert_eq!(m.get("_1"), Some("bar"));
        assert_eq!(m.get("_2"), Some("baz"));
        assert_eq!(m.get("_3"), None);
    }

    #[test]
    fn test_split_keeps_empty_segments() {
        let m = split(",", ",a,,b,");
        let segs: Vec<&str> = m.iter().map(|(_, v)| v).collect();
        assert_eq!(segs, vec!["", "a", "", "b", ""]);
        assert_eq!(keys(&m), vec!["_0", "_1", "_2", "_3", "_4"]);
    }

    #[test]
    fn test_split_multichar_separator_non_overlapping() {
        let m = split("aa", "aaa");
        assert_eq!(m.get("_0"), Some(""));
        assert_eq!(m.get("_1"), Some("a"));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_split_empty_separator_does_not_split() {
        let m = split("", "abc");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("_0"), Some("abc"));
    }

    #[test]
    fn test_split_without_separator_match() {
        let m = split("/", "");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("_0"), Some(""));
    }

    #[test]
    fn test_split_into_value_preserves_order() {
        let v = Value::from(split(".", "a.b.c.d.e.f.g.h.i.j.k"));
        assert_eq!(v.to_string(), "map[_0:a _1:b _2:c _3:d _4:e _5:f _6:g _7:h _8:i _9:j _10:k]");
    }

    #[test]
    fn test_tuple_get() {
        let t = tuple(&[Value::Int(1), Value::from("a"), Value::from("foo")]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(2), Ok(&Value::from("foo")));
        assert_eq!(t.get(3), Err(FuncError::OutOfRange { index: 3, len: 3 }));
        assert_eq!(t.get(-1), Err(FuncError::OutOfRange { index: -1, len: 3 }));
    }

    #[test]
    fn test_index_sequence() {
        let seq = Value::from(tuple(&[Value::Int(1), Value::Int(2), Value::Int(3)]));
        assert_eq!(index(&seq, &Value::Int(0)), Ok(Value::Int(1)));
        assert_eq!(index(&seq, &Value::Uint(2)), Ok(Value::Int(3)));
        assert_eq!(
            index(&seq, &Value::Int(5)),
            Err(FuncError::OutOfRange { index: 5, len: 3 })
        );
        assert!(matches!(
            index(&seq, &Value::from("0")),
            Err(FuncError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_index_reports_caller_value() {
        let seq = Value::Seq(vec![Value::Nil]);
        assert_eq!(
            index(&seq, &Value::Uint(u64::MAX)),
            Err(FuncError::OutOfRange { index: i128::from(u64::MAX), len: 1 })
        );
        assert_eq!(
            index(&seq, &Value::Int(i64::MIN)),
            Err(FuncError::OutOfRange { index: i128::from(i64::MIN), len: 1 })
        );
    }

    #[test]
    fn test_index_map_and_reference() {
        let m = Value::from(split("/", "x/y"));
        assert_eq!(index(&m, &Value::from("_1")), Ok(Value::from("y")));
        assert_eq!(index(&m, &Value::from("_9")), Ok(Value::Nil));

        let r = Value::Ref(Reference::to(Value::Seq(vec![Value::Bool(true)])));
        assert_eq!(index(&r, &Value::Int(0)), Ok(Value::Bool(true)));
        assert!(index(&Value::Int(4), &Value::Int(0)).is_err());
    }
}
