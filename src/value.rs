//! Value Introspection - Kinds, Type Labels, Emptiness
//!
//! Every value handed over by the host engine is one variant of the closed
//! [`Value`] enum. Classification into a [`Kind`] is a total function; new
//! shapes are added here as variants, never as ad hoc checks at call sites.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Coarse runtime shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Slice,
    Map,
    Struct,
    Ptr,
    Func,
    /// Host handles that cannot be looked into (channels and the like).
    Opaque,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Ptr => "ptr",
            Kind::Func => "func",
            Kind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically shaped datum passed between the host engine and functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    Map(IndexMap<String, Value>),
    Record(Record),
    /// Host timestamp. Classified as a structured record.
    Time(DateTime<Utc>),
    Ref(Reference),
    /// Named callable handle.
    Func(String),
    /// Uninspectable host handle, carrying only its type label.
    Opaque(String),
}

/// Named structured record with ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Reference to a value, or a null reference that still knows its target type.
///
/// The element type is fixed at construction so a null reference keeps a
/// meaningful type label (`*T`).
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    elem_type: String,
    target: Option<Box<Value>>,
}

impl Reference {
    pub fn to(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            elem_type: type_of(&value),
            target: Some(Box::new(value)),
        }
    }

    pub fn null(elem_type: impl Into<String>) -> Self {
        Self {
            elem_type: elem_type.into(),
            target: None,
        }
    }

    pub fn elem_type(&self) -> &str {
        &self.elem_type
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }
}

/// Classify a value. Total over every variant.
pub fn kind_of(v: &Value) -> Kind {
    match v {
        Value::Nil => Kind::Nil,
        Value::Bool(_) => Kind::Bool,
        Value::Int(_) => Kind::Int,
        Value::Uint(_) => Kind::Uint,
        Value::Float(_) => Kind::Float,
        Value::String(_) => Kind::String,
        Value::Seq(_) => Kind::Slice,
        Value::Map(_) => Kind::Map,
        Value::Record(_) | Value::Time(_) => Kind::Struct,
        Value::Ref(_) => Kind::Ptr,
        Value::Func(_) => Kind::Func,
        Value::Opaque(_) => Kind::Opaque,
    }
}

pub fn kind_is(expected: &str, v: &Value) -> bool {
    kind_of(v).as_str() == expected
}

/// Display label for the value's concrete type.
///
/// References are never dereferenced: a reference to `T` is labelled `*T`.
/// Values without a richer label use their kind name.
pub fn type_of(v: &Value) -> String {
    match v {
        Value::Record(r) => r.type_name.clone(),
        Value::Time(_) => "DateTime".to_string(),
        Value::Ref(r) => format!("*{}", r.elem_type),
        Value::Opaque(label) => label.clone(),
        other => kind_of(other).as_str().to_string(),
    }
}

/// Strict label comparison; `*Foo` never matches `Foo`.
pub fn type_is(expected: &str, v: &Value) -> bool {
    type_of(v) == expected
}

/// Accepts either the bare type or a reference to it.
pub fn type_is_like(expected: &str, v: &Value) -> bool {
    let actual = type_of(v);
    actual == expected || actual.strip_prefix('*') == Some(expected)
}

/// Shape-dependent emptiness.
///
/// Structured records are never empty, whatever their fields hold. Kinds
/// that cannot be inspected answer "not empty".
pub fn is_empty(v: &Value) -> bool {
    match v {
        Value::Nil => true,
        Value::Ref(r) => r.is_null(),
        Value::Bool(b) => !*b,
        Value::Int(n) => *n == 0,
        Value::Uint(n) => *n == 0,
        Value::Float(x) => *x == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Seq(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        Value::Record(_) | Value::Time(_) => false,
        Value::Func(_) | Value::Opaque(_) => false,
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        kind_of(self)
    }

    pub fn type_label(&self) -> String {
        type_of(self)
    }

    pub fn is_empty(&self) -> bool {
        is_empty(self)
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Rendering used when a value lands in template output.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Uint(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                f.write_str("]")
            }
            Value::Record(r) => {
                f.write_str("{")?;
                write_joined(f, r.fields.values())?;
                f.write_str("}")
            }
            Value::Time(t) => write!(f, "{}", t),
            Value::Ref(r) => match r.target() {
                Some(v) => write!(f, "&{}", v),
                None => f.write_str("<nil>"),
            },
            Value::Func(name) => f.write_str(name),
            Value::Opaque(label) => write!(f, "<{}>", label),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Uint(n) => serializer.serialize_u64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Seq(items) => items.serialize(serializer),
            Value::Map(entries) => entries.serialize(serializer),
            Value::Record(r) => r.fields.serialize(serializer),
            Value::Time(t) => t.serialize(serializer),
            Value::Ref(r) => match r.target() {
                Some(v) => v.serialize(serializer),
                None => serializer.serialize_unit(),
            },
            Value::Func(name) => serializer.serialize_str(name),
            Value::Opaque(label) => serializer.serialize_str(label),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    n.as_f64().map_or(Value::Nil, Value::Float)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Uint(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zero_values() -> Vec<Value> {
        vec![
            Value::Nil,
            Value::Bool(false),
            Value::Int(0),
            Value::Uint(0),
            Value::Float(0.0),
            Value::Float(-0.0),
            Value::String(String::new()),
            Value::Seq(vec![]),
            Value::Map(IndexMap::new()),
            Value::Ref(Reference::null("Person")),
        ]
    }

    #[test]
    fn test_zero_values_are_empty() {
        for v in zero_values() {
            assert!(is_empty(&v), "{:?} should be empty", v);
        }
    }

    #[test]
    fn test_non_zero_values_are_not_empty() {
        let values = vec![
            Value::Bool(true),
            Value::Int(-1),
            Value::Uint(7),
            Value::Float(0.5),
            Value::Float(f64::NAN),
            Value::from(" "),
            Value::Seq(vec![Value::Nil]),
            Value::Ref(Reference::to(0)),
        ];
        for v in values {
            assert!(!is_empty(&v), "{:?} should not be empty", v);
        }
    }

    #[test]
    fn test_records_never_empty() {
        assert!(!is_empty(&Value::Record(Record::new("Empty"))));
        let zeroed = Record::new("Point").with_field("x", 0).with_field("y", 0);
        assert!(!is_empty(&Value::Record(zeroed)));
        assert!(!is_empty(&Value::Time(DateTime::<Utc>::UNIX_EPOCH)));
    }

    #[test]
    fn test_uninspectable_kinds_not_empty() {
        assert!(!is_empty(&Value::Func("upper".into())));
        assert!(!is_empty(&Value::Opaque("chan int".into())));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(kind_of(&Value::Nil), Kind::Nil);
        assert_eq!(kind_of(&Value::from(vec![Value::Int(1)])), Kind::Slice);
        assert_eq!(kind_of(&Value::Time(DateTime::<Utc>::UNIX_EPOCH)), Kind::Struct);
        assert!(kind_is("string", &Value::from("x")));
        assert!(kind_is("ptr", &Value::Ref(Reference::to("x"))));
        assert!(!kind_is("int", &Value::Uint(1)));
        assert_eq!(serde_json::to_value(Kind::Opaque).unwrap(), json!("opaque"));
    }

    #[test]
    fn test_reference_labels_do_not_dereference() {
        let person = Record::new("Person").with_field("name", "Ada");
        let r = Value::Ref(Reference::to(person.clone()));
        assert_eq!(type_of(&r), "*Person");
        assert!(!type_is("Person", &r));
        assert!(type_is("*Person", &r));
        assert!(type_is_like("Person", &r));
        assert!(type_is_like("Person", &Value::Record(person)));
        assert!(!type_is_like("*Person", &Value::Record(Record::new("Person"))));
    }

    #[test]
    fn test_nested_and_null_references() {
        let inner = Reference::to(Record::new("Node"));
        let outer = Value::Ref(Reference::to(inner));
        assert_eq!(type_of(&outer), "**Node");

        let null = Value::Ref(Reference::null("Node"));
        assert_eq!(type_of(&null), "*Node");
        assert!(type_is_like("Node", &null));
    }

    #[test]
    fn test_display_rendering() {
        let seq = Value::from(vec![Value::Int(1), Value::from("a"), Value::Nil]);
        assert_eq!(seq.to_string(), "[1 a <nil>]");

        let mut entries = IndexMap::new();
        entries.insert("_0".to_string(), Value::from("foo"));
        entries.insert("_1".to_string(), Value::from("bar"));
        assert_eq!(Value::Map(entries).to_string(), "map[_0:foo _1:bar]");

        let rec = Record::new("P").with_field("x", 1).with_field("y", 2);
        assert_eq!(Value::Ref(Reference::to(rec)).to_string(), "&{1 2}");
    }

    #[test]
    fn test_json_conversion() {
        let v = Value::from(json!({"a": [1, -2, 1.5, null], "b": true}));
        let Value::Map(entries) = &v else {
            panic!("expected map, got {:?}", v);
        };
        assert_eq!(
            entries["a"],
            Value::Seq(vec![Value::Int(1), Value::Int(-2), Value::Float(1.5), Value::Nil])
        );
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({"a": [1, -2, 1.5, null], "b": true}));
    }

    #[test]
    fn test_record_serializes_as_fields() {
        let rec = Record::new("Person").with_field("name", "Ada").with_field("age", 36);
        let v = Value::Ref(Reference::to(rec));
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({"name": "Ada", "age": 36}));
    }
}
