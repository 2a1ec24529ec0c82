//! Contract Invariant Tests
//!
//! These tests verify the guarantees the host engine relies on.

use std::collections::HashMap;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tplfuncs_core::{
    default_value, index, is_empty, split, tuple, type_is, type_is_like, type_of, Alphabet,
    FuncConfig, FuncError, FuncMap, RandomStrings, Record, Reference, Value,
};

fn create_funcs() -> FuncMap {
    FuncMap::with_config(&FuncConfig {
        seed: Some(42),
        ..FuncConfig::default()
    })
}

fn zero_values() -> Vec<Value> {
    vec![
        Value::Nil,
        Value::Bool(false),
        Value::Int(0),
        Value::Uint(0),
        Value::Float(0.0),
        Value::from(""),
        Value::Seq(vec![]),
        Value::Map(IndexMap::new()),
        Value::Ref(Reference::null("Widget")),
    ]
}

#[test]
fn invariant_zero_values_are_empty_except_records() {
    for z in zero_values() {
        assert!(is_empty(&z), "{:?}", z);
    }

    let record = Record::new("Widget").with_field("count", 0).with_field("name", "");
    assert!(!is_empty(&Value::Record(record)));
    assert!(!is_empty(&Value::Record(Record::new("Unit"))));
}

#[test]
fn invariant_default_returns_value_unless_empty() {
    let fallback = Value::from("fallback");
    let samples = vec![
        Value::Int(3),
        Value::from("x"),
        Value::Bool(true),
        Value::Record(Record::new("Widget")),
        Value::Ref(Reference::to(0)),
        Value::Opaque("chan int".into()),
    ];

    for v in samples.into_iter().chain(zero_values()) {
        let resolved = default_value(fallback.clone(), Some(v.clone()));
        if is_empty(&v) {
            assert_eq!(resolved, fallback);
        } else {
            assert_eq!(resolved, v);
        }
    }
    assert_eq!(default_value(fallback.clone(), None), fallback);
}

#[test]
fn invariant_default_after_trim() {
    let funcs = create_funcs();
    let trimmed = funcs.call("trim", &[Value::from("   ")]).unwrap();
    let resolved = funcs.call("default", &[Value::from("empty"), trimmed]).unwrap();
    assert_eq!(resolved, Value::from("empty"));
}

#[test]
fn invariant_reference_labels_are_strict() {
    let referents = vec![
        Value::Record(Record::new("Widget")),
        Value::Int(5),
        Value::from("s"),
        Value::Ref(Reference::to(Record::new("Inner"))),
    ];

    for target in referents {
        let label = type_of(&target);
        let r = Value::Ref(Reference::to(target));
        assert_eq!(type_of(&r), format!("*{}", label));
        assert!(!type_is(&label, &r));
        assert!(type_is_like(&label, &r));
    }
}

#[test]
fn invariant_split_and_tuple_examples() {
    let m = split("/", "foo/bar/baz");
    let entries: Vec<(&str, &str)> = m.iter().collect();
    assert_eq!(entries, vec![("_0", "foo"), ("_1", "bar"), ("_2", "baz")]);

    let t = Value::from(tuple(&[Value::Int(1), Value::from("a"), Value::from("foo")]));
    assert_eq!(index(&t, &Value::Int(2)), Ok(Value::from("foo")));
}

#[test]
fn invariant_split_empty_separator() {
    let m = split("", "abc");
    let entries: Vec<(&str, &str)> = m.iter().collect();
    assert_eq!(entries, vec![("_0", "abc")]);
}

#[test]
fn invariant_segment_count_is_occurrences_plus_one() {
    for (sep, subject) in [("/", "a/b//c/"), ("--", "--x----y"), (",", "none"), ("ab", "")] {
        let occurrences = subject.matches(sep).count();
        assert_eq!(split(sep, subject).len(), occurrences + 1, "{:?} in {:?}", sep, subject);
    }
}

#[test]
fn invariant_index_out_of_range() {
    let t = Value::from(tuple(&[Value::Int(1), Value::Int(2), Value::Int(3)]));
    assert_eq!(
        index(&t, &Value::Int(5)),
        Err(FuncError::OutOfRange { index: 5, len: 3 })
    );

    let funcs = create_funcs();
    let built = funcs.call("tuple", &[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();
    let err = funcs.call("index", &[built, Value::Int(5)]).unwrap_err();
    assert!(err.to_string().contains("index out of range"));
}

#[test]
fn invariant_random_length_and_membership() {
    let gen = RandomStrings::new(StdRng::seed_from_u64(99));
    for n in 0..40 {
        let s = gen.generate(Alphabet::Alphabetic, n).unwrap();
        assert_eq!(s.chars().count(), n as usize);
        assert!(s.chars().all(|c| c.is_ascii_alphabetic()));
    }
    assert!(matches!(
        gen.generate(Alphabet::Alphabetic, -1),
        Err(FuncError::InvalidArgument(_))
    ));
}

#[test]
fn invariant_random_digits_uniform() {
    let funcs = create_funcs();
    let mut counts: HashMap<char, u32> = HashMap::new();
    for _ in 0..200 {
        let s = funcs.call("randNumeric", &[Value::Int(100)]).unwrap().to_string();
        for c in s.chars() {
            *counts.entry(c).or_default() += 1;
        }
    }
    assert_eq!(counts.len(), 10);

    let expected = 2000.0;
    let chi2: f64 = counts
        .values()
        .map(|&o| (f64::from(o) - expected).powi(2) / expected)
        .sum();
    // 9 degrees of freedom, p = 0.001.
    assert!(chi2 < 27.88, "chi-square {}", chi2);
}

#[test]
fn invariant_registry_failures_are_contained() {
    let funcs = create_funcs();

    // Malformed input degrades instead of failing.
    assert_eq!(funcs.call("b64dec", &[Value::from("%%%")]), Ok(Value::from("")));
    assert_eq!(
        funcs.call("dateModify", &[Value::from("soon"), Value::Int(0)]),
        funcs.call("dateModify", &[Value::from("0s"), Value::Int(0)])
    );
    assert_eq!(funcs.call("empty", &[Value::Opaque("chan int".into())]), Ok(Value::Bool(false)));

    // Only the two raising operations raise.
    assert!(funcs.call("randAlpha", &[Value::Int(-3)]).is_err());
    assert!(funcs.call("index", &[Value::Seq(vec![]), Value::Int(0)]).is_err());
}
