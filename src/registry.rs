//! Function Registry - Name to Callable Mapping
//!
//! The host engine receives a fully built [`FuncMap`] before it parses any
//! template. Every function takes already-evaluated positional arguments and
//! returns one value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use crate::config::FuncConfig;
use crate::containers::{index, split, tuple};
use crate::defaults::{coalesce, default_value};
use crate::error::FuncError;
use crate::random::{Alphabet, RandomStrings};
use crate::value::{is_empty, kind_is, kind_of, type_is, type_is_like, type_of, Value};

/// A registered template function.
pub type TemplateFn = Arc<dyn Fn(&[Value]) -> Result<Value, FuncError> + Send + Sync>;

static NIL: Value = Value::Nil;

/// Positional arguments of one call, with coercion helpers.
pub struct Args<'a> {
    name: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(name: &'a str, values: &'a [Value]) -> Self {
        Self { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn exactly(&self, n: usize) -> Result<(), FuncError> {
        self.between(n, n)
    }

    pub fn between(&self, min: usize, max: usize) -> Result<(), FuncError> {
        let got = self.values.len();
        if (min..=max).contains(&got) {
            return Ok(());
        }
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{}..={}", min, max)
        };
        Err(FuncError::arity(self.name, &expected, got))
    }

    /// Argument `i`, or nil when not supplied.
    pub fn get(&self, i: usize) -> &'a Value {
        self.values.get(i).unwrap_or(&NIL)
    }

    /// Argument `i` rendered as text; nil renders as "".
    pub fn string(&self, i: usize) -> String {
        match self.get(i) {
            Value::Nil => String::new(),
            v => v.to_string(),
        }
    }

    pub fn int(&self, i: usize) -> Result<i64, FuncError> {
        let v = self.get(i);
        coerce_int(v).ok_or_else(|| {
            FuncError::InvalidArgument(format!(
                "{} expects an integer at position {}, got {}",
                self.name,
                i,
                kind_of(v)
            ))
        })
    }
}

/// Integer view of a value: integers, finite floats (truncated) and numeric
/// strings. References are followed.
pub fn coerce_int(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Uint(n) => i64::try_from(*n).ok(),
        Value::Float(x) if x.is_finite() => Some(x.trunc() as i64),
        Value::String(s) => s.trim().parse().ok(),
        Value::Ref(r) => r.target().and_then(coerce_int),
        _ => None,
    }
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Name to callable mapping handed to the host engine.
#[derive(Clone, Default)]
pub struct FuncMap {
    funcs: HashMap<String, TemplateFn>,
}

impl FuncMap {
    /// An empty map.
    pub fn new() -> Self {
        Self {
            funcs: HashMap::new(),
        }
    }

    /// Every function, with default configuration.
    pub fn standard() -> Self {
        Self::with_config(&FuncConfig::default())
    }

    pub fn with_config(config: &FuncConfig) -> Self {
        let random = match config.seed {
            Some(seed) => RandomStrings::seeded(seed),
            None => RandomStrings::from_entropy(),
        };
        Self::with_random(config, random)
    }

    /// Like [`FuncMap::with_config`], with the random source supplied by the caller.
    pub fn with_random<R>(config: &FuncConfig, random: RandomStrings<R>) -> Self
    where
        R: RngCore + Send + 'static,
    {
        let mut map = Self::new();
        map.register_core();
        if !config.hermetic {
            map.register_random(Arc::new(random));
        }
        crate::strings::register(&mut map);
        crate::dates::register(&mut map, config);
        crate::env::register(&mut map, config);
        crate::encoding::register(&mut map, config);
        crate::versions::register(&mut map);
        map
    }

    /// Register a function under a unique lower camel case name.
    pub fn register<F>(&mut self, name: &str, f: F) -> Result<(), FuncError>
    where
        F: Fn(&[Value]) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        if !valid_name(name) {
            return Err(FuncError::InvalidName(name.to_string()));
        }
        if self.funcs.contains_key(name) {
            return Err(FuncError::DuplicateFunction(name.to_string()));
        }
        self.funcs.insert(name.to_string(), Arc::new(f));
        Ok(())
    }

    /// Built-in registration. Names are compile-time constants.
    pub(crate) fn define<F>(&mut self, name: &'static str, f: F)
    where
        F: Fn(&Args<'_>) -> Result<Value, FuncError> + Send + Sync + 'static,
    {
        debug_assert!(valid_name(name), "bad builtin name {}", name);
        debug_assert!(!self.funcs.contains_key(name), "duplicate builtin {}", name);
        self.funcs.insert(
            name.to_string(),
            Arc::new(move |values: &[Value]| f(&Args::new(name, values))),
        );
    }

    pub fn get(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Invoke `name` with positional arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FuncError> {
        let f = self
            .funcs
            .get(name)
            .ok_or_else(|| FuncError::UnknownFunction(name.to_string()))?;
        debug!(function = name, argc = args.len(), "dispatch");
        f(args)
    }

    fn register_core(&mut self) {
        self.define("empty", |a| {
            a.exactly(1)?;
            Ok(Value::Bool(is_empty(a.get(0))))
        });
        self.define("default", |a| {
            a.between(1, 2)?;
            Ok(default_value(a.get(0).clone(), a.values().get(1).cloned()))
        });
        self.define("coalesce", |a| Ok(coalesce(a.values())));

        self.define("kindOf", |a| {
            a.exactly(1)?;
            Ok(Value::from(kind_of(a.get(0)).as_str()))
        });
        self.define("kindIs", |a| {
            a.exactly(2)?;
            Ok(Value::Bool(kind_is(&a.string(0), a.get(1))))
        });
        self.define("typeOf", |a| {
            a.exactly(1)?;
            Ok(Value::String(type_of(a.get(0))))
        });
        self.define("typeIs", |a| {
            a.exactly(2)?;
            Ok(Value::Bool(type_is(&a.string(0), a.get(1))))
        });
        self.define("typeIsLike", |a| {
            a.exactly(2)?;
            Ok(Value::Bool(type_is_like(&a.string(0), a.get(1))))
        });

        self.define("tuple", |a| Ok(Value::from(tuple(a.values()))));
        self.define("index", |a| {
            a.exactly(2)?;
            index(a.get(0), a.get(1))
        });
        self.define("split", |a| {
            a.exactly(2)?;
            Ok(Value::from(split(&a.string(0), &a.string(1))))
        });
    }

    fn register_random<R>(&mut self, random: Arc<RandomStrings<R>>)
    where
        R: RngCore + Send + 'static,
    {
        let table = [
            ("randAlphaNum", Alphabet::Alphanumeric),
            ("randAlpha", Alphabet::Alphabetic),
            ("randNumeric", Alphabet::Numeric),
            ("randAscii", Alphabet::Ascii),
        ];
        for (name, alphabet) in table {
            let random = Arc::clone(&random);
            self.define(name, move |a| {
                a.exactly(1)?;
                random.generate(alphabet, a.int(0)?).map(Value::String)
            });
        }
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncMap").field("names", &self.names()).finish()
    }
}
