//! tplfuncs Core - Template Function Registry
//!
//! # Rules
//! 1. Every value has exactly one kind
//! 2. Introspection never fails
//! 3. Empty resolves to the fallback
//! 4. Only `index` and random strings raise
//! 5. Randomness is injected, never global
//! 6. A built registry is shared read-only

pub mod config;
pub mod containers;
pub mod dates;
pub mod defaults;
pub mod encoding;
pub mod env;
pub mod error;
pub mod random;
pub mod registry;
pub mod strings;
pub mod value;
pub mod versions;

pub use config::FuncConfig;
pub use containers::{index, split, tuple, SplitMap, Tuple};
pub use defaults::{coalesce, default_value};
pub use error::{ConfigError, FuncError};
pub use random::{Alphabet, RandomStrings};
pub use registry::{Args, FuncMap, TemplateFn};
pub use value::{
    is_empty, kind_is, kind_of, type_is, type_is_like, type_of, Kind, Record, Reference, Value,
};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
