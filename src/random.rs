//! Random Strings - Fixed-Length Draws From a Character Alphabet
//!
//! NOT suitable for secrets, tokens or passwords. The generator is
//! statistically uniform but makes no cryptographic guarantees.

use std::sync::{Mutex, PoisonError};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::FuncError;

const ALPHABETIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NUMERIC: &[u8] = b"0123456789";
/// Printable ASCII, 0x20 through 0x7E.
const ASCII: &[u8] = b" !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    Alphabetic,
    Alphanumeric,
    Numeric,
    Ascii,
}

impl Alphabet {
    /// Sampling domain, in a fixed order.
    pub fn chars(&self) -> &'static [u8] {
        match self {
            Alphabet::Alphabetic => ALPHABETIC,
            Alphabet::Alphanumeric => ALPHANUMERIC,
            Alphabet::Numeric => NUMERIC,
            Alphabet::Ascii => ASCII,
        }
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.chars().contains(&(c as u8))
    }
}

/// Random string generator over an injected randomness source.
///
/// The source sits behind a mutex so one generator can serve concurrent
/// renders.
pub struct RandomStrings<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomStrings<StdRng> {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic output, for reproducible renders and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomStrings<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    /// Draw `length` characters uniformly from `alphabet`.
    ///
    /// `Uniform` rejects out-of-zone draws, so alphabets whose size does not
    /// divide the source range carry no modulo bias.
    pub fn generate(&self, alphabet: Alphabet, length: i64) -> Result<String, FuncError> {
        let length = usize::try_from(length).map_err(|_| {
            FuncError::InvalidArgument(format!("random string length must be >= 0, got {}", length))
        })?;

        let domain = alphabet.chars();
        let pick = Uniform::from(0..domain.len());
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        Ok((0..length)
            .map(|_| char::from(domain[pick.sample(&mut *rng)]))
            .collect())
    }

    pub fn alphanumeric(&self, length: i64) -> Result<String, FuncError> {
        self.generate(Alphabet::Alphanumeric, length)
    }

    pub fn alphabetic(&self, length: i64) -> Result<String, FuncError> {
        self.generate(Alphabet::Alphabetic, length)
    }

    pub fn numeric(&self, length: i64) -> Result<String, FuncError> {
        self.generate(Alphabet::Numeric, length)
    }

    pub fn ascii(&self, length: i64) -> Result<String, FuncError> {
        self.generate(Alphabet::Ascii, length)
    }
}

impl Default for RandomStrings<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}
