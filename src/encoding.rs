//! Encoding Functions - base64, base32, SHA-256, JSON
//!
//! Decoders never fail a render: malformed input or non-UTF-8 output
//! decodes to "".

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::config::FuncConfig;
use crate::registry::FuncMap;
use crate::value::Value;

const BASE32: base32::Alphabet = base32::Alphabet::RFC4648 { padding: true };

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn b64enc(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

pub fn b64dec(s: &str) -> String {
    match STANDARD.decode(s.trim()) {
        Ok(bytes) => utf8_or_empty("b64dec", bytes),
        Err(e) => {
            warn!(error = %e, "b64dec: malformed input");
            String::new()
        }
    }
}

pub fn b32enc(s: &str) -> String {
    base32::encode(BASE32, s.as_bytes())
}

pub fn b32dec(s: &str) -> String {
    match base32::decode(BASE32, s.trim()) {
        Some(bytes) => utf8_or_empty("b32dec", bytes),
        None => {
            warn!("b32dec: malformed input");
            String::new()
        }
    }
}

fn utf8_or_empty(func: &str, bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|_| {
        warn!(func, "decoded bytes are not UTF-8");
        String::new()
    })
}

pub fn to_json(v: &Value) -> String {
    serde_json::to_string(v).unwrap_or_else(|e| {
        warn!(error = %e, "toJson: cannot serialize");
        String::new()
    })
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

pub(crate) fn register(funcs: &mut FuncMap, config: &FuncConfig) {
    funcs.define("b64enc", |a| {
        a.exactly(1)?;
        Ok(Value::from(b64enc(&a.string(0))))
    });
    funcs.define("b64dec", |a| {
        a.exactly(1)?;
        Ok(Value::from(b64dec(&a.string(0))))
    });
    funcs.define("b32enc", |a| {
        a.exactly(1)?;
        Ok(Value::from(b32enc(&a.string(0))))
    });
    funcs.define("b32dec", |a| {
        a.exactly(1)?;
        Ok(Value::from(b32dec(&a.string(0))))
    });
    funcs.define("sha256sum", |a| {
        a.exactly(1)?;
        Ok(Value::from(sha256_hex(a.string(0).as_bytes())))
    });
    funcs.define("toJson", |a| {
        a.exactly(1)?;
        Ok(Value::from(to_json(a.get(0))))
    });
    if !config.hermetic {
        funcs.define("uuidv4", |a| {
            a.exactly(0)?;
            Ok(Value::from(Uuid::new_v4().to_string()))
        });
    }
}
