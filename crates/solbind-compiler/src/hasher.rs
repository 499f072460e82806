//! Selector and topic hashing
//!
//! Selectors are the first four bytes of Keccak-256 over the canonical
//! signature; event topics are the full 32-byte hash.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, Selector, B256};

use crate::error::{CompilerError, Result};

/// Canonical signature `name(t1,t2,...)` from canonical parameter types
pub fn canonical_signature<I, S>(name: &str, types: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let params: Vec<S> = types.into_iter().collect();
    let joined = params.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    format!("{}({})", name, joined)
}

pub fn selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..4])
}

pub fn topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

/// Lowercase hex of the first four bytes, without prefix
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

/// Parse a selector written as 8 hex characters, with or without `0x`
pub fn parse_selector(text: &str) -> Option<Selector> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).ok()?;
    (bytes.len() == 4).then(|| Selector::from_slice(&bytes))
}

/// Look `signature` up in a selector table and cross-check it against the hash
///
/// Absent entries yield `Ok(None)`; the caller decides whether that is fatal.
pub fn lookup_selector(
    table: &BTreeMap<String, String>,
    signature: &str,
) -> Result<Option<Selector>> {
    let Some(supplied) = table.get(signature) else {
        return Ok(None);
    };

    let parsed = parse_selector(supplied).ok_or_else(|| {
        CompilerError::InvalidSchema(format!(
            "selector '{}' for {} is not 4 bytes of hex",
            supplied, signature
        ))
    })?;

    let computed = selector(signature);
    if parsed != computed {
        return Err(CompilerError::SelectorMismatch {
            signature: signature.to_string(),
            supplied: hex::encode(parsed),
            computed: hex::encode(computed),
        });
    }

    Ok(Some(parsed))
}
