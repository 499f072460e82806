//! Combined-JSON schema loading
//!
//! Deserializes the compiler's combined JSON output (`contracts` keyed by
//! `"<source-id>:<contract-name>"`) into plain serde structures. Nothing here
//! interprets type strings; that is the resolver's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::{CompilerError, Result};

/// Top-level combined JSON document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedJson {
    #[serde(default)]
    pub contracts: BTreeMap<String, CombinedContract>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One compiled contract entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedContract {
    #[serde(deserialize_with = "deserialize_abi")]
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub bin: String,
    #[serde(default, rename = "bin-runtime")]
    pub bin_runtime: String,
    /// Canonical signature to hex selector, as emitted by `--combined-json hashes`
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiEntry {
    Function(FunctionEntry),
    Event(EventEntry),
    Error(ErrorEntry),
    Constructor(ConstructorEntry),
    Fallback(SpecialEntry),
    Receive(SpecialEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    pub state_mutability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConstructorEntry {
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    pub state_mutability: Option<String>,
}

/// `fallback` and `receive` carry no parameters worth binding
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecialEntry {
    #[serde(default, rename = "stateMutability")]
    pub state_mutability: Option<String>,
}

/// A single parameter or tuple component as written in the ABI
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "internalType")]
    pub internal_type: Option<String>,
    #[serde(default)]
    pub components: Vec<AbiParam>,
    #[serde(default)]
    pub indexed: bool,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into(), ..Default::default() }
    }

    pub fn with_internal_type(mut self, internal_type: impl Into<String>) -> Self {
        self.internal_type = Some(internal_type.into());
        self
    }

    pub fn with_components(mut self, components: Vec<AbiParam>) -> Self {
        self.components = components;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// Older compilers emit `abi` as a JSON-encoded string rather than an array
fn deserialize_abi<'de, D>(deserializer: D) -> std::result::Result<Vec<AbiEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAbi {
        Entries(Vec<AbiEntry>),
        Encoded(String),
    }

    match RawAbi::deserialize(deserializer)? {
        RawAbi::Entries(entries) => Ok(entries),
        RawAbi::Encoded(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
    }
}

/// Parse a combined JSON document and check it names at least one contract
pub fn parse_combined_json(input: &str) -> Result<CombinedJson> {
    let schema: CombinedJson = serde_json::from_str(input)?;
    if schema.contracts.is_empty() {
        return Err(CompilerError::InvalidSchema("no contracts found in combined JSON".to_string()));
    }
    for key in schema.contracts.keys() {
        split_contract_key(key)?;
    }
    Ok(schema)
}

/// Split `"<source-id>:<contract-name>"` into its two halves
///
/// The split happens at the last colon, so source paths containing a drive
/// letter (`C:\src\Token.sol:Token`) keep their full path.
pub fn split_contract_key(key: &str) -> Result<(&str, &str)> {
    match key.rsplit_once(':') {
        Some((source, name)) if !source.is_empty() && !name.is_empty() => Ok((source, name)),
        _ => Err(CompilerError::InvalidSchema(format!(
            "contract key '{}' is not of the form '<source>:<name>'",
            key
        ))),
    }
}

/// Normalize bytecode hex to carry a `0x` prefix; empty stays empty
pub fn prefixed_hex(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() || code.starts_with("0x") {
        code.to_string()
    } else {
        format!("0x{}", code)
    }
}

/// An unlinked library placeholder inside creation bytecode
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LinkReference {
    /// The 34-hex-character placeholder hash between `__$` and `$__`
    pub placeholder: String,
    /// Byte offset of the 20-byte address slot in the bytecode
    pub start: usize,
    pub length: usize,
}

const PLACEHOLDER_PREFIX: &str = "__$";
const PLACEHOLDER_SUFFIX: &str = "$__";
/// Placeholders occupy the 40 hex characters of an address
const PLACEHOLDER_HEX_LEN: usize = 40;

/// Scan unprefixed or prefixed bytecode hex for library placeholders
pub fn link_references(code: &str) -> Vec<LinkReference> {
    let code = code.strip_prefix("0x").unwrap_or(code);
    let mut refs = Vec::new();
    let mut cursor = 0;

    while let Some(found) = code[cursor..].find(PLACEHOLDER_PREFIX) {
        let start = cursor + found;
        match code.get(start..start + PLACEHOLDER_HEX_LEN) {
            Some(window) if window.ends_with(PLACEHOLDER_SUFFIX) => {
                let inner =
                    &window[PLACEHOLDER_PREFIX.len()..PLACEHOLDER_HEX_LEN - PLACEHOLDER_SUFFIX.len()];
                refs.push(LinkReference {
                    placeholder: inner.to_string(),
                    start: start / 2,
                    length: 20,
                });
                cursor = start + PLACEHOLDER_HEX_LEN;
            }
            _ => cursor = start + PLACEHOLDER_PREFIX.len(),
        }
    }

    refs
}
