//! Semantic type model for contract ABI values
//!
//! [`AbiType`] is the closed set of types the codec understands. Composite
//! records are shared behind an [`Arc`] so a resolved contract model can be
//! handed to several worker threads without copying its record definitions.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Width of one ABI slot in bytes
pub const WORD: usize = 32;

/// Placeholder name for composites without a usable declared name
pub const ANONYMOUS_RECORD: &str = "AnonymousTuple";

/// Shared handle to a record definition
pub type RecordRef = Arc<RecordDef>;

/// A type the ABI codec can encode and decode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Bool,
    String,
    Bytes,
    Address,
    /// 32-byte hash, produced for indexed dynamic event parameters
    Hash32,
    FixedBytes(usize),
    Uint(usize),
    Int(usize),
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(RecordRef),
}

/// Returns true when `bits` is a legal integer width (multiple of 8 in 8..=256)
pub fn is_valid_int_width(bits: usize) -> bool {
    (8..=256).contains(&bits) && bits % 8 == 0
}

impl AbiType {
    pub fn array(elem: AbiType) -> Self {
        Self::Array(Box::new(elem))
    }

    pub fn fixed_array(elem: AbiType, len: usize) -> Self {
        Self::FixedArray(Box::new(elem), len)
    }

    /// Returns true when values of this type live in the tail region
    ///
    /// Bytes, strings and dynamic arrays are always dynamic. Fixed arrays and
    /// tuples inherit dynamism from their element or fields.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(elem, _) => elem.is_dynamic(),
            Self::Tuple(record) => record.is_dynamic(),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in a head region
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            Self::FixedArray(elem, len) => elem.head_size() * len,
            Self::Tuple(record) => record.fields().iter().map(|f| f.ty.head_size()).sum(),
            _ => WORD,
        }
    }

    /// Canonical type string as used in signatures, e.g. `(uint256,address)[]`
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        use std::fmt::Write;

        match self {
            Self::Bool => out.push_str("bool"),
            Self::String => out.push_str("string"),
            Self::Bytes => out.push_str("bytes"),
            Self::Address => out.push_str("address"),
            Self::Hash32 => out.push_str("bytes32"),
            Self::FixedBytes(n) => {
                let _ = write!(out, "bytes{}", n);
            }
            Self::Uint(bits) => {
                let _ = write!(out, "uint{}", bits);
            }
            Self::Int(bits) => {
                let _ = write!(out, "int{}", bits);
            }
            Self::Array(elem) => {
                elem.write_canonical(out);
                out.push_str("[]");
            }
            Self::FixedArray(elem, len) => {
                elem.write_canonical(out);
                let _ = write!(out, "[{}]", len);
            }
            Self::Tuple(record) => {
                out.push('(');
                for (i, field) in record.fields().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    field.ty.write_canonical(out);
                }
                out.push(')');
            }
        }
    }

    /// Human-facing type name where tuples show their record name, e.g. `User[]`
    pub fn display_name(&self) -> String {
        match self {
            Self::Array(elem) => format!("{}[]", elem.display_name()),
            Self::FixedArray(elem, len) => format!("{}[{}]", elem.display_name(), len),
            Self::Tuple(record) => record.name().to_string(),
            other => other.canonical(),
        }
    }

    /// Record referenced by this type, looking through array layers
    pub fn record(&self) -> Option<&RecordRef> {
        match self {
            Self::Tuple(record) => Some(record),
            Self::Array(elem) | Self::FixedArray(elem, _) => elem.record(),
            _ => None,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

/// One named field of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbiType,
}

impl RecordField {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A named, ordered group of typed fields (a struct in the source schema)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordDef {
    name: String,
    fields: Vec<RecordField>,
}

impl RecordDef {
    pub fn new(name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        Self { name: name.into(), fields }
    }

    pub fn anonymous(fields: Vec<RecordField>) -> Self {
        Self::new(ANONYMOUS_RECORD, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS_RECORD
    }

    /// A record is dynamic as soon as one field is, transitively
    pub fn is_dynamic(&self) -> bool {
        self.fields.iter().any(|f| f.ty.is_dynamic())
    }

    pub fn into_ref(self) -> RecordRef {
        Arc::new(self)
    }
}

/// Something that occupies one position in an encoded parameter list
///
/// Implemented by record fields, bare types and the compiler's parameter
/// model so all of them can be fed to the sequence codec. An empty name makes
/// error messages fall back to the position index.
pub trait ParamSlot {
    fn slot_name(&self) -> &str;
    fn slot_type(&self) -> &AbiType;
}

impl ParamSlot for AbiType {
    fn slot_name(&self) -> &str {
        ""
    }

    fn slot_type(&self) -> &AbiType {
        self
    }
}

impl ParamSlot for RecordField {
    fn slot_name(&self) -> &str {
        &self.name
    }

    fn slot_type(&self) -> &AbiType {
        &self.ty
    }
}

impl<T: ParamSlot + ?Sized> ParamSlot for &T {
    fn slot_name(&self) -> &str {
        (**self).slot_name()
    }

    fn slot_type(&self) -> &AbiType {
        (**self).slot_type()
    }
}
