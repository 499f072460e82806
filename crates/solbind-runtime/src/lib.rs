//! solbind Runtime
//!
//! Contract ABI type model and binary codec shared by the solbind toolkit.
//! This crate holds the semantic types, the runtime value model and the
//! head/tail encoder and decoder. It has no knowledge of schemas or naming;
//! see `solbind-compiler` for that.

pub mod decode;
pub mod encode;
pub mod error;
mod path;
pub mod types;
pub mod value;

// Re-export core types for convenience
pub use decode::{decode, decode_params, decode_params_at, must_decode, must_decode_params};
pub use encode::{encode, encode_params, encode_with_selector};
pub use error::{CodecError, Result};
pub use types::{
    is_valid_int_width, AbiType, ParamSlot, RecordDef, RecordField, RecordRef, ANONYMOUS_RECORD,
    WORD,
};
pub use value::AbiValue;

pub use alloy_primitives::{Address, B256, I256, U256};
