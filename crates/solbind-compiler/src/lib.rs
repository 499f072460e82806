//! solbind Compiler
//!
//! Resolves a compiler's combined JSON output (contract ABIs plus selector
//! tables) into [`ContractModel`]s: typed parameters, named record
//! definitions, disambiguated overload names and verified selectors. The
//! models carry the encode/decode entry points generated bindings call.

pub mod contract;
pub mod error;
pub mod hasher;
pub mod model;
pub mod naming;
pub mod resolver;
pub mod schema;

pub use contract::{resolve_all, resolve_contract, ResolverConfig, StructNaming};
pub use error::{CompilerError, Result};
pub use model::{CallableSignature, ConstructorSignature, ContractModel, EventSignature, Parameter};
pub use resolver::{
    LastSegmentName, QualifiedNameHeuristic, RecordRegistry, StructNameStrategy, TypeResolver,
};
pub use schema::{parse_combined_json, AbiEntry, AbiParam, CombinedContract, CombinedJson};

// Re-export runtime types for convenience
pub use solbind_runtime::{AbiType, AbiValue, CodecError, RecordDef, RecordField, RecordRef};

/// Parse and resolve a combined JSON document in one step
pub fn compile(input: &str, config: &ResolverConfig) -> Result<Vec<ContractModel>> {
    let schema = parse_combined_json(input)?;
    resolve_all(&schema, config)
}
