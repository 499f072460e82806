//! Type resolution
//!
//! Turns ABI type descriptors into [`AbiType`] values. Tuples become named
//! record definitions held in a per-contract [`RecordRegistry`]; their names
//! come from a pluggable [`StructNameStrategy`].

use std::collections::BTreeMap;

use solbind_runtime::{is_valid_int_width, AbiType, RecordDef, RecordField, RecordRef};

use crate::error::{CompilerError, Result};
use crate::model::Parameter;
use crate::naming::{export_identifier, sanitize_identifier};
use crate::schema::AbiParam;

/// Chooses the record name for a tuple from its raw declared name
///
/// The raw name is the tuple's `internalType` with the `struct ` prefix and
/// any array suffixes removed, e.g. `Container.User`. Returning `None`
/// leaves the tuple anonymous.
pub trait StructNameStrategy: Send + Sync {
    fn record_name(&self, raw: &str) -> Option<String>;
}

/// Default naming: last dotted segment, else the suffix starting at the
/// rightmost lower-to-upper case transition, else the whole name
///
/// The case-transition step recovers `User` from concatenated names such as
/// `ContainerUser`, but will also split a plain camel-case name like
/// `UserInfo` into `Info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedNameHeuristic;

impl StructNameStrategy for QualifiedNameHeuristic {
    fn record_name(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        let picked = match raw.rsplit_once('.') {
            Some((_, last)) => last,
            None => {
                let transitions = case_transitions(raw);
                let split = transitions.last().copied().unwrap_or(0);
                if transitions.len() > 1 {
                    tracing::warn!(
                        target: "solbind::resolver",
                        raw,
                        picked = &raw[split..],
                        "struct name has several case transitions; the guess may be wrong"
                    );
                }
                &raw[split..]
            }
        };
        clean_record_name(picked)
    }
}

/// Only strips the qualifying container: `Container.User` becomes `User`,
/// `UserInfo` stays `UserInfo`
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSegmentName;

impl StructNameStrategy for LastSegmentName {
    fn record_name(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        clean_record_name(raw.rsplit_once('.').map_or(raw, |(_, last)| last))
    }
}

fn clean_record_name(picked: &str) -> Option<String> {
    if picked.is_empty() || !picked.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(export_identifier(&sanitize_identifier(picked)))
}

/// Byte indices `i > 0` where `raw[i]` is uppercase and `raw[i - 1]` lowercase
fn case_transitions(raw: &str) -> Vec<usize> {
    let bytes = raw.as_bytes();
    (1..bytes.len())
        .filter(|&i| bytes[i].is_ascii_uppercase() && bytes[i - 1].is_ascii_lowercase())
        .collect()
}

/// Raw declared name of a tuple: `internalType` without `struct ` and
/// without trailing `[..]` groups
pub fn raw_struct_name(internal_type: &str) -> &str {
    let mut name = internal_type.trim();
    name = name.strip_prefix("struct ").unwrap_or(name);
    while name.ends_with(']') {
        match name.rfind('[') {
            Some(open) => name = &name[..open],
            None => break,
        }
    }
    name
}

/// Per-contract set of named record definitions, keyed by name
#[derive(Debug, Clone, Default)]
pub struct RecordRegistry {
    records: BTreeMap<String, RecordRef>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named record, returning the shared definition
    ///
    /// Registering an identical definition again returns the existing one.
    /// A different definition under the same name is a [`CompilerError::NameCollision`].
    pub fn register(&mut self, def: RecordDef) -> Result<RecordRef> {
        if let Some(existing) = self.records.get(def.name()) {
            if **existing != def {
                return Err(CompilerError::NameCollision(format!(
                    "struct '{}' is declared with different fields ({} vs {})",
                    def.name(),
                    describe_fields(existing),
                    describe_fields(&def)
                )));
            }
            return Ok(existing.clone());
        }

        tracing::debug!(target: "solbind::resolver", name = def.name(), "registered struct");
        let record = def.into_ref();
        self.records.insert(record.name().to_string(), record.clone());
        Ok(record)
    }

    pub fn get(&self, name: &str) -> Option<&RecordRef> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in name order
    pub fn into_records(self) -> Vec<RecordRef> {
        self.records.into_values().collect()
    }
}

fn describe_fields(def: &RecordDef) -> String {
    let parts: Vec<String> =
        def.fields().iter().map(|f| format!("{} {}", f.ty.canonical(), f.name)).collect();
    format!("({})", parts.join(", "))
}

/// Resolves ABI parameters against one contract's record registry
pub struct TypeResolver<'a> {
    registry: &'a mut RecordRegistry,
    strategy: &'a dyn StructNameStrategy,
}

impl<'a> TypeResolver<'a> {
    pub fn new(registry: &'a mut RecordRegistry) -> Self {
        Self { registry, strategy: &QualifiedNameHeuristic }
    }

    pub fn with_strategy(
        registry: &'a mut RecordRegistry,
        strategy: &'a dyn StructNameStrategy,
    ) -> Self {
        Self { registry, strategy }
    }

    /// Resolve one parameter's type, registering any named tuples it contains
    pub fn resolve(&mut self, param: &AbiParam) -> Result<AbiType> {
        self.resolve_descriptor(param.ty.trim(), param)
    }

    /// Resolve a parameter list into named parameters
    ///
    /// Empty names become `FieldN` (1-based); others are sanitized.
    pub fn resolve_params(&mut self, params: &[AbiParam]) -> Result<Vec<Parameter>> {
        params
            .iter()
            .enumerate()
            .map(|(i, param)| -> Result<Parameter> {
                let name = if param.name.is_empty() {
                    format!("Field{}", i + 1)
                } else {
                    sanitize_identifier(&param.name)
                };
                Ok(Parameter { name, ty: self.resolve(param)?, indexed: param.indexed })
            })
            .collect()
    }

    fn resolve_descriptor(&mut self, descriptor: &str, param: &AbiParam) -> Result<AbiType> {
        if let Some(body) = descriptor.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(|| unsupported(descriptor))?;
            let elem = self.resolve_descriptor(&body[..open], param)?;
            let len = &body[open + 1..];
            if len.is_empty() {
                return Ok(AbiType::array(elem));
            }
            return match len.parse::<usize>() {
                Ok(n) if n > 0 => Ok(AbiType::fixed_array(elem, n)),
                _ => Err(unsupported(descriptor)),
            };
        }

        if descriptor == "tuple" {
            return self.resolve_tuple(param);
        }

        parse_elementary(descriptor)
    }

    fn resolve_tuple(&mut self, param: &AbiParam) -> Result<AbiType> {
        if param.components.is_empty() {
            return Err(CompilerError::InvalidSchema(format!(
                "tuple parameter '{}' has no components",
                param.name
            )));
        }

        let mut fields = Vec::with_capacity(param.components.len());
        for (i, component) in param.components.iter().enumerate() {
            let name = if component.name.is_empty() {
                format!("Field{}", i + 1)
            } else {
                export_identifier(&sanitize_identifier(&component.name))
            };
            fields.push(RecordField::new(name, self.resolve(component)?));
        }

        let record_name = param
            .internal_type
            .as_deref()
            .map(raw_struct_name)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| self.strategy.record_name(raw));

        let record = match record_name {
            Some(name) => self.registry.register(RecordDef::new(name, fields))?,
            None => {
                tracing::warn!(
                    target: "solbind::resolver",
                    param = %param.name,
                    internal_type = ?param.internal_type,
                    "tuple has no usable struct name; treating it as anonymous"
                );
                RecordDef::anonymous(fields).into_ref()
            }
        };

        Ok(AbiType::Tuple(record))
    }
}

fn unsupported(descriptor: &str) -> CompilerError {
    CompilerError::UnsupportedType(format!("'{}'", descriptor))
}

/// Parse a non-array, non-tuple type name
pub fn parse_elementary(name: &str) -> Result<AbiType> {
    match name {
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "address" => return Ok(AbiType::Address),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    let width = |digits: &str| -> Option<usize> {
        if digits.is_empty() || digits.starts_with('0') {
            return None;
        }
        digits.parse::<usize>().ok()
    };

    if let Some(bits) = name.strip_prefix("uint").and_then(width) {
        if is_valid_int_width(bits) {
            return Ok(AbiType::Uint(bits));
        }
    } else if let Some(bits) = name.strip_prefix("int").and_then(width) {
        if is_valid_int_width(bits) {
            return Ok(AbiType::Int(bits));
        }
    } else if let Some(len) = name.strip_prefix("bytes").and_then(width) {
        if len <= 32 {
            return Ok(AbiType::FixedBytes(len));
        }
    }

    Err(unsupported(name))
}
