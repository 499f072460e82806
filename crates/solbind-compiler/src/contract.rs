//! Contract resolution
//!
//! Drives the resolver, hasher and namer over one combined-JSON contract
//! entry, or over a whole document, to produce [`ContractModel`]s.

use std::collections::BTreeMap;

use crate::error::{CompilerError, Result};
use crate::hasher::{canonical_signature, lookup_selector, selector, short_hex, topic};
use crate::model::{CallableSignature, ConstructorSignature, ContractModel, EventSignature, Parameter};
use crate::naming::{overload_name, sanitize_package_name, DEFAULT_MAX_OVERLOAD_NAME_LEN};
use crate::resolver::{
    LastSegmentName, QualifiedNameHeuristic, RecordRegistry, StructNameStrategy, TypeResolver,
};
use crate::schema::{
    link_references, prefixed_hex, split_contract_key, AbiEntry, CombinedContract, CombinedJson,
};

/// Which built-in [`StructNameStrategy`] names tuples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructNaming {
    /// [`QualifiedNameHeuristic`]
    #[default]
    Heuristic,
    /// [`LastSegmentName`]
    LastSegment,
}

impl StructNaming {
    pub fn strategy(self) -> &'static dyn StructNameStrategy {
        match self {
            Self::Heuristic => &QualifiedNameHeuristic,
            Self::LastSegment => &LastSegmentName,
        }
    }
}

/// Resolution settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fail when an error's signature is absent from the selector table
    pub require_error_selectors: bool,
    /// Longest type-derived overload name before the selector form is used
    pub max_overload_name_len: usize,
    pub struct_naming: StructNaming,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            require_error_selectors: false,
            max_overload_name_len: DEFAULT_MAX_OVERLOAD_NAME_LEN,
            struct_naming: StructNaming::default(),
        }
    }
}

/// Resolve every contract of a combined JSON document
///
/// Models come back ordered by source id, then contract name. Any failure
/// aborts the batch; the error names the contract that caused it.
pub fn resolve_all(schema: &CombinedJson, config: &ResolverConfig) -> Result<Vec<ContractModel>> {
    check_package_names(schema.contracts.keys())?;

    let mut models = schema
        .contracts
        .iter()
        .map(|(key, contract)| resolve_contract(key, contract, config))
        .collect::<Result<Vec<_>>>()?;

    models.sort_by(|a, b| (&a.source_id, &a.name).cmp(&(&b.source_id, &b.name)));
    tracing::info!(target: "solbind::compiler", contracts = models.len(), "resolved schema");
    Ok(models)
}

/// Two contract names that sanitize to the same package would overwrite
/// each other's output
fn check_package_names<'k>(keys: impl Iterator<Item = &'k String>) -> Result<()> {
    let mut packages: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for key in keys {
        let (_, name) = split_contract_key(key)?;
        packages.entry(sanitize_package_name(name)).or_default().push(key);
    }

    match packages.iter().find(|(_, keys)| keys.len() > 1) {
        Some((package, keys)) => Err(CompilerError::NameCollision(format!(
            "package name '{}' is shared by {}",
            package,
            keys.join(", ")
        ))),
        None => Ok(()),
    }
}

/// Resolve one `"<source>:<name>"` entry
pub fn resolve_contract(
    key: &str,
    contract: &CombinedContract,
    config: &ResolverConfig,
) -> Result<ContractModel> {
    build_model(key, contract, config).map_err(|e| e.in_contract(key))
}

fn build_model(
    key: &str,
    contract: &CombinedContract,
    config: &ResolverConfig,
) -> Result<ContractModel> {
    let (source_id, name) = split_contract_key(key)?;
    let _span = tracing::debug_span!("resolve_contract", contract = key).entered();

    let mut registry = RecordRegistry::new();
    let mut resolver = TypeResolver::with_strategy(&mut registry, config.struct_naming.strategy());

    let mut functions = Vec::new();
    let mut events = Vec::new();
    let mut errors = Vec::new();
    let mut constructor = None;

    for entry in &contract.abi {
        match entry {
            AbiEntry::Function(f) => {
                let inputs = resolver.resolve_params(&f.inputs)?;
                let outputs = resolver.resolve_params(&f.outputs)?;
                let signature = signature_of(&f.name, &inputs);
                let selector = lookup_selector(&contract.hashes, &signature)?
                    .ok_or_else(|| CompilerError::MissingSelector(signature.clone()))?;
                tracing::debug!(
                    target: "solbind::compiler",
                    %signature,
                    %selector,
                    "resolved function"
                );

                functions.push(CallableSignature {
                    name: f.name.clone(),
                    base_name: f.name.clone(),
                    signature,
                    selector,
                    inputs,
                    outputs,
                    state_mutability: f.state_mutability.clone(),
                });
            }
            AbiEntry::Error(e) => {
                let inputs = resolver.resolve_params(&e.inputs)?;
                let signature = signature_of(&e.name, &inputs);
                let selector = match lookup_selector(&contract.hashes, &signature)? {
                    Some(supplied) => supplied,
                    None if config.require_error_selectors => {
                        return Err(CompilerError::MissingSelector(signature));
                    }
                    None => selector(&signature),
                };

                errors.push(CallableSignature {
                    name: e.name.clone(),
                    base_name: e.name.clone(),
                    signature,
                    selector,
                    inputs,
                    outputs: Vec::new(),
                    state_mutability: None,
                });
            }
            AbiEntry::Event(e) => {
                let inputs = resolver.resolve_params(&e.inputs)?;
                let signature = signature_of(&e.name, &inputs);
                tracing::debug!(target: "solbind::compiler", %signature, "resolved event");
                events.push(EventSignature {
                    name: e.name.clone(),
                    base_name: e.name.clone(),
                    topic: topic(&signature),
                    signature,
                    inputs,
                    anonymous: e.anonymous,
                });
            }
            AbiEntry::Constructor(c) => {
                if constructor.is_some() {
                    return Err(CompilerError::InvalidSchema(
                        "more than one constructor declared".to_string(),
                    ));
                }
                let inputs = resolver.resolve_params(&c.inputs)?;
                constructor = Some(ConstructorSignature {
                    signature: signature_of("constructor", &inputs),
                    inputs,
                    state_mutability: c.state_mutability.clone(),
                });
            }
            AbiEntry::Fallback(_) | AbiEntry::Receive(_) => {
                tracing::trace!(target: "solbind::compiler", "skipping fallback/receive entry");
            }
        }
    }

    let max_len = config.max_overload_name_len;
    assign_names(
        &mut functions,
        "function",
        max_len,
        |f| (f.base_name.clone(), f.signature.clone(), short_hex(f.selector.as_slice())),
        |f, name| f.name = name,
    )?;
    assign_names(
        &mut errors,
        "error",
        max_len,
        |e| (e.base_name.clone(), e.signature.clone(), short_hex(e.selector.as_slice())),
        |e, name| e.name = name,
    )?;
    assign_names(
        &mut events,
        "event",
        max_len,
        |e| (e.base_name.clone(), e.signature.clone(), short_hex(e.topic.as_slice())),
        |e, name| e.name = name,
    )?;

    functions.sort_by(|a, b| (&a.name, &a.signature).cmp(&(&b.name, &b.signature)));
    errors.sort_by(|a, b| (&a.name, &a.signature).cmp(&(&b.name, &b.signature)));
    events.sort_by(|a, b| (&a.name, &a.signature).cmp(&(&b.name, &b.signature)));

    let records = registry.into_records();
    tracing::info!(
        target: "solbind::compiler",
        contract = key,
        functions = functions.len(),
        events = events.len(),
        errors = errors.len(),
        records = records.len(),
        "resolved contract"
    );

    Ok(ContractModel {
        name: name.to_string(),
        source_id: source_id.to_string(),
        package_name: sanitize_package_name(name),
        functions,
        events,
        errors,
        constructor,
        records,
        bytecode: prefixed_hex(&contract.bin),
        deployed_bytecode: prefixed_hex(&contract.bin_runtime),
        link_references: link_references(&contract.bin),
    })
}

fn signature_of(name: &str, params: &[Parameter]) -> String {
    canonical_signature(name, params.iter().map(|p| p.ty.canonical()))
}

/// Rename overloaded entries and reject any names that still clash
///
/// Entries whose base name is unique keep it. Members of an overload group
/// get a type-derived suffix, or the hex id form when that is too long.
fn assign_names<T>(
    items: &mut [T],
    kind: &str,
    max_len: usize,
    describe: impl Fn(&T) -> (String, String, String),
    rename: impl Fn(&mut T, String),
) -> Result<()> {
    let mut group_sizes: BTreeMap<String, usize> = BTreeMap::new();
    for item in items.iter() {
        *group_sizes.entry(describe(item).0).or_default() += 1;
    }

    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for item in items.iter_mut() {
        let (base, signature, id_hex) = describe(item);
        let name = if group_sizes[&base] > 1 {
            overload_name(&base, &signature, &id_hex, max_len)
        } else {
            base
        };

        if let Some(previous) = seen.insert(name.clone(), signature.clone()) {
            return Err(CompilerError::NameCollision(format!(
                "{} name '{}' is derived for both {} and {}",
                kind, name, previous, signature
            )));
        }
        rename(item, name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AbiParam, EventEntry, FunctionEntry};

    fn function(name: &str, inputs: Vec<AbiParam>) -> AbiEntry {
        AbiEntry::Function(FunctionEntry {
            name: name.to_string(),
            inputs,
            outputs: Vec::new(),
            state_mutability: Some("view".to_string()),
        })
    }

    fn contract_with(abi: Vec<AbiEntry>, hashes: &[(&str, &str)]) -> CombinedContract {
        CombinedContract {
            abi,
            bin: "6080".to_string(),
            bin_runtime: String::new(),
            hashes: hashes.iter().map(|(s, h)| (s.to_string(), h.to_string())).collect(),
        }
    }

    #[test]
    fn test_overloads_get_type_suffixes() {
        let contract = contract_with(
            vec![function("foo", vec![]), function("foo", vec![AbiParam::new("x", "uint256")])],
            &[("foo()", "c2985578"), ("foo(uint256)", "2fbebd38")],
        );
        let model = resolve_contract("c.sol:C", &contract, &ResolverConfig::default()).unwrap();

        let names: Vec<&str> = model.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["foo_NoArgs", "foo_Uint256"]);
        assert!(model.functions.iter().all(|f| f.base_name == "foo"));
        assert_eq!(model.bytecode, "0x6080");
        assert_eq!(model.package_name, "c");
    }

    #[test]
    fn test_missing_function_selector() {
        let contract = contract_with(vec![function("foo", vec![])], &[]);
        let err = resolve_contract("c.sol:C", &contract, &ResolverConfig::default()).unwrap_err();
        assert!(matches!(err.root(), CompilerError::MissingSelector(sig) if sig == "foo()"));
        assert!(err.to_string().contains("c.sol:C"));
    }

    #[test]
    fn test_error_selector_computed_unless_required() {
        let abi = vec![AbiEntry::Error(crate::schema::ErrorEntry {
            name: "InsufficientBalance".to_string(),
            inputs: vec![AbiParam::new("have", "uint256"), AbiParam::new("want", "uint256")],
        })];
        let contract = contract_with(abi, &[]);

        let model = resolve_contract("c.sol:C", &contract, &ResolverConfig::default()).unwrap();
        assert_eq!(hex::encode(model.errors[0].selector), "cf479181");

        let strict = ResolverConfig { require_error_selectors: true, ..Default::default() };
        let err = resolve_contract("c.sol:C", &contract, &strict).unwrap_err();
        assert!(matches!(err.root(), CompilerError::MissingSelector(_)));
    }

    #[test]
    fn test_overloaded_events_use_topic_prefix_fallback() {
        let event = |inputs| {
            AbiEntry::Event(EventEntry { name: "Log".to_string(), inputs, anonymous: false })
        };
        let contract = contract_with(
            vec![event(vec![]), event(vec![AbiParam::new("v", "uint256")])],
            &[],
        );
        let config = ResolverConfig { max_overload_name_len: 5, ..Default::default() };
        let model = resolve_contract("c.sol:C", &contract, &config).unwrap();

        let names: Vec<&str> = model.events.iter().map(|e| e.name.as_str()).collect();
        let with_arg = model.events.iter().find(|e| !e.inputs.is_empty()).unwrap();
        assert!(names.contains(&"Log_NoArgs"));
        assert!(names.contains(&format!("Log__{}", short_hex(with_arg.topic.as_slice())).as_str()));
    }

    #[test]
    fn test_duplicate_signature_collides() {
        let contract = contract_with(
            vec![function("foo", vec![]), function("foo", vec![])],
            &[("foo()", "c2985578")],
        );
        let err = resolve_contract("c.sol:C", &contract, &ResolverConfig::default()).unwrap_err();
        assert!(matches!(err.root(), CompilerError::NameCollision(_)));
    }

    #[test]
    fn test_package_collision_aborts_batch() {
        let mut schema = CombinedJson::default();
        schema.contracts.insert("a.sol:MyToken".to_string(), contract_with(vec![], &[]));
        schema.contracts.insert("b.sol:My_Token".to_string(), contract_with(vec![], &[]));

        let err = resolve_all(&schema, &ResolverConfig::default()).unwrap_err();
        assert!(matches!(err, CompilerError::NameCollision(msg) if msg.contains("mytoken")));
    }

    #[test]
    fn test_second_constructor_rejected() {
        let ctor = || {
            AbiEntry::Constructor(crate::schema::ConstructorEntry {
                inputs: vec![],
                state_mutability: None,
            })
        };
        let contract = contract_with(vec![ctor(), ctor()], &[]);
        let err = resolve_contract("c.sol:C", &contract, &ResolverConfig::default()).unwrap_err();
        assert!(matches!(err.root(), CompilerError::InvalidSchema(_)));
    }
}
