//! Resolved contract model
//!
//! A [`ContractModel`] is everything a code emitter needs for one contract:
//! disambiguated callables with their selectors, events with their topics,
//! the optional constructor, and the record definitions they reference.
//! The signature types also carry the encode/decode operations generated
//! bindings delegate to.

use alloy_primitives::{Selector, B256};
use serde::Serialize;
use solbind_runtime::{
    decode, decode_params, encode_params, encode_with_selector, AbiType, AbiValue, CodecError,
    ParamSlot, RecordRef,
};

use crate::error::{CompilerError, Result};
use crate::schema::LinkReference;

type CodecResult<T> = solbind_runtime::Result<T>;

fn must<T>(result: CodecResult<T>) -> T {
    result.unwrap_or_else(|err| panic!("ABI decode failed: {}", err))
}

/// A named, typed parameter of a function, event, error or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbiType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self { name: name.into(), ty, indexed: false }
    }
}

impl ParamSlot for Parameter {
    fn slot_name(&self) -> &str {
        &self.name
    }

    fn slot_type(&self) -> &AbiType {
        &self.ty
    }
}

/// A function or custom error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableSignature {
    /// Disambiguated name, unique among callables of the same kind
    pub name: String,
    /// Name as declared in the ABI
    pub base_name: String,
    pub signature: String,
    pub selector: Selector,
    pub inputs: Vec<Parameter>,
    /// Always empty for errors
    pub outputs: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

impl CallableSignature {
    /// Selector followed by the encoded inputs
    pub fn encode_call(&self, values: &[AbiValue]) -> CodecResult<Vec<u8>> {
        encode_with_selector(self.selector.0, &self.inputs, values)
    }

    /// Check the selector prefix and decode the inputs behind it
    pub fn decode_call(&self, data: &[u8]) -> CodecResult<Vec<AbiValue>> {
        let body = self.strip_selector(data)?;
        decode_params(&self.inputs, body)
    }

    pub fn must_decode_call(&self, data: &[u8]) -> Vec<AbiValue> {
        must(self.decode_call(data))
    }

    /// Encode return values, without a selector
    pub fn encode_output(&self, values: &[AbiValue]) -> CodecResult<Vec<u8>> {
        encode_params(&self.outputs, values)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> CodecResult<Vec<AbiValue>> {
        decode_params(&self.outputs, data)
    }

    pub fn must_decode_output(&self, data: &[u8]) -> Vec<AbiValue> {
        must(self.decode_output(data))
    }

    /// Decode revert data raised by this error
    pub fn decode_revert(&self, data: &[u8]) -> CodecResult<Vec<AbiValue>> {
        self.decode_call(data)
    }

    pub fn must_decode_revert(&self, data: &[u8]) -> Vec<AbiValue> {
        must(self.decode_revert(data))
    }

    fn strip_selector<'d>(&self, data: &'d [u8]) -> CodecResult<&'d [u8]> {
        if data.len() < 4 {
            return Err(CodecError::insufficient_data("selector", 4, data.len()));
        }
        let (prefix, body) = data.split_at(4);
        if prefix != self.selector.as_slice() {
            return Err(CodecError::invalid_encoding(
                "selector",
                format!("expected 0x{}, found 0x{}", hex::encode(self.selector), hex::encode(prefix)),
            ));
        }
        Ok(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSignature {
    pub name: String,
    pub base_name: String,
    pub signature: String,
    pub topic: B256,
    pub inputs: Vec<Parameter>,
    pub anonymous: bool,
}

impl EventSignature {
    /// Topics a matching log must carry
    pub fn topic_count(&self) -> usize {
        self.inputs.iter().filter(|p| p.indexed).count() + usize::from(!self.anonymous)
    }

    /// Decode a log into values in declaration order
    ///
    /// Indexed value types are read back from their topic word. Indexed
    /// strings, bytes, arrays and tuples only survive as their Keccak-256
    /// hash, which is returned as [`AbiValue::Hash`].
    pub fn decode_log(&self, topics: &[B256], data: &[u8]) -> CodecResult<Vec<AbiValue>> {
        let expected = self.topic_count();
        if topics.len() < expected {
            return Err(CodecError::insufficient_data("topics", expected, topics.len()));
        }
        if topics.len() > expected {
            return Err(CodecError::invalid_encoding(
                "topics",
                format!("expected {} topics, found {}", expected, topics.len()),
            ));
        }

        let mut topics = topics.iter();
        if !self.anonymous {
            if let Some(first) = topics.next() {
                if *first != self.topic {
                    return Err(CodecError::invalid_encoding(
                        "topic0",
                        format!("expected {}, found {}", self.topic, first),
                    ));
                }
            }
        }

        let unindexed: Vec<&Parameter> = self.inputs.iter().filter(|p| !p.indexed).collect();
        let mut body = decode_params(&unindexed, data)?.into_iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                let word = topics
                    .next()
                    .ok_or_else(|| CodecError::insufficient_data("topics", expected, expected - 1))?;
                decode_topic(&param.ty, word)?
            } else {
                body.next().ok_or_else(|| {
                    CodecError::invalid_encoding(param.name.clone(), "missing from log data")
                })?
            };
            values.push(value);
        }
        Ok(values)
    }

    pub fn must_decode_log(&self, topics: &[B256], data: &[u8]) -> Vec<AbiValue> {
        must(self.decode_log(topics, data))
    }
}

fn decode_topic(ty: &AbiType, word: &B256) -> CodecResult<AbiValue> {
    let hashed = ty.is_dynamic() || matches!(ty, AbiType::Tuple(_) | AbiType::FixedArray(..));
    if hashed {
        return Ok(AbiValue::Hash(*word));
    }
    decode(ty, word.as_slice(), 0).map(|(value, _)| value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorSignature {
    /// `constructor(t1,t2,...)`
    pub signature: String,
    pub inputs: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

impl ConstructorSignature {
    /// Creation bytecode followed by the encoded constructor arguments
    pub fn encode_deploy(&self, bytecode: &[u8], values: &[AbiValue]) -> CodecResult<Vec<u8>> {
        let args = encode_params(&self.inputs, values)?;
        let mut out = Vec::with_capacity(bytecode.len() + args.len());
        out.extend_from_slice(bytecode);
        out.extend_from_slice(&args);
        Ok(out)
    }
}

/// Everything resolved for one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractModel {
    pub name: String,
    /// Source path half of the `"<source>:<name>"` key
    pub source_id: String,
    pub package_name: String,
    pub functions: Vec<CallableSignature>,
    pub events: Vec<EventSignature>,
    pub errors: Vec<CallableSignature>,
    pub constructor: Option<ConstructorSignature>,
    /// Named record definitions in name order
    pub records: Vec<RecordRef>,
    /// `0x`-prefixed creation bytecode, empty for abstract contracts
    pub bytecode: String,
    pub deployed_bytecode: String,
    pub link_references: Vec<LinkReference>,
}

impl ContractModel {
    /// The `"<source>:<name>"` key this model was resolved from
    pub fn key(&self) -> String {
        format!("{}:{}", self.source_id, self.name)
    }

    /// Function by disambiguated name
    pub fn function(&self, name: &str) -> Option<&CallableSignature> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// All overloads sharing a declared name
    pub fn overloads<'m>(&'m self, base_name: &'m str) -> impl Iterator<Item = &'m CallableSignature> {
        self.functions.iter().filter(move |f| f.base_name == base_name)
    }

    pub fn function_by_selector(&self, selector: Selector) -> Option<&CallableSignature> {
        self.functions.iter().find(|f| f.selector == selector)
    }

    pub fn event(&self, name: &str) -> Option<&EventSignature> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn event_by_topic(&self, topic: &B256) -> Option<&EventSignature> {
        self.events.iter().find(|e| !e.anonymous && e.topic == *topic)
    }

    pub fn error(&self, name: &str) -> Option<&CallableSignature> {
        self.errors.iter().find(|e| e.name == name)
    }

    pub fn error_by_selector(&self, selector: Selector) -> Option<&CallableSignature> {
        self.errors.iter().find(|e| e.selector == selector)
    }

    pub fn record(&self, name: &str) -> Option<&RecordRef> {
        self.records.iter().find(|r| r.name() == name)
    }

    /// Decode revert data against whichever declared error matches its selector
    pub fn decode_error(&self, data: &[u8]) -> CodecResult<(&CallableSignature, Vec<AbiValue>)> {
        let prefix = data
            .get(..4)
            .ok_or_else(|| CodecError::insufficient_data("selector", 4, data.len()))?;
        let error = self.error_by_selector(Selector::from_slice(prefix)).ok_or_else(|| {
            CodecError::invalid_encoding(
                "selector",
                format!("0x{} matches no error of {}", hex::encode(prefix), self.name),
            )
        })?;
        Ok((error, error.decode_revert(data)?))
    }

    /// Decode a log against whichever declared event matches its first topic
    pub fn decode_event(
        &self,
        topics: &[B256],
        data: &[u8],
    ) -> CodecResult<(&EventSignature, Vec<AbiValue>)> {
        let first = topics.first().ok_or_else(|| CodecError::insufficient_data("topics", 1, 0))?;
        let event = self.event_by_topic(first).ok_or_else(|| {
            CodecError::invalid_encoding(
                "topic0",
                format!("{} matches no event of {}", first, self.name),
            )
        })?;
        Ok((event, event.decode_log(topics, data)?))
    }

    /// Deployment payload: linked creation bytecode plus constructor arguments
    pub fn encode_deploy(&self, values: &[AbiValue]) -> Result<Vec<u8>> {
        if self.bytecode.is_empty() {
            return Err(CompilerError::InvalidSchema(format!(
                "{} has no creation bytecode",
                self.name
            )));
        }
        if !self.link_references.is_empty() {
            return Err(CompilerError::InvalidSchema(format!(
                "{} has {} unlinked library reference(s)",
                self.name,
                self.link_references.len()
            )));
        }

        let hex_code = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        let code = hex::decode(hex_code).map_err(|e| {
            CompilerError::InvalidSchema(format!("{} bytecode is not hex: {}", self.name, e))
        })?;

        let encoded = match &self.constructor {
            Some(constructor) => constructor.encode_deploy(&code, values)?,
            None => {
                let mut out = code;
                out.extend(encode_params::<Parameter>(&[], values)?);
                out
            }
        };
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{selector, topic};
    use solbind_runtime::{Address, U256};

    fn transfer() -> CallableSignature {
        CallableSignature {
            name: "transfer".to_string(),
            base_name: "transfer".to_string(),
            signature: "transfer(address,uint256)".to_string(),
            selector: selector("transfer(address,uint256)"),
            inputs: vec![
                Parameter::new("to", AbiType::Address),
                Parameter::new("amount", AbiType::Uint(256)),
            ],
            outputs: vec![Parameter::new("Field1", AbiType::Bool)],
            state_mutability: Some("nonpayable".to_string()),
        }
    }

    fn transfer_event() -> EventSignature {
        let indexed = |name: &str| Parameter { indexed: true, ..Parameter::new(name, AbiType::Address) };
        EventSignature {
            name: "Transfer".to_string(),
            base_name: "Transfer".to_string(),
            signature: "Transfer(address,address,uint256)".to_string(),
            topic: topic("Transfer(address,address,uint256)"),
            inputs: vec![indexed("from"), indexed("to"), Parameter::new("value", AbiType::Uint(256))],
            anonymous: false,
        }
    }

    fn address_topic(address: Address) -> B256 {
        address.into_word()
    }

    #[test]
    fn test_call_round_trip() {
        let f = transfer();
        let values = vec![AbiValue::Address(Address::repeat_byte(0x11)), AbiValue::from(5u64)];
        let data = f.encode_call(&values).unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(f.decode_call(&data).unwrap(), values);
    }

    #[test]
    fn test_decode_call_checks_selector() {
        let f = transfer();
        let mut data = f.encode_call(&[AbiValue::Address(Address::ZERO), AbiValue::from(1u64)]).unwrap();
        data[0] ^= 0xff;
        assert!(matches!(f.decode_call(&data), Err(CodecError::InvalidEncoding { .. })));
        assert!(matches!(f.decode_call(&data[..3]), Err(CodecError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_output() {
        let f = transfer();
        let mut word = [0u8; 32];
        word[31] = 1;
        assert_eq!(f.must_decode_output(&word), vec![AbiValue::Bool(true)]);
        assert!(f.decode_output(&word[..31]).is_err());
    }

    #[test]
    #[should_panic(expected = "ABI decode failed")]
    fn test_must_decode_output_panics() {
        transfer().must_decode_output(&[0u8; 8]);
    }

    #[test]
    fn test_decode_log() {
        let event = transfer_event();
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let data = encode_params(&[AbiType::Uint(256)], &[AbiValue::from(1000u64)]).unwrap();
        let topics = [event.topic, address_topic(from), address_topic(to)];

        let values = event.decode_log(&topics, &data).unwrap();
        assert_eq!(
            values,
            vec![AbiValue::Address(from), AbiValue::Address(to), AbiValue::Uint(U256::from(1000u64))]
        );
    }

    #[test]
    fn test_decode_log_topic_errors() {
        let event = transfer_event();
        let data = encode_params(&[AbiType::Uint(256)], &[AbiValue::from(1u64)]).unwrap();

        let short = [event.topic, B256::ZERO];
        assert!(matches!(event.decode_log(&short, &data), Err(CodecError::InsufficientData { .. })));

        let wrong = [B256::ZERO, B256::ZERO, B256::ZERO];
        assert!(matches!(event.decode_log(&wrong, &data), Err(CodecError::InvalidEncoding { .. })));

        let extra = [event.topic, B256::ZERO, B256::ZERO, B256::ZERO];
        assert!(matches!(event.decode_log(&extra, &data), Err(CodecError::InvalidEncoding { .. })));
    }

    #[test]
    fn test_indexed_dynamic_is_hash() {
        let event = EventSignature {
            name: "Named".to_string(),
            base_name: "Named".to_string(),
            signature: "Named(string)".to_string(),
            topic: topic("Named(string)"),
            inputs: vec![Parameter { indexed: true, ..Parameter::new("label", AbiType::String) }],
            anonymous: false,
        };
        let hashed = topic("alice");
        let values = event.decode_log(&[event.topic, hashed], &[]).unwrap();
        assert_eq!(values, vec![AbiValue::Hash(hashed)]);
    }

    #[test]
    fn test_anonymous_event_has_no_topic0() {
        let mut event = transfer_event();
        event.anonymous = true;
        assert_eq!(event.topic_count(), 2);

        let from = Address::repeat_byte(1);
        let to = Address::repeat_byte(2);
        let data = encode_params(&[AbiType::Uint(256)], &[AbiValue::from(7u64)]).unwrap();
        let values = event.decode_log(&[address_topic(from), address_topic(to)], &data).unwrap();
        assert_eq!(values[0], AbiValue::Address(from));
    }

    #[test]
    fn test_encode_deploy_appends_args() {
        let constructor = ConstructorSignature {
            signature: "constructor(uint256)".to_string(),
            inputs: vec![Parameter::new("supply", AbiType::Uint(256))],
            state_mutability: None,
        };
        let out = constructor.encode_deploy(&[0x60, 0x80], &[AbiValue::from(3u64)]).unwrap();
        assert_eq!(out.len(), 2 + 32);
        assert_eq!(&out[..2], &[0x60, 0x80]);
        assert_eq!(out[33], 3);
    }
}
