//! ABI encoding
//!
//! Every parameter list, array body and dynamic tuple is laid out the same
//! way: a head region with one inline slot per entry, followed by a tail
//! region holding the payloads of dynamic entries. The head slot of a
//! dynamic entry carries the byte offset of its payload, measured from the
//! start of the enclosing list.

use crate::error::{CodecError, Result};
use crate::path::{Path, Segment};
use crate::types::{is_valid_int_width, AbiType, ParamSlot, WORD};
use crate::value::AbiValue;
use alloy_primitives::{I256, U256};

/// Encodes a single value on its own
///
/// Static types produce their inline head bytes; dynamic types produce the
/// payload that would sit in a tail region.
pub fn encode(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ty.head_size());
    encode_value(ty, value, &Path::root("value"), &mut out)?;
    Ok(out)
}

/// Encodes a parameter list with the head/tail layout
pub fn encode_params<S: ParamSlot>(params: &[S], values: &[AbiValue]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_sequence(
        params.len(),
        |i| (params[i].slot_type(), Segment::named_or_index(params[i].slot_name(), i)),
        values,
        None,
        &mut out,
    )?;
    Ok(out)
}

/// Encodes a parameter list prefixed with a 4-byte selector
pub fn encode_with_selector<S: ParamSlot>(
    selector: [u8; 4],
    params: &[S],
    values: &[AbiValue],
) -> Result<Vec<u8>> {
    let body = encode_params(params, values)?;
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Encodes a length or offset as a 32-byte big-endian word
pub fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn encode_sequence<'t, F>(
    len: usize,
    slot: F,
    values: &[AbiValue],
    parent: Option<&Path<'_>>,
    out: &mut Vec<u8>,
) -> Result<()>
where
    F: Fn(usize) -> (&'t AbiType, Segment<'t>),
{
    if values.len() != len {
        let field = parent.map_or_else(|| "parameters".to_string(), |p| p.to_string());
        return Err(CodecError::type_mismatch(
            field,
            format!("{} values", len),
            format!("{} values", values.len()),
        ));
    }

    let head_len: usize = (0..len).map(|i| slot(i).0.head_size()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    let mut tail_offset = head_len;

    for (i, value) in values.iter().enumerate() {
        let (ty, segment) = slot(i);
        let path = Path::new(parent, segment);

        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(tail_offset));
            let mut scratch = Vec::new();
            encode_value(ty, value, &path, &mut scratch)?;
            tail_offset += scratch.len();
            tail.extend_from_slice(&scratch);
        } else {
            encode_value(ty, value, &path, &mut head)?;
        }
    }

    out.reserve(head.len() + tail.len());
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

fn encode_value(ty: &AbiType, value: &AbiValue, path: &Path<'_>, out: &mut Vec<u8>) -> Result<()> {
    match (ty, value) {
        (AbiType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = u8::from(*b);
            out.extend_from_slice(&word);
        }
        (AbiType::Uint(bits), AbiValue::Uint(v)) => out.extend_from_slice(&encode_uint(*bits, *v)?),
        (AbiType::Uint(bits), AbiValue::Int(v)) => {
            if v.is_negative() {
                return Err(CodecError::out_of_range(
                    ty.canonical(),
                    format!("negative value {} for unsigned type", v),
                ));
            }
            out.extend_from_slice(&encode_uint(*bits, v.into_raw())?);
        }
        (AbiType::Int(bits), AbiValue::Int(v)) => out.extend_from_slice(&encode_int(*bits, *v)?),
        (AbiType::Int(bits), AbiValue::Uint(v)) => {
            if v.bit_len() >= 256 {
                return Err(CodecError::out_of_range(
                    ty.canonical(),
                    format!("{} does not fit a signed 256-bit integer", v),
                ));
            }
            out.extend_from_slice(&encode_int(*bits, I256::from_raw(*v))?);
        }
        (AbiType::Address, AbiValue::Address(addr)) => {
            let mut word = [0u8; WORD];
            word[WORD - 20..].copy_from_slice(addr.as_slice());
            out.extend_from_slice(&word);
        }
        (AbiType::Hash32, AbiValue::Hash(hash)) | (AbiType::FixedBytes(32), AbiValue::Hash(hash)) => {
            out.extend_from_slice(hash.as_slice());
        }
        (AbiType::Hash32, AbiValue::FixedBytes(bytes)) => {
            out.extend_from_slice(&encode_fixed_bytes(WORD, bytes)?);
        }
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(bytes)) => {
            out.extend_from_slice(&encode_fixed_bytes(*n, bytes)?);
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => encode_dynamic_bytes(bytes, out),
        (AbiType::String, AbiValue::String(s)) => encode_dynamic_bytes(s.as_bytes(), out),
        (AbiType::Array(elem), AbiValue::Array(items)) => {
            out.extend_from_slice(&usize_word(items.len()));
            encode_sequence(items.len(), |i| (elem.as_ref(), Segment::Index(i)), items, Some(path), out)?;
        }
        (AbiType::FixedArray(elem, len), AbiValue::FixedArray(items)) => {
            encode_sequence(*len, |i| (elem.as_ref(), Segment::Index(i)), items, Some(path), out)?;
        }
        (AbiType::Tuple(record), AbiValue::Tuple(items)) => {
            let fields = record.fields();
            encode_sequence(
                fields.len(),
                |i| (&fields[i].ty, Segment::named_or_index(&fields[i].name, i)),
                items,
                Some(path),
                out,
            )?;
        }
        (ty, value) => {
            return Err(CodecError::type_mismatch(path.to_string(), ty.canonical(), value.kind()));
        }
    }
    Ok(())
}

fn check_int_width(ty: &str, bits: usize) -> Result<()> {
    if !is_valid_int_width(bits) {
        return Err(CodecError::out_of_range(
            format!("{}{}", ty, bits),
            "width must be a multiple of 8 between 8 and 256",
        ));
    }
    Ok(())
}

fn encode_uint(bits: usize, value: U256) -> Result<[u8; WORD]> {
    check_int_width("uint", bits)?;
    if value.bit_len() > bits {
        return Err(CodecError::out_of_range(
            format!("uint{}", bits),
            format!("{} needs {} bits", value, value.bit_len()),
        ));
    }
    Ok(value.to_be_bytes::<WORD>())
}

/// Two's-complement encoding; the raw 256-bit pattern of a negative value is
/// already `2^256 + value`.
fn encode_int(bits: usize, value: I256) -> Result<[u8; WORD]> {
    check_int_width("int", bits)?;
    let raw = value.into_raw();
    let magnitude_bits = if value.is_negative() { (!raw).bit_len() } else { raw.bit_len() };
    if magnitude_bits >= bits {
        return Err(CodecError::out_of_range(
            format!("int{}", bits),
            format!("{} does not fit in {} bits", value, bits),
        ));
    }
    Ok(raw.to_be_bytes::<WORD>())
}

/// Fixed bytes are left-aligned, unlike numbers
fn encode_fixed_bytes(size: usize, bytes: &[u8]) -> Result<[u8; WORD]> {
    if !(1..=WORD).contains(&size) {
        return Err(CodecError::out_of_range(
            format!("bytes{}", size),
            "size must be between 1 and 32",
        ));
    }
    if bytes.len() != size {
        return Err(CodecError::out_of_range(
            format!("bytes{}", size),
            format!("expected {} bytes, got {}", size, bytes.len()),
        ));
    }
    let mut word = [0u8; WORD];
    word[..size].copy_from_slice(bytes);
    Ok(word)
}

fn encode_dynamic_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    let padding = (WORD - bytes.len() % WORD) % WORD;
    out.resize(out.len() + padding, 0);
}
