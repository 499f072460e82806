//! ABI decoding
//!
//! Decoding walks the same head/tail layout as [`encode`](crate::encode).
//! Every read is bounds-checked and every fixed-width slot has its padding
//! validated, so malformed input surfaces as a [`CodecError`] instead of a
//! truncated value.
//!
//! Each fallible entry point has a `must_` twin for callers that already
//! trust their input; those convert a decode error into a panic.

use crate::error::{CodecError, Result};
use crate::path::{Path, Segment};
use crate::types::{is_valid_int_width, AbiType, ParamSlot, WORD};
use crate::value::AbiValue;
use alloy_primitives::{Address, B256, I256, U256};

/// Decodes one value whose encoding starts at `offset`
///
/// Returns the value and the position just past its encoding, so sibling
/// values can be decoded sequentially.
pub fn decode(ty: &AbiType, data: &[u8], offset: usize) -> Result<(AbiValue, usize)> {
    Decoder { data }.value(ty, offset, &Path::root("value"))
}

/// Aborting form of [`decode`]
pub fn must_decode(ty: &AbiType, data: &[u8], offset: usize) -> (AbiValue, usize) {
    decode(ty, data, offset).unwrap_or_else(|err| panic!("ABI decode failed: {}", err))
}

/// Decodes a head/tail encoded parameter list starting at the beginning of `data`
pub fn decode_params<S: ParamSlot>(params: &[S], data: &[u8]) -> Result<Vec<AbiValue>> {
    decode_params_at(params, data, 0).map(|(values, _)| values)
}

/// Aborting form of [`decode_params`]
pub fn must_decode_params<S: ParamSlot>(params: &[S], data: &[u8]) -> Vec<AbiValue> {
    decode_params(params, data).unwrap_or_else(|err| panic!("ABI decode failed: {}", err))
}

/// Decodes a parameter list whose head starts at `offset`
///
/// Offsets stored in dynamic slots are relative to `offset`. The returned
/// position is the end of the furthest byte consumed.
pub fn decode_params_at<S: ParamSlot>(
    params: &[S],
    data: &[u8],
    offset: usize,
) -> Result<(Vec<AbiValue>, usize)> {
    Decoder { data }.sequence(
        params.len(),
        |i| (params[i].slot_type(), Segment::named_or_index(params[i].slot_name(), i)),
        offset,
        None,
    )
}

struct Decoder<'d> {
    data: &'d [u8],
}

impl<'d> Decoder<'d> {
    fn word(&self, at: usize, path: &Path<'_>) -> Result<&'d [u8; WORD]> {
        let end = at
            .checked_add(WORD)
            .ok_or_else(|| CodecError::invalid_encoding(path.to_string(), "offset overflow"))?;
        self.data
            .get(at..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| CodecError::insufficient_data(path.to_string(), end, self.data.len()))
    }

    /// Reads a length or offset word, which must fit in a usize
    fn read_usize(&self, at: usize, path: &Path<'_>) -> Result<usize> {
        let word = self.word(at, path)?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(CodecError::invalid_encoding(path.to_string(), "length or offset too large"));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[WORD - 8..]);
        usize::try_from(u64::from_be_bytes(low))
            .map_err(|_| CodecError::invalid_encoding(path.to_string(), "length or offset too large"))
    }

    fn value(&self, ty: &AbiType, offset: usize, path: &Path<'_>) -> Result<(AbiValue, usize)> {
        let value = match ty {
            AbiType::Bool => AbiValue::Bool(decode_bool(self.word(offset, path)?)),
            AbiType::Uint(bits) => AbiValue::Uint(decode_uint(self.word(offset, path)?, *bits, path)?),
            AbiType::Int(bits) => AbiValue::Int(decode_int(self.word(offset, path)?, *bits, path)?),
            AbiType::Address => {
                let word = self.word(offset, path)?;
                check_zero(&word[..WORD - 20], path, "address padding is not zero")?;
                AbiValue::Address(Address::from_slice(&word[WORD - 20..]))
            }
            AbiType::Hash32 => AbiValue::Hash(B256::from(*self.word(offset, path)?)),
            AbiType::FixedBytes(size) => {
                if !(1..=WORD).contains(size) {
                    return Err(CodecError::invalid_encoding(
                        path.to_string(),
                        format!("bytes{} is not a valid fixed bytes type", size),
                    ));
                }
                let word = self.word(offset, path)?;
                check_zero(&word[*size..], path, "fixed bytes padding is not zero")?;
                AbiValue::FixedBytes(word[..*size].to_vec())
            }
            AbiType::Bytes => {
                let (bytes, next) = self.dynamic_bytes(offset, path)?;
                return Ok((AbiValue::Bytes(bytes.to_vec()), next));
            }
            AbiType::String => {
                let (bytes, next) = self.dynamic_bytes(offset, path)?;
                let s = std::str::from_utf8(bytes).map_err(|e| {
                    CodecError::invalid_encoding(path.to_string(), format!("invalid UTF-8: {}", e))
                })?;
                return Ok((AbiValue::String(s.to_string()), next));
            }
            AbiType::Array(elem) => {
                let len = self.read_usize(offset, path)?;
                let body = offset + WORD;
                self.check_array_fits(len, elem, body, path)?;
                let (items, next) =
                    self.sequence(len, |i| (elem.as_ref(), Segment::Index(i)), body, Some(path))?;
                return Ok((AbiValue::Array(items), next));
            }
            AbiType::FixedArray(elem, len) => {
                let (items, next) =
                    self.sequence(*len, |i| (elem.as_ref(), Segment::Index(i)), offset, Some(path))?;
                return Ok((AbiValue::FixedArray(items), next));
            }
            AbiType::Tuple(record) => {
                let fields = record.fields();
                let (items, next) = self.sequence(
                    fields.len(),
                    |i| (&fields[i].ty, Segment::named_or_index(&fields[i].name, i)),
                    offset,
                    Some(path),
                )?;
                return Ok((AbiValue::Tuple(items), next));
            }
        };
        Ok((value, offset + WORD))
    }

    /// Decodes `len` entries laid out head/tail from `base`
    ///
    /// Static entries advance the head cursor by their inline width; dynamic
    /// entries advance it by one pointer slot regardless of payload size.
    fn sequence<'t, F>(
        &self,
        len: usize,
        slot: F,
        base: usize,
        parent: Option<&Path<'_>>,
    ) -> Result<(Vec<AbiValue>, usize)>
    where
        F: Fn(usize) -> (&'t AbiType, Segment<'t>),
    {
        let mut values = Vec::with_capacity(len);
        let mut cursor = base;
        let mut end = base;

        for i in 0..len {
            let (ty, segment) = slot(i);
            let path = Path::new(parent, segment);

            if ty.is_dynamic() {
                let pointer = self.read_usize(cursor, &path)?;
                let at = base.checked_add(pointer).ok_or_else(|| {
                    CodecError::invalid_encoding(path.to_string(), "offset overflow")
                })?;
                let (value, value_end) = self.value(ty, at, &path)?;
                end = end.max(value_end);
                values.push(value);
                cursor += WORD;
            } else {
                let (value, next) = self.value(ty, cursor, &path)?;
                values.push(value);
                cursor = next;
            }
        }

        Ok((values, end.max(cursor)))
    }

    fn dynamic_bytes(&self, offset: usize, path: &Path<'_>) -> Result<(&'d [u8], usize)> {
        let len = self.read_usize(offset, path)?;
        let start = offset + WORD;
        let padded = len
            .checked_next_multiple_of(WORD)
            .and_then(|p| start.checked_add(p))
            .ok_or_else(|| CodecError::invalid_encoding(path.to_string(), "length overflow"))?;
        if padded > self.data.len() {
            return Err(CodecError::insufficient_data(path.to_string(), padded, self.data.len()));
        }
        Ok((&self.data[start..start + len], padded))
    }

    /// Rejects array lengths whose heads cannot possibly fit in the buffer
    /// before allocating for them.
    fn check_array_fits(&self, len: usize, elem: &AbiType, body: usize, path: &Path<'_>) -> Result<()> {
        let needed = len
            .checked_mul(elem.head_size().max(1))
            .and_then(|n| n.checked_add(body))
            .ok_or_else(|| CodecError::invalid_encoding(path.to_string(), "array length overflow"))?;
        if needed > self.data.len() {
            return Err(CodecError::insufficient_data(path.to_string(), needed, self.data.len()));
        }
        Ok(())
    }
}

fn check_zero(bytes: &[u8], path: &Path<'_>, reason: &str) -> Result<()> {
    if bytes.iter().any(|b| *b != 0) {
        return Err(CodecError::invalid_encoding(path.to_string(), reason));
    }
    Ok(())
}

/// A bool occupies a full word; any nonzero word reads as `true`
fn decode_bool(word: &[u8; WORD]) -> bool {
    word.iter().any(|b| *b != 0)
}

/// Widths a hand-built [`AbiType`] may carry but the wire format cannot
fn check_int_width(bits: usize, prefix: &str, path: &Path<'_>) -> Result<()> {
    if !is_valid_int_width(bits) {
        return Err(CodecError::invalid_encoding(
            path.to_string(),
            format!("{}{} is not a valid integer type", prefix, bits),
        ));
    }
    Ok(())
}

fn decode_uint(word: &[u8; WORD], bits: usize, path: &Path<'_>) -> Result<U256> {
    check_int_width(bits, "uint", path)?;
    let padding = WORD - bits / 8;
    if word[..padding].iter().any(|b| *b != 0) {
        return Err(CodecError::invalid_encoding(
            path.to_string(),
            format!("non-zero bytes above uint{} width", bits),
        ));
    }
    Ok(U256::from_be_bytes(*word))
}

/// Bytes above the declared width must sign-extend the value: `0x00` for
/// non-negative values and `0xFF` for negative ones.
fn decode_int(word: &[u8; WORD], bits: usize, path: &Path<'_>) -> Result<I256> {
    check_int_width(bits, "int", path)?;
    let padding = WORD - bits / 8;
    let negative = word[padding] & 0x80 != 0;
    let fill = if negative { 0xff } else { 0x00 };
    if word[..padding].iter().any(|b| *b != fill) {
        return Err(CodecError::invalid_encoding(
            path.to_string(),
            format!("bytes above int{} width are not a sign extension", bits),
        ));
    }
    Ok(I256::from_raw(U256::from_be_bytes(*word)))
}
