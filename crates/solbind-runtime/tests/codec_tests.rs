//! Integration tests for the ABI codec

use solbind_runtime::{
    decode, decode_params, decode_params_at, encode, encode_params, encode_with_selector,
    must_decode_params, AbiType, AbiValue, Address, CodecError, RecordDef, RecordField, I256,
    U256, WORD,
};

fn user_record() -> solbind_runtime::RecordRef {
    RecordDef::new(
        "User",
        vec![
            RecordField::new("id", AbiType::Uint(256)),
            RecordField::new("wallet", AbiType::Address),
            RecordField::new("active", AbiType::Bool),
        ],
    )
    .into_ref()
}

fn wallet(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

// ============================================================================
// CALL DATA SCENARIOS
// ============================================================================

#[test]
fn test_transfer_call_layout() {
    let params = [
        RecordField::new("to", AbiType::Address),
        RecordField::new("amount", AbiType::Uint(256)),
    ];
    let to: Address = "0x742d35cc6634c0532925a3b844bc9e7595f0c842".parse().unwrap();
    let amount = U256::from(1_000_000_000_000_000_000u64);

    let data = encode_with_selector(
        [0xa9, 0x05, 0x9c, 0xbb],
        &params,
        &[AbiValue::Address(to), AbiValue::Uint(amount)],
    )
    .unwrap();

    assert_eq!(data.len(), 4 + 2 * WORD);
    assert_eq!(hex::encode(&data[..4]), "a9059cbb");
    assert!(data[4..16].iter().all(|b| *b == 0));
    assert_eq!(&data[16..36], to.as_slice());
    assert_eq!(
        hex::encode(&data[36..]),
        "0000000000000000000000000000000000000000000000000de0b6b3a7640000"
    );
}

#[test]
fn test_struct_array_two_elements() {
    let params = [RecordField::new("users", AbiType::array(AbiType::Tuple(user_record())))];
    let users = AbiValue::Array(vec![
        AbiValue::Tuple(vec![AbiValue::from(1u64), AbiValue::Address(wallet(0x11)), true.into()]),
        AbiValue::Tuple(vec![AbiValue::from(2u64), AbiValue::Address(wallet(0x22)), false.into()]),
    ]);

    let encoded = encode_params(&params, std::slice::from_ref(&users)).unwrap();
    // offset word + length word + 2 static tuples of 3 words
    assert_eq!(encoded.len(), 2 * WORD + 6 * WORD);

    let decoded = decode_params(&params, &encoded).unwrap();
    assert_eq!(decoded, vec![users]);

    let elements = decoded[0].as_slice().unwrap();
    assert_eq!(elements[1].as_slice().unwrap()[1].as_address(), Some(wallet(0x22)));
}

#[test]
fn test_decode_params_at_reports_end() {
    let params = [AbiType::String, AbiType::Uint(8)];
    let values = [AbiValue::from("hi"), AbiValue::from(3u64)];
    let mut data = vec![0xee; 4];
    data.extend(encode_params(&params, &values).unwrap());

    let (decoded, end) = decode_params_at(&params, &data, 4).unwrap();
    assert_eq!(decoded, values);
    assert_eq!(end, data.len());
}

// ============================================================================
// SIGNED INTEGERS
// ============================================================================

#[test]
fn test_minus_one_round_trip() {
    let encoded = encode(&AbiType::Int(256), &AbiValue::Int(I256::MINUS_ONE)).unwrap();
    assert_eq!(encoded, vec![0xff; WORD]);
    let (value, next) = decode(&AbiType::Int(256), &encoded, 0).unwrap();
    assert_eq!(value, AbiValue::Int(I256::MINUS_ONE));
    assert_eq!(next, WORD);
}

#[test]
fn test_large_negative_round_trip() {
    let original = I256::try_from(-987_654_321i64).unwrap();
    let encoded = encode(&AbiType::Int(256), &AbiValue::Int(original)).unwrap();
    let (value, _) = decode(&AbiType::Int(256), &encoded, 0).unwrap();
    assert_eq!(value.as_int(), Some(original));
}

#[test]
fn test_symmetry_across_widths() {
    for bits in (8..=256).step_by(8) {
        let ty = AbiType::Int(bits);
        let x = I256::try_from(100i64).unwrap();
        for v in [x, -x] {
            let encoded = encode(&ty, &AbiValue::Int(v)).unwrap();
            assert_eq!(decode(&ty, &encoded, 0).unwrap().0, AbiValue::Int(v), "width {}", bits);
        }
    }
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_every_fixed_width_type_rejects_short_buffer() {
    let types = [
        AbiType::Bool,
        AbiType::Address,
        AbiType::Hash32,
        AbiType::FixedBytes(4),
        AbiType::Uint(64),
        AbiType::Int(128),
        AbiType::Tuple(user_record()),
    ];
    for ty in &types {
        let err = decode(ty, &[0u8; 16], 0).unwrap_err();
        assert!(
            matches!(err, CodecError::InsufficientData { .. }),
            "expected InsufficientData for {}, got {:?}",
            ty,
            err
        );
    }
}

#[test]
fn test_uint8_with_leading_one_is_invalid() {
    let mut word = vec![0u8; WORD];
    word[0] = 1;
    let err = decode(&AbiType::Uint(8), &word, 0).unwrap_err();
    assert!(matches!(err, CodecError::InvalidEncoding { .. }));
    assert!(decode(&AbiType::Uint(256), &word, 0).is_ok());
}

#[test]
fn test_dirty_address_padding() {
    let mut word = vec![0u8; WORD];
    word[0] = 0xaa;
    let err = decode(&AbiType::Address, &word, 0).unwrap_err();
    assert!(matches!(err, CodecError::InvalidEncoding { .. }));
}

#[test]
fn test_offset_outside_buffer() {
    let params = [AbiType::Bytes];
    let mut data = vec![0u8; WORD];
    data[31] = 0xff;
    let err = decode_params(&params, &data).unwrap_err();
    assert!(matches!(err, CodecError::InsufficientData { .. }));
}

#[test]
fn test_invalid_utf8_string() {
    let mut data = encode(&AbiType::Bytes, &AbiValue::Bytes(vec![0xff, 0xfe])).unwrap();
    let err = decode(&AbiType::String, &data, 0).unwrap_err();
    assert!(matches!(err, CodecError::InvalidEncoding { .. }));

    data[WORD] = b'o';
    data[WORD + 1] = b'k';
    assert_eq!(decode(&AbiType::String, &data, 0).unwrap().0, AbiValue::from("ok"));
}

#[test]
#[should_panic(expected = "ABI decode failed")]
fn test_must_form_aborts() {
    must_decode_params(&[AbiType::Bool], &[0u8; 8]);
}
