use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solbind_runtime::{
    decode_params, encode_params, AbiType, AbiValue, Address, RecordDef, RecordField,
};

fn users_payload(count: usize) -> (Vec<RecordField>, Vec<AbiValue>) {
    let user = RecordDef::new(
        "User",
        vec![
            RecordField::new("id", AbiType::Uint(256)),
            RecordField::new("name", AbiType::String),
            RecordField::new("wallet", AbiType::Address),
        ],
    )
    .into_ref();

    let params = vec![
        RecordField::new("users", AbiType::array(AbiType::Tuple(user))),
        RecordField::new("memo", AbiType::Bytes),
    ];

    let users = (0..count)
        .map(|i| {
            AbiValue::Tuple(vec![
                AbiValue::from(i as u64),
                AbiValue::from(format!("user-{}", i)),
                AbiValue::Address(Address::repeat_byte(i as u8)),
            ])
        })
        .collect();

    (params, vec![AbiValue::Array(users), AbiValue::Bytes(vec![0xab; 100])])
}

fn benchmark_encode(c: &mut Criterion) {
    let (params, values) = users_payload(32);

    c.bench_function("encode_user_batch", |b| {
        b.iter(|| black_box(encode_params(black_box(&params), black_box(&values)).unwrap()));
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let (params, values) = users_payload(32);
    let encoded = encode_params(&params, &values).unwrap();

    c.bench_function("decode_user_batch", |b| {
        b.iter(|| black_box(decode_params(black_box(&params), black_box(&encoded)).unwrap()));
    });
}

fn benchmark_batch_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("user_batch_scaling");

    for count in [1usize, 16, 256] {
        let (params, values) = users_payload(count);

        group.bench_function(format!("round_trip_{}", count), |b| {
            b.iter(|| {
                let bytes = encode_params(black_box(&params), black_box(&values)).unwrap();
                black_box(decode_params(&params, &bytes).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_encode, benchmark_decode, benchmark_batch_scaling);
criterion_main!(benches);
