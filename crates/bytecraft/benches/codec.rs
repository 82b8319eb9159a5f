use bytecraft::{
    field::{Field, FieldKind, ScalarKind},
    schema::Schema,
    value::{Record, Value},
};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_schema(field_count: usize) -> Schema {
    let mut fields = Vec::with_capacity(field_count + 2);

    fields.push(
        Field::new("len", FieldKind::Scalar(ScalarKind::U32)).with_tag(format!(
            "sizeof={}payload",
            (0..field_count).map(|i| format!("f{}+", i)).collect::<String>()
        )),
    );
    for i in 0..field_count {
        fields.push(Field::new(format!("f{}", i), FieldKind::Scalar(ScalarKind::U16)));
    }
    fields.push(Field::new("payload", FieldKind::Bytes));

    Schema::compile(&fields).unwrap()
}

fn gen_record(field_count: usize, payload_len: usize) -> Record {
    let mut record = Record::new().with("len", Value::U32(0));

    // Deterministic but non-trivial pattern
    for i in 0..field_count {
        record.insert(format!("f{}", i), Value::U16((i * 31 % 65536) as u16));
    }

    record.with(
        "payload",
        Value::Bytes((0..payload_len).map(|i| (i * 7 % 256) as u8).collect()),
    )
}

fn bench_codec(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let record = gen_record(field_count, 256);
        let packet = schema.encode(&record).unwrap();

        c.bench_function(&format!("encode_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = schema.encode(&record).unwrap();
            })
        });

        c.bench_function(&format!("decode_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = schema.decode(&packet).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
