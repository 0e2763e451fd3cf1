use criterion::{Criterion, criterion_group, criterion_main};
use packed_struct::PackedStruct;
use std::hint::black_box;

use maildns::Header;
use maildns::enums::{RecordClass, RecordType};
use maildns::unpack::{Unpacker, encode_dname, mx_records};

fn mx_payload(domain: &str, exchanges: &[(u16, &str)]) -> Vec<u8> {
    let header = Header {
        id: 0x2c5a,
        flags: 0x8180,
        qdcount: 1,
        ancount: exchanges.len() as u16,
        nscount: 0,
        arcount: 0,
    };
    let mut buf = header.pack().expect("header should pack").to_vec();
    buf.extend(encode_dname(domain).expect("domain should encode"));
    buf.extend((RecordType::MX as u16).to_be_bytes());
    buf.extend((RecordClass::Internet as u16).to_be_bytes());
    for (preference, exchange) in exchanges {
        buf.extend(encode_dname(domain).expect("domain should encode"));
        buf.extend((RecordType::MX as u16).to_be_bytes());
        buf.extend((RecordClass::Internet as u16).to_be_bytes());
        buf.extend(300u32.to_be_bytes());
        let exchange = encode_dname(exchange).expect("exchange should encode");
        buf.extend(((exchange.len() + 2) as u16).to_be_bytes());
        buf.extend(preference.to_be_bytes());
        buf.extend(exchange);
    }
    buf
}

fn criterion_benchmark(c: &mut Criterion) {
    let payload = mx_payload(
        "example.com",
        &[
            (10, "mx1.example.com"),
            (20, "mx2.example.com"),
            (30, "mx3.example.com"),
            (40, "mx4.example.com"),
        ],
    );
    c.bench_function("mx_records", |b| {
        b.iter(|| mx_records(black_box(&payload)))
    });

    let wire = encode_dname("mail.a-rather-deep.subdomain.example.com").expect("should encode");
    c.bench_function("read_dname", |b| {
        b.iter(|| Unpacker::new(black_box(&wire)).read_dname())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
