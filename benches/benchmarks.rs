use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use geoipcsv::{Config, Enricher, LocationResult, MemoryStore, Place, RecordParser, StreamProcessor};
use std::hint::black_box;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const ADDRESSES: usize = 256;

fn address(i: usize) -> IpAddr {
    if i % 2 == 0 {
        IpAddr::V4(Ipv4Addr::new((i % 223) as u8 + 1, (i * 7) as u8, (i * 13) as u8, 1))
    } else {
        IpAddr::V6(Ipv6Addr::new(0x2001, 0x0db8, i as u16, 0, 0, 0, 0, 1))
    }
}

// A store covering every address the generated records use
fn build_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for i in 0..ADDRESSES {
        let mut city = Place::named("en", &format!("City {}", i));
        city.names.insert("de".to_string(), format!("Stadt {}", i));
        store.insert(
            address(i),
            LocationResult {
                city,
                country: Place::named("en", "Testland"),
                ..Default::default()
            },
        );
    }
    store
}

// Access-log style CSV records with the address in column 1
fn generate_records(count: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..count {
        let line = format!(
            "{},\"{}\",GET,/index.html,200,{}\n",
            i,
            address(i % ADDRESSES),
            1000 + i
        );
        data.extend_from_slice(line.as_bytes());
    }
    data
}

fn bench_parse(c: &mut Criterion) {
    let parser = RecordParser::new(b',', 1, Some("\""));
    let line = b"42,\"203.0.113.7\",GET,/index.html,200,1234";

    c.bench_function("parse_record", |b| {
        b.iter(|| parser.parse(black_box(line)).map(|r| r.fields().len()))
    });
}

fn bench_enrich(c: &mut Criterion) {
    let store = build_store();
    let enricher = Enricher::new(&store, "en", false);
    let v4 = address(0).to_string();
    let v6 = address(1).to_string();

    let mut group = c.benchmark_group("enrich");
    group.bench_function("ipv4", |b| {
        b.iter(|| enricher.enrich(black_box(v4.as_bytes())).unwrap())
    });
    group.bench_function("ipv6", |b| {
        b.iter(|| enricher.enrich(black_box(v6.as_bytes())).unwrap())
    });
    group.finish();
}

// Full pipeline into a pre-allocated Vec<u8> to isolate parse+lookup+write
// cost from I/O.
fn bench_stream(c: &mut Criterion) {
    let store = build_store();
    let config = Config {
        column: 1,
        trim: Some("\"".to_string()),
        ..Config::default()
    };
    let processor = StreamProcessor::new(&config, &store);
    let data = generate_records(1000);

    let mut group = c.benchmark_group("stream");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("process", |b| {
        let mut out = Vec::with_capacity(data.len() * 2);
        b.iter(|| {
            out.clear();
            let mut input = black_box(&data[..]);
            processor.process(&mut input, &mut out).unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_enrich, bench_stream);
criterion_main!(benches);
