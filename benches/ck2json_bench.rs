use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ck2json::{
    classify, json::JsonOptions, ByteSource, Ck2Parser, Date, Tokenizer, Windows1252Encoding,
};
use std::io::Cursor;

const SAMPLE: &'static [u8] = include_bytes!("../tests/fixtures/sample.ck2");

/// Synthesizes a save with `count` characters, each a handful of typed fields
fn generate_save(count: usize) -> Vec<u8> {
    let mut out = String::from("CK2txt\n\tversion=\"2.8.3.4\"\n\tdate=1066.9.15\n\tcharacter=\n\t{\n");
    for i in 0..count {
        out.push_str(&format!(
            "\t\t{}=\n\t\t{{\n\t\t\tbn=\"Name {}\"\n\t\t\tb_d=1040.{}.{}\n\t\t\twealth={}.125\n\t\t\tfemale=no\n\t\t\ttraits={{ 12 45 {} }}\n\t\t}}\n",
            i,
            i,
            i % 12 + 1,
            i % 28 + 1,
            i,
            i % 200
        ));
    }
    out.push_str("\t}\n}\n");
    out.into_bytes()
}

pub fn classify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for text in ["\"Philippe\"", "1066.9.15", "34.521", "yes", "1200", "k_france"].iter() {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, text| {
            b.iter(|| classify(black_box(text)))
        });
    }
    group.finish();
}

pub fn date_benchmark(c: &mut Criterion) {
    c.bench_function("date-parse", |b| {
        b.iter(|| Date::parse(black_box("1066.9.15")))
    });
}

pub fn windows1252_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("windows1252");
    for size in [2, 8, 32, 128, 512].iter() {
        let data = vec![b'a'; *size as usize];
        let data2 = vec![0xdc; *size as usize];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("ascii-to-utf8", size),
            size,
            |b, &_size| b.iter(|| Windows1252Encoding::decode(&data)),
        );
        group.bench_with_input(BenchmarkId::new("1252-to-utf8", size), size, |b, &_size| {
            b.iter(|| Windows1252Encoding::decode(&data2))
        });
    }
    group.finish();
}

pub fn tokenizer_benchmark(c: &mut Criterion) {
    let data = generate_save(2000);
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for chunk_len in [512, 4096, 65536].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_len),
            chunk_len,
            |b, &chunk_len| {
                b.iter(|| {
                    let source = ByteSource::builder().chunk_len(chunk_len).build(&data[..]);
                    Tokenizer::new(source).read_all().unwrap()
                })
            },
        );
    }
    group.finish();
}

pub fn convert_benchmark(c: &mut Criterion) {
    let data = generate_save(2000);
    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("inline", |b| {
        b.iter(|| ck2json::to_json_vec(black_box(&data)).unwrap())
    });
    group.bench_function("threaded", |b| {
        let parser = Ck2Parser::new();
        b.iter(|| {
            let reader = Cursor::new(black_box(data.clone()));
            parser.convert(reader, Vec::new()).unwrap()
        })
    });
    group.bench_function("materialized", |b| {
        let parser = Ck2Parser::new().materialize_tokens(true);
        b.iter(|| parser.convert_slice(black_box(&data)).unwrap())
    });
    group.bench_function("pretty", |b| {
        let parser = Ck2Parser::new().with_json_options(JsonOptions::new().with_prettyprint(true));
        b.iter(|| parser.convert_slice(black_box(&data)).unwrap())
    });
    group.finish();
}

pub fn sample_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));
    group.bench_function("to_json", |b| {
        b.iter(|| ck2json::to_json_vec(black_box(SAMPLE)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    classify_benchmark,
    date_benchmark,
    windows1252_benchmark,
    tokenizer_benchmark,
    convert_benchmark,
    sample_benchmark,
);

criterion_main!(benches);
