//! Tokenizer and serializer benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hexterm::parser::{serialize, tokenize, Tokenizer};

fn bench_tokenize_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("plain_text", |b| {
        b.iter(|| black_box(tokenize(black_box(&plain_text))))
    });

    group.finish();
}

fn bench_tokenize_csi_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let csi_heavy = "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J\x1b[?25l".repeat(100);
    group.throughput(Throughput::Bytes(csi_heavy.len() as u64));

    group.bench_function("csi_sequences", |b| {
        b.iter(|| black_box(tokenize(black_box(&csi_heavy))))
    });

    group.finish();
}

fn bench_tokenize_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    // A typical frame: markers, hyperlinks, colored lines
    let frame = concat!(
        "\x1b_HEX1BAPP:FRAME:BEGIN\x1b\\",
        "\x1b[H\x1b]8;;https://example.com\x07link\x1b]8;;\x07\r\n",
        "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n",
        "\x1b_HEX1BAPP:FRAME:END\x1b\\",
    )
    .repeat(200);
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("mixed_content", |b| {
        b.iter(|| black_box(tokenize(black_box(&frame))))
    });

    group.finish();
}

fn bench_tokenize_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let mixed = "Line: \x1b[32mOK\x1b[0m\r\n\x1b]0;title\x07".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    // Chunks of 64 bytes split sequences at arbitrary points
    let chunks: Vec<String> = mixed
        .as_bytes()
        .chunks(64)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    group.bench_function("streaming_chunks", |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::new();
            let mut count = 0;
            for chunk in &chunks {
                count += tokenizer.feed(black_box(chunk)).len();
            }
            count += tokenizer.finish().len();
            black_box(count)
        })
    });

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    let input = "\x1b[1;1H\x1b[0J\x1b[38;5;196mtext\x1b[m\x1bPq#0~~\x1b\\\r\n".repeat(500);
    let tokens = tokenize(&input);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("canonical", |b| {
        b.iter(|| black_box(serialize(black_box(&tokens))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tokenize_plain_text,
    bench_tokenize_csi_sequences,
    bench_tokenize_mixed,
    bench_tokenize_streaming,
    bench_serialize
);

criterion_main!(benches);
