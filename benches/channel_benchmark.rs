/*!
 * Argument Channel Benchmark
 * Frame encoding and decoding cost for typical call shapes
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use selffork::channel::ChannelFrame;
use selffork::{args, validate_args, Arg, ArgReader, Matching, Target};

fn call_args(size: usize) -> Vec<Arg> {
    args![7i64, "worker".to_string(), vec![0u8; size]]
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_encode");

    for size in [16, 1024, 65536].iter() {
        let args = call_args(*size);
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("frame", size), size, |b, _| {
            b.iter(|| {
                let bytes = ChannelFrame::encode("worker", black_box(&args))
                    .unwrap()
                    .to_bytes()
                    .unwrap();
                black_box(bytes);
            });
        });
    }

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_decode");

    for size in [16, 1024, 65536].iter() {
        let bytes = ChannelFrame::encode("worker", &call_args(*size))
            .unwrap()
            .to_bytes()
            .unwrap();
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::new("typed", size), size, |b, _| {
            b.iter(|| {
                let mut reader = ArgReader::from_bytes(black_box(&bytes)).unwrap();
                let count: i64 = reader.next_value().unwrap();
                let name: String = reader.next_value().unwrap();
                let data: Vec<u8> = reader.next_value().unwrap();
                black_box((count, name, data));
            });
        });
    }

    group.finish();
}

fn benchmark_validate(c: &mut Criterion) {
    let target = Target::of(|_count: i64, _name: String, _data: Vec<u8>| {});
    let signature = target.signature().cloned().unwrap();
    let args = call_args(16);

    c.bench_function("validate_kind", |b| {
        b.iter(|| validate_args(black_box(&signature), black_box(&args), Matching::Kind))
    });
    c.bench_function("validate_strict", |b| {
        b.iter(|| validate_args(black_box(&signature), black_box(&args), Matching::Strict))
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode, benchmark_validate);
criterion_main!(benches);
