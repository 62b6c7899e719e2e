use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hamming_secded::cs::ecc::{BitBuffer, HammingCode, HammingConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_data(bits: usize) -> BitBuffer {
    let mut rng = StdRng::seed_from_u64(42);
    let bytes: Vec<u8> = (0..bits / 8).map(|_| rng.gen()).collect();
    BitBuffer::from_bytes(&bytes)
}

fn bench_encode(c: &mut Criterion) {
    let code = HammingCode::default();
    let mut group = c.benchmark_group("hamming_encode");

    for size in [1 << 10, 1 << 14, 1 << 18] {
        let data = random_data(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| code.encode(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let sequential = HammingCode::default();
    let fanned_out = HammingCode::new(HammingConfig::default().with_parallel_threshold(1));
    let mut group = c.benchmark_group("hamming_decode");

    for size in [1 << 10, 1 << 14, 1 << 18] {
        let mut encoded = sequential.encode(&random_data(size)).unwrap();
        // One error every third block
        for block in (0..encoded.len() / 8).step_by(3) {
            encoded.flip(block * 8 + block % 7).unwrap();
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sequential", size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut received = encoded.clone();
                sequential.decode(black_box(&mut received)).unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("threshold_1", size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut received = encoded.clone();
                fanned_out.decode(black_box(&mut received)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
