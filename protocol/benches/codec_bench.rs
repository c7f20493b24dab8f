// Codec benchmarks for atomic transactions.
//
// Covers batch decoding at various block sizes, standalone decoding and
// import building.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use k256::ecdsa::SigningKey;

use atomix_protocol::batch::encode_batch;
use atomix_protocol::transaction::{build_import, sign_import, ChainIds, Id, ShortId, Utxo};
use atomix_protocol::{decode_batch, AtomicTx};

fn chains() -> ChainIds {
    ChainIds {
        blockchain_id: Id::new([0xCC; 32]),
        source_chain: Id::EMPTY,
    }
}

fn utxos(n: usize) -> Vec<Utxo> {
    (0..n)
        .map(|i| Utxo {
            tx_id: Id::new([(i % 251) as u8; 32]),
            output_index: i as u32,
            asset_id: Id::new([0xAA; 32]),
            amount: 10_000_000,
            address: ShortId::new([1; 20]),
        })
        .collect()
}

fn signed_tx(inputs: usize) -> Vec<u8> {
    let unsigned = build_import(5, chains(), &utxos(inputs), ShortId::new([2; 20]), Id::new([0xAA; 32]), 25_000_000_000)
        .expect("bench import builds");
    let keys: Vec<SigningKey> = (0..inputs)
        .map(|i| SigningKey::from_slice(&[(i + 1) as u8; 32]).expect("valid scalar"))
        .collect();
    sign_import(&unsigned, &keys).expect("bench import signs")
}

fn bench_decode_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch/decode");
    let tx = AtomicTx::from_bytes(&signed_tx(2)).expect("decodes");

    for count in [1usize, 10, 100, 1_000] {
        let blob = encode_batch(&vec![tx.clone(); count]);
        group.throughput(Throughput::Bytes(blob.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &blob, |b, blob| {
            b.iter(|| decode_batch(black_box(blob)));
        });
    }
    group.finish();
}

fn bench_decode_standalone(c: &mut Criterion) {
    let bytes = signed_tx(4);
    c.bench_function("atomic_tx/from_bytes", |b| {
        b.iter(|| AtomicTx::from_bytes(black_box(&bytes)));
    });
}

fn bench_build_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/import");
    for inputs in [1usize, 8, 64] {
        let utxos = utxos(inputs);
        group.bench_with_input(BenchmarkId::from_parameter(inputs), &utxos, |b, utxos| {
            b.iter(|| {
                build_import(
                    5,
                    chains(),
                    black_box(utxos),
                    ShortId::new([2; 20]),
                    Id::new([0xAA; 32]),
                    25_000_000_000,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode_batch, bench_decode_standalone, bench_build_import);
criterion_main!(benches);
