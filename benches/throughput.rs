use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pin_ledger::{Ledger, MemoryStore};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::runtime::Runtime;

const OPERATIONS: u64 = 1_000;

fn ledger_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");

    group.throughput(Throughput::Elements(OPERATIONS));
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(50);

    group.bench_function("deposit_1K", |b| {
        let rt = Runtime::new().unwrap();
        b.to_async(rt).iter(|| async {
            let ledger = Ledger::new(MemoryStore::new());
            for _ in 0..OPERATIONS {
                ledger.deposit("Ali", dec!(1.25)).await.unwrap();
            }
        });
    });

    group.bench_function("transfer_1K", |b| {
        let rt = Runtime::new().unwrap();
        b.to_async(rt).iter(|| async {
            let ledger = Ledger::new(MemoryStore::new());
            for i in 0..OPERATIONS {
                let (from, pin, to) = if i % 2 == 0 {
                    ("Mona", "5678", "Saif")
                } else {
                    ("Saif", "9876", "Mona")
                };
                ledger.transfer(from, pin, to, dec!(1)).await.unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, ledger_operations);
criterion_main!(benches);
