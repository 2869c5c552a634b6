use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use royalty_core::Currency;
use royalty_distribution::{SplitPolicy, apportion};
use royalty_repertoire::{ArtistId, Contribution, ContributionKind, Creation, CreationId};
use rust_decimal::Decimal;

/// A creation with `n` contributors cycling through the three kinds.
fn creation_with(n: usize) -> Creation {
    let kinds = [
        ContributionKind::Composition,
        ContributionKind::Text,
        ContributionKind::Performance,
    ];
    let contributions =
        (0..n).map(|i| Contribution::new(ArtistId::generate(), kinds[i % kinds.len()]));

    Creation::new(CreationId::generate(), "Bench", ArtistId::generate())
        .unwrap()
        .with_contributions(contributions)
}

fn bench_apportion(c: &mut Criterion) {
    let mut group = c.benchmark_group("apportion");
    let policy = SplitPolicy::default();
    let amount = Decimal::new(123_456, 2);

    for contributors in [0usize, 3, 12, 48] {
        let creation = creation_with(contributors);
        group.throughput(Throughput::Elements(contributors.max(1) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(contributors), &creation, |b, creation| {
            b.iter(|| apportion(black_box(creation), black_box(amount), &policy));
        });
    }

    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle");
    let policy = SplitPolicy::default();
    let currency = Currency::eur();
    let amount = Decimal::new(100_00, 2);

    for contributors in [3usize, 12, 48] {
        let breakdown = apportion(&creation_with(contributors), amount, &policy);
        group.bench_with_input(
            BenchmarkId::from_parameter(contributors),
            &breakdown,
            |b, breakdown| {
                b.iter(|| breakdown.settle(black_box(amount), &currency));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_apportion, bench_settle);
criterion_main!(benches);
