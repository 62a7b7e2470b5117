//! Benchmarks for pipeline evaluation
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use matchstats::pipeline::{evaluate, Document};
use matchstats::record::{Ally, Champion, MatchOutcome, MatchRecord, PlayerStats};
use matchstats::stats::{self, StatsService};
use matchstats::store::MemoryStore;
use std::sync::Arc;

const PLAYERS: usize = 10;
const ROLES: [&str; 6] = ["TOP", "JUNGLE", "MIDDLE", "BOTTOM", "UTILITY", "NONE"];
const CLASSES: [&str; 6] = ["Assassin", "Fighter", "Mage", "Marksman", "Support", "Tank"];
const GAMEMODES: [i64; 5] = [400, 420, 440, 450, 830];

fn create_test_records(count: usize) -> Vec<MatchRecord> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let result = match i % 10 {
                0 => MatchOutcome::Remake,
                n if n % 2 == 0 => MatchOutcome::Win,
                _ => MatchOutcome::Fail,
            };
            let champion = Champion::new((i % 40) as i64, &[CLASSES[i % CLASSES.len()]]);
            let mut record = MatchRecord::new(format!("player-{}", i % PLAYERS), champion)
                .result(result)
                .gamemode(GAMEMODES[i % GAMEMODES.len()])
                .role(ROLES[i % ROLES.len()])
                .time(1200.0 + (i % 900) as f64)
                .date(start + Duration::hours(i as i64))
                .stats(PlayerStats {
                    kills: (i % 15) as f64,
                    deaths: (i % 9) as f64,
                    assists: (i % 20) as f64,
                    kp: 0.5,
                    ..Default::default()
                });
            for mate in 0..4 {
                let id = (i + mate) % 25;
                record = record.ally(Ally::new(format!("mate-{}", id), format!("acc-mate-{}", id)));
            }
            record
        })
        .collect()
}

fn to_documents(records: &[MatchRecord]) -> Vec<Document> {
    records
        .iter()
        .filter_map(|r| match serde_json::to_value(r) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for size in [1_000, 10_000] {
        let docs = to_documents(&create_test_records(size));
        group.throughput(Throughput::Elements(size as u64));

        let champion = stats::champion_stats("player-3", 5).unwrap();
        group.bench_function(format!("champion_stats_{}", size), |b| {
            b.iter(|| evaluate(black_box(&champion), docs.clone()).unwrap())
        });

        let complete = stats::champion_complete_stats("player-3", None).unwrap();
        group.bench_function(format!("champion_complete_stats_{}", size), |b| {
            b.iter(|| evaluate(black_box(&complete), docs.clone()).unwrap())
        });

        let mates = stats::mates("player-3").unwrap();
        group.bench_function(format!("mates_{}", size), |b| {
            b.iter(|| evaluate(black_box(&mates), docs.clone()).unwrap())
        });
    }

    group.finish();
}

fn bench_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = MemoryStore::from_records(create_test_records(10_000)).unwrap();
    let service = StatsService::new(Arc::new(store));

    let mut group = c.benchmark_group("service");

    group.bench_function("global_stats_10000", |b| {
        b.iter(|| {
            rt.block_on(service.global_stats(black_box("player-3")))
                .unwrap()
        })
    });

    group.bench_function("role_stats_10000", |b| {
        b.iter(|| rt.block_on(service.role_stats(black_box("player-3"))).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_service);
criterion_main!(benches);
