//! 零件分析與逾期分類效能測試
//!
//! 執行：`cargo bench --bench part_analytics -p rma-calc`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rma_calc::{OverdueQuery, PartSortKey, RmaAnalyzer};
use rma_core::{CaseStatus, Priority, RmaCase};

fn build_cases(count: usize) -> Vec<RmaCase> {
    let now = Utc.with_ymd_and_hms(2025, 11, 30, 0, 0, 0).unwrap();
    let statuses = [
        CaseStatus::UnderReview,
        CaseStatus::SentToCds,
        CaseStatus::ReplacementShipped,
        CaseStatus::Completed,
        CaseStatus::Rejected,
    ];
    let priorities = [Priority::Low, Priority::Medium, Priority::High, Priority::Critical];

    (0..count)
        .map(|i| {
            RmaCase::new(format!("RMA-{:06}", i), format!("Site {}", i % 37))
                .with_defective_part(&format!("Part {}", i % 113), &format!("PN-{:04}", i % 113))
                .with_status(statuses[i % statuses.len()])
                .with_priority(priorities[i % priorities.len()])
                .with_raised_date(now - Duration::days((i % 120) as i64))
        })
        .collect()
}

fn bench_parts_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("parts_report");
    let now = Utc.with_ymd_and_hms(2025, 11, 30, 0, 0, 0).unwrap();
    let analyzer = RmaAnalyzer::default();

    for size in [1_000, 10_000, 50_000] {
        let cases = build_cases(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("priority", size), &cases, |b, cases| {
            b.iter(|| {
                black_box(analyzer.parts_report(
                    black_box(cases),
                    &[],
                    PartSortKey::Priority,
                    now,
                ))
            });
        });
    }

    group.finish();
}

fn bench_overdue_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("overdue_report");
    let now = Utc.with_ymd_and_hms(2025, 11, 30, 0, 0, 0).unwrap();
    let analyzer = RmaAnalyzer::default();

    for size in [1_000, 10_000, 50_000] {
        let cases = build_cases(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("default", size), &cases, |b, cases| {
            b.iter(|| {
                black_box(analyzer.overdue_report(black_box(cases), OverdueQuery::default(), now))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parts_report, bench_overdue_report);
criterion_main!(benches);
