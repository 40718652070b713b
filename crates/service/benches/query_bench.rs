use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::NaiveDate;
use models::seed::seed_records;
use models::Record;
use service::dashboard::DashboardStats;
use service::pagination::Pagination;
use service::records::{CostFilter, RecordQuery, SortOrder};

fn synthetic(n: usize) -> Vec<Record> {
    let templates = seed_records();
    (0..n)
        .map(|i| {
            let mut r = templates[i % templates.len()].clone();
            r.id = i.to_string();
            r.car_plate = format!("P{:04}", i % 97);
            r.total_cost = (i % 900) as f64;
            r.date = format!("2025-{:02}-{:02}", i % 12 + 1, i % 28 + 1);
            r
        })
        .collect()
}

fn bench_query(c: &mut Criterion) {
    let records = synthetic(5_000);
    let query = RecordQuery {
        search: "toy".into(),
        cost: CostFilter::Medium,
        sort: SortOrder::Oldest,
        ..Default::default()
    };

    c.bench_function("records_filter_sort_page", |b| {
        b.iter(|| query.apply(black_box(&records), Pagination::new(3, 5)));
    });

    let today = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
    c.bench_function("dashboard_stats", |b| {
        b.iter(|| DashboardStats::compute(black_box(&records), today));
    });
}

criterion_group!(benches, bench_query);
criterion_main!(benches);
