use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fintrack_core::core::period::{resolve_rolling, PeriodToken};
use fintrack_core::core::services::{ReportService, TransactionService};
use fintrack_core::core::{FixedClock, LedgerStore};
use fintrack_core::ledger::{DateRange, NewTransaction, TransactionKind};
use fintrack_core::storage::{ConnectionConfig, SqliteStorage};
use rust_decimal::Decimal;
use tempfile::tempdir;

const CATEGORIES: [&str; 6] = ["Food", "Transport", "Housing", "Health", "Fun", "Other"];

fn build_sample_store(path: &std::path::Path, txn_count: usize, today: NaiveDate) -> LedgerStore {
    let storage = SqliteStorage::open(path, &ConnectionConfig::default()).expect("open storage");
    let store = LedgerStore::new(Box::new(storage), Arc::new(FixedClock::at_date(today)));
    let start = today - Duration::days(730);

    for idx in 0..txn_count {
        let date = start + Duration::days((idx % 730) as i64);
        let kind = if idx % 10 == 0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        let amount = Decimal::new(500 + (idx % 10_000) as i64, 2);
        let draft = NewTransaction::new(1, kind, amount, CATEGORIES[idx % CATEGORIES.len()]).on(date);
        store.add_transaction(&draft).expect("seed transaction");
    }
    store
}

fn bench_aggregates(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let store = build_sample_store(&dir.path().join("bench.db"), black_box(10_000), today);

    c.bench_function("balance_10k", |b| {
        b.iter(|| black_box(store.balance(1)))
    });

    let month = resolve_rolling(PeriodToken::Month, today);
    c.bench_function("period_report_month_10k", |b| {
        b.iter(|| black_box(ReportService::resolved_report(&store, 1, &month)))
    });

    let year = DateRange::new(today - Duration::days(365), today).unwrap();
    c.bench_function("monthly_series_year_10k", |b| {
        b.iter(|| black_box(ReportService::monthly_series(&store, 1, year)))
    });

    c.bench_function("history_page_10k", |b| {
        b.iter(|| black_box(TransactionService::history(&store, 1, 50, 10)))
    });
}

criterion_group!(benches, bench_aggregates);
criterion_main!(benches);
