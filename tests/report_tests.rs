mod common;

use common::{date, dec, expense, income, setup_ledger};
use fintrack_core::{
    core::{
        period::{resolve_rolling, PeriodToken},
        services::{ChartService, ReportService, TransactionService},
    },
    ledger::{DateRange, TransactionKind},
};

#[test]
fn monthly_series_fills_gaps_between_active_months() {
    let today = date(2025, 3, 31);
    let ledger = setup_ledger(today);
    let store = &ledger.store;

    store.add_transaction(&income(1, "1000", "Salary", date(2025, 1, 15))).unwrap();
    store.add_transaction(&expense(1, "300", "Rent", date(2025, 1, 20))).unwrap();
    store.add_transaction(&expense(1, "45", "Food", date(2025, 3, 3))).unwrap();

    let range = DateRange::new(date(2025, 1, 1), today).unwrap();
    let series = ReportService::monthly_series(store, 1, range);
    assert_eq!(series.len(), 3);

    let labels: Vec<_> = series.iter().map(|point| point.label()).collect();
    assert_eq!(labels, ["01.2025", "02.2025", "03.2025"]);
    assert_eq!(series[0].income, dec("1000"));
    assert_eq!(series[0].expense, dec("300"));
    assert_eq!(series[1].income, dec("0"));
    assert_eq!(series[1].expense, dec("0"));
    assert_eq!(series[2].expense, dec("45"));
}

#[test]
fn monthly_series_is_empty_without_transactions() {
    let ledger = setup_ledger(date(2025, 3, 31));
    let range = DateRange::new(date(2025, 1, 1), date(2025, 3, 31)).unwrap();
    assert!(ReportService::monthly_series(&ledger.store, 1, range).is_empty());
}

#[test]
fn rolling_week_report_includes_boundary_days() {
    let today = date(2025, 7, 10);
    let ledger = setup_ledger(today);
    let store = &ledger.store;

    store.add_transaction(&expense(1, "1", "Food", date(2025, 7, 3))).unwrap();
    store.add_transaction(&expense(1, "2", "Food", today)).unwrap();
    store.add_transaction(&expense(1, "4", "Food", date(2025, 7, 2))).unwrap();

    let week = resolve_rolling(PeriodToken::Week, today);
    let report = ReportService::resolved_report(store, 1, &week);
    assert_eq!(report.label, "Last 7 days");
    assert_eq!(report.period.expense, dec("3"));
    assert_eq!(report.balance.expense, dec("7"));
}

#[test]
fn empty_period_yields_empty_report_with_lifetime_balance() {
    let today = date(2025, 7, 10);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.add_transaction(&income(1, "20", "Gift", date(2025, 7, 1))).unwrap();

    let yesterday = resolve_rolling(PeriodToken::Yesterday, today);
    let report = ReportService::resolved_report(store, 1, &yesterday);
    assert!(report.is_empty());
    assert_eq!(report.period.net, dec("0"));
    assert_eq!(report.balance.net, dec("20"));
}

#[test]
fn pie_chart_shares_cover_the_rolling_month() {
    let today = date(2025, 9, 30);
    let ledger = setup_ledger(today);
    let store = &ledger.store;

    store.add_transaction(&expense(1, "75", "Food", date(2025, 9, 10))).unwrap();
    store.add_transaction(&expense(1, "25", "Transport", date(2025, 9, 12))).unwrap();
    store.add_transaction(&expense(1, "500", "Food", date(2025, 6, 1))).unwrap();

    let pie = ChartService::category_pie(store, 1, TransactionKind::Expense).unwrap();
    assert_eq!(pie.total, dec("100"));
    assert_eq!(pie.slices[0].category, "Food");
    assert_eq!(pie.slices[0].share, dec("75"));
    assert_eq!(pie.slices[1].share, dec("25"));

    assert!(ChartService::category_pie(store, 1, TransactionKind::Income).is_none());
}

#[test]
fn yearly_dynamics_track_income_against_expense() {
    let today = date(2025, 9, 30);
    let ledger = setup_ledger(today);
    let store = &ledger.store;

    store.add_transaction(&income(1, "2000", "Salary", date(2025, 8, 1))).unwrap();
    store.add_transaction(&expense(1, "800", "Rent", date(2025, 9, 1))).unwrap();

    let chart = ChartService::yearly_dynamics(store, 1).unwrap();
    assert_eq!(chart.points.len(), 2);
    assert_eq!(chart.total_income(), dec("2000"));
    assert_eq!(chart.total_expense(), dec("800"));
}

#[test]
fn history_pages_are_clamped() {
    let today = date(2025, 4, 30);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    for day in 1..=12 {
        store.add_transaction(&expense(1, "1", "Food", date(2025, 4, day))).unwrap();
    }

    let first = TransactionService::history(store, 1, 1, 5);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.total_count, 12);
    assert_eq!(first.transactions[0].date, date(2025, 4, 12));
    assert!(!first.has_previous());
    assert!(first.has_next());

    let past_end = TransactionService::history(store, 1, 9, 5);
    assert_eq!(past_end.page, 3);
    assert_eq!(past_end.transactions.len(), 2);
    assert!(!past_end.has_next());

    let empty = TransactionService::history(store, 2, 1, 5);
    assert_eq!(empty.page, 1);
    assert_eq!(empty.total_pages, 0);
    assert!(empty.transactions.is_empty());
}
