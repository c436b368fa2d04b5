mod common;

use common::{date, dec, expense, setup_ledger};
use fintrack_core::{
    core::services::{BudgetAlertLevel, BudgetService, BudgetStatus, TransactionService},
    ledger::BudgetPeriod,
};

#[test]
fn third_expense_pushes_monthly_budget_over_the_limit() {
    let today = date(2025, 5, 20);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.set_budget(1, "Food", dec("500"), BudgetPeriod::Month).unwrap();

    let first = TransactionService::record(store, &expense(1, "200", "Food", today)).unwrap();
    assert!(first.alert.is_none());

    let second = TransactionService::record(store, &expense(1, "200", "Food", today)).unwrap();
    let alert = second.alert.expect("80% should warn");
    assert_eq!(alert.level, BudgetAlertLevel::Approaching);
    assert_eq!(alert.percentage, dec("80"));

    let third = TransactionService::record(store, &expense(1, "200", "Food", today)).unwrap();
    let alert = third.alert.expect("120% should alert");
    assert_eq!(alert.level, BudgetAlertLevel::Exceeded);
    assert_eq!(alert.spent, dec("600"));
    assert_eq!(alert.limit, dec("500"));
    assert_eq!(alert.percentage, dec("120"));
    assert_eq!(third.balance.net, dec("-600"));
}

#[test]
fn monthly_budget_only_counts_the_current_calendar_month() {
    let today = date(2025, 5, 3);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.set_budget(1, "Food", dec("100"), BudgetPeriod::Month).unwrap();

    store.add_transaction(&expense(1, "95", "Food", date(2025, 4, 29))).unwrap();
    let outcome = TransactionService::record(store, &expense(1, "10", "Food", today)).unwrap();
    assert!(outcome.alert.is_none());
}

#[test]
fn yearly_budgets_never_raise_alerts_on_record() {
    let today = date(2025, 11, 2);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.set_budget(1, "Travel", dec("100"), BudgetPeriod::Year).unwrap();

    let outcome = TransactionService::record(store, &expense(1, "250", "Travel", today)).unwrap();
    assert!(outcome.alert.is_none());
}

#[test]
fn alerts_repeat_while_the_threshold_stays_crossed() {
    let today = date(2025, 2, 14);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.set_budget(1, "Fun", dec("50"), BudgetPeriod::Month).unwrap();

    for _ in 0..3 {
        let outcome = TransactionService::record(store, &expense(1, "60", "Fun", today)).unwrap();
        assert_eq!(
            outcome.alert.map(|alert| alert.level),
            Some(BudgetAlertLevel::Exceeded)
        );
    }
}

#[test]
fn overview_reports_spend_over_calendar_windows() {
    let today = date(2025, 6, 15);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store.set_budget(1, "Food", dec("1000"), BudgetPeriod::Month).unwrap();
    store.set_budget(1, "Food", dec("5000"), BudgetPeriod::Year).unwrap();
    store.set_budget(1, "Books", dec("100"), BudgetPeriod::Month).unwrap();

    store.add_transaction(&expense(1, "850", "Food", date(2025, 6, 2))).unwrap();
    store.add_transaction(&expense(1, "400", "Food", date(2025, 3, 9))).unwrap();

    let lines = BudgetService::overview(store, 1);
    assert_eq!(lines.len(), 3);

    let monthly_food = lines
        .iter()
        .find(|line| line.budget.category == "Food" && line.budget.period == BudgetPeriod::Month)
        .unwrap();
    assert_eq!(monthly_food.spent, dec("850"));
    assert_eq!(monthly_food.remaining, dec("150"));
    assert_eq!(monthly_food.status, BudgetStatus::Warning);
    assert_eq!(monthly_food.window.start, date(2025, 6, 1));

    let yearly_food = lines
        .iter()
        .find(|line| line.budget.category == "Food" && line.budget.period == BudgetPeriod::Year)
        .unwrap();
    assert_eq!(yearly_food.spent, dec("1250"));
    assert_eq!(yearly_food.status, BudgetStatus::OnTrack);

    let books = lines.iter().find(|line| line.budget.category == "Books").unwrap();
    assert_eq!(books.spent, dec("0"));
    assert_eq!(books.remaining, dec("100"));
}

#[test]
fn deleting_a_budget_requires_ownership() {
    let ledger = setup_ledger(date(2025, 6, 15));
    let store = &ledger.store;
    let id = store.set_budget(1, "Food", dec("10"), BudgetPeriod::Month).unwrap();

    assert!(!store.delete_budget(id, 2));
    assert!(store.get_budget(id, 1).is_some());
    assert!(store.delete_budget(id, 1));
    assert!(store.list_budgets(1, None).is_empty());
}
