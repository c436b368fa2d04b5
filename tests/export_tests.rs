mod common;

use common::{date, expense, income, setup_ledger};
use fintrack_core::core::services::{ExportFormat, ExportService};

#[test]
fn exporting_nothing_reports_no_data() {
    let ledger = setup_ledger(date(2025, 10, 1));
    let export = ExportService::export(&ledger.store, 1, ExportFormat::Csv).unwrap();
    assert!(export.is_none());
}

#[test]
fn csv_export_contains_every_transaction_of_the_user() {
    let today = date(2025, 10, 1);
    let ledger = setup_ledger(today);
    let store = &ledger.store;
    store
        .add_transaction(&expense(1, "150", "Food", today).with_description(Some("lunch".into())))
        .unwrap();
    store.add_transaction(&income(1, "3000", "Salary", date(2025, 9, 30))).unwrap();
    store.add_transaction(&expense(2, "9", "Other", today)).unwrap();

    let file = ExportService::export(store, 1, ExportFormat::Csv)
        .unwrap()
        .expect("user has data");
    assert_eq!(file.file_name, "finance_20251001.csv");
    assert_eq!(file.rows, 2);
    assert!(file.bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(file.bytes[3..].to_vec()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(",expense,150.00,Food,lunch,2025-10-01,"));
    assert!(lines[2].contains(",income,3000.00,Salary,,2025-09-30,"));
}

#[test]
fn json_export_is_an_array_of_records() {
    let today = date(2025, 10, 1);
    let ledger = setup_ledger(today);
    ledger
        .store
        .add_transaction(&expense(1, "12.5", "Cafe", today))
        .unwrap();

    let file = ExportService::export(&ledger.store, 1, ExportFormat::Json)
        .unwrap()
        .unwrap();
    assert_eq!(file.file_name, "finance_20251001.json");

    let value: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["category"], "Cafe");
}
