//! Tabular export of a user's full transaction history.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::ledger_store::LedgerStore;
use crate::errors::{LedgerError, Result};
use crate::ledger::Transaction;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CSV_HEADER: [&str; 8] = [
    "id",
    "user_id",
    "type",
    "amount",
    "category",
    "description",
    "date",
    "created_at",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Generated export ready to be attached to a reply or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

pub struct ExportService;

impl ExportService {
    /// Serialises every transaction of the user. `None` signals "no data" instead of an empty file.
    pub fn export(
        store: &LedgerStore,
        user_id: i64,
        format: ExportFormat,
    ) -> Result<Option<ExportFile>> {
        let transactions = store.list_transactions(user_id, None, None);
        if transactions.is_empty() {
            return Ok(None);
        }
        let bytes = match format {
            ExportFormat::Csv => write_csv(&transactions)?,
            ExportFormat::Json => serde_json::to_vec_pretty(&transactions)?,
        };
        let file_name = format!(
            "finance_{}.{}",
            store.today().format("%Y%m%d"),
            format.extension()
        );
        info!(user_id, rows = transactions.len(), %format, "export generated");
        Ok(Some(ExportFile {
            file_name,
            format,
            rows: transactions.len(),
            bytes,
        }))
    }
}

fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(CSV_HEADER)?;
    for txn in transactions {
        writer.write_record([
            txn.id.to_string(),
            txn.user_id.to_string(),
            txn.kind.as_str().to_string(),
            format!("{:.2}", txn.amount),
            txn.category.clone(),
            txn.description.clone().unwrap_or_default(),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| LedgerError::Io(std::io::Error::other(err.to_string())))
}
