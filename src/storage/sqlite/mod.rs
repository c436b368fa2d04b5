//! `SQLite` storage backend: pooled connections, migrations, and row mapping.

pub mod connection;
pub mod migrations;

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    OptionalExtension, Row,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::errors::{LedgerError, Result};
use crate::ledger::{
    money, Balance, Budget, BudgetPeriod, BudgetSpend, CategoryTotal, DateRange, NewTransaction,
    Transaction, TransactionKind, User,
};

use super::{StorageBackend, TransactionFilter, TransactionPage};

pub use connection::{ConnectionConfig, ConnectionPool};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount_cents, category, description, date, created_at";
const BUDGET_COLUMNS: &str = "id, user_id, category, amount_cents, period, created_at";
const NEWEST_FIRST: &str = "ORDER BY date DESC, created_at DESC, id DESC";

/// Ledger persistence over a pooled `SQLite` database.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: ConnectionPool,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and applies pending migrations.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Self {
            pool: connection::open_file(path, config)?,
        };
        let applied = storage.ensure_schema()?;
        info!(path = %path.display(), applied, "ledger database opened");
        Ok(storage)
    }

    /// Opens a throwaway in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        let storage = Self {
            pool: connection::open_in_memory(&ConnectionConfig::default())?,
        };
        storage.ensure_schema()?;
        Ok(storage)
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl StorageBackend for SqliteStorage {
    fn ensure_schema(&self) -> Result<u32> {
        let conn = self.pool.get()?;
        migrations::run_migrations(&conn)
    }

    fn upsert_user(&self, user_id: i64, username: Option<&str>, now: NaiveDateTime) -> Result<()> {
        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (user_id, username, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, username, now],
        )?;
        if inserted > 0 {
            debug!(user_id, "registered new user");
        }
        Ok(())
    }

    fn user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT user_id, username, created_at FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn insert_transaction(
        &self,
        draft: &NewTransaction,
        date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Result<i64> {
        let cents = minor_units(draft.amount)?;
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO transactions (user_id, type, amount_cents, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                draft.user_id,
                draft.kind.as_str(),
                cents,
                draft.category,
                draft.description,
                date,
                created_at
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, user_id = draft.user_id, kind = %draft.kind, "transaction stored");
        Ok(id)
    }

    fn transaction(&self, id: i64, user_id: i64) -> Result<Option<Transaction>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
        );
        Ok(conn
            .query_row(&sql, params![id, user_id], transaction_from_row)
            .optional()?)
    }

    fn transactions(&self, user_id: i64, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?");
        let mut values = vec![Value::Integer(user_id)];
        if let Some(range) = filter.range {
            sql.push_str(" AND date >= ? AND date <= ?");
            values.push(Value::Text(range.start.to_string()));
            values.push(Value::Text(range.end.to_string()));
        }
        if let Some(kind) = filter.kind {
            sql.push_str(" AND type = ?");
            values.push(Value::Text(kind.as_str().to_string()));
        }
        sql.push(' ');
        sql.push_str(NEWEST_FIRST);

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), transaction_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn recent_transactions(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<TransactionPage> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let transactions = {
            let sql = format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?1 {NEWEST_FIRST} LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, limit, offset], transaction_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        let total: i64 = tx.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(TransactionPage {
            transactions,
            total_count: u64::try_from(total).unwrap_or_default(),
        })
    }

    fn balance(&self, user_id: i64) -> Result<Balance> {
        let conn = self.pool.get()?;
        let (income, expense): (i64, i64) = conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents ELSE 0 END), 0)
             FROM transactions WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(Balance::from_totals(
            money::from_minor_units(income),
            money::from_minor_units(expense),
        ))
    }

    fn category_summary(
        &self,
        user_id: i64,
        range: DateRange,
        kind: TransactionKind,
    ) -> Result<Vec<CategoryTotal>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT category, SUM(amount_cents) AS total, COUNT(*)
             FROM transactions
             WHERE user_id = ?1 AND type = ?2 AND date BETWEEN ?3 AND ?4
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )?;
        let rows = stmt.query_map(
            params![user_id, kind.as_str(), range.start, range.end],
            |row| {
                let count: i64 = row.get(2)?;
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: money::from_minor_units(row.get(1)?),
                    count: u32::try_from(count).unwrap_or(u32::MAX),
                })
            },
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn delete_transaction(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn upsert_budget(
        &self,
        user_id: i64,
        category: &str,
        limit: Decimal,
        period: BudgetPeriod,
        now: NaiveDateTime,
    ) -> Result<i64> {
        let cents = minor_units(limit)?;
        let conn = self.pool.get()?;
        let id = conn.query_row(
            "INSERT INTO budgets (user_id, category, amount_cents, period, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, category, period)
             DO UPDATE SET amount_cents = excluded.amount_cents
             RETURNING id",
            params![user_id, category, cents, period.as_str(), now],
            |row| row.get(0),
        )?;
        debug!(id, user_id, category, %period, "budget stored");
        Ok(id)
    }

    fn budgets(&self, user_id: i64, period: Option<BudgetPeriod>) -> Result<Vec<Budget>> {
        let conn = self.pool.get()?;
        let rows = match period {
            Some(period) => {
                let sql = format!(
                    "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1 AND period = ?2 ORDER BY id"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![user_id, period.as_str()], budget_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql =
                    format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1 ORDER BY id");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![user_id], budget_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(rows)
    }

    fn budget(&self, id: i64, user_id: i64) -> Result<Option<Budget>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1 AND user_id = ?2");
        Ok(conn
            .query_row(&sql, params![id, user_id], budget_from_row)
            .optional()?)
    }

    fn budget_spend(
        &self,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
        range: DateRange,
    ) -> Result<Option<BudgetSpend>> {
        let conn = self.pool.get()?;
        let spend = conn
            .query_row(
                "SELECT b.amount_cents,
                        (SELECT COALESCE(SUM(t.amount_cents), 0)
                           FROM transactions t
                          WHERE t.user_id = b.user_id
                            AND t.category = b.category
                            AND t.type = 'expense'
                            AND t.date BETWEEN ?4 AND ?5)
                   FROM budgets b
                  WHERE b.user_id = ?1 AND b.category = ?2 AND b.period = ?3",
                params![user_id, category, period.as_str(), range.start, range.end],
                |row| {
                    Ok(BudgetSpend {
                        limit: money::from_minor_units(row.get(0)?),
                        spent: money::from_minor_units(row.get(1)?),
                    })
                },
            )
            .optional()?;
        Ok(spend)
    }

    fn delete_budget(&self, id: i64, user_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(removed > 0)
    }
}

fn minor_units(amount: Decimal) -> Result<i64> {
    money::to_minor_units(amount)
        .ok_or_else(|| LedgerError::Validation(format!("amount {amount} is out of range")))
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(2)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: kind
            .parse::<TransactionKind>()
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?,
        amount: money::from_minor_units(row.get(3)?),
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let period: String = row.get(4)?;
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        limit: money::from_minor_units(row.get(3)?),
        period: period
            .parse::<BudgetPeriod>()
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn stamp(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn listing_orders_by_date_then_creation() {
        let storage = SqliteStorage::in_memory().unwrap();
        let older = NewTransaction::expense(1, Decimal::from(10), "Food");
        let a = storage.insert_transaction(&older, day(2), stamp(2, 9)).unwrap();
        let b = storage.insert_transaction(&older, day(3), stamp(3, 9)).unwrap();
        let c = storage.insert_transaction(&older, day(3), stamp(3, 10)).unwrap();

        let ids: Vec<i64> = storage
            .transactions(1, TransactionFilter::default())
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn recent_page_reports_total_count() {
        let storage = SqliteStorage::in_memory().unwrap();
        for d in 1..=7 {
            let draft = NewTransaction::income(5, Decimal::from(d), "Salary");
            storage.insert_transaction(&draft, day(d), stamp(d, 8)).unwrap();
        }
        let page = storage.recent_transactions(5, 5, 5).unwrap();
        assert_eq!(page.total_count, 7);
        assert_eq!(page.transactions.len(), 2);
        assert_eq!(page.transactions[0].date, day(2));
    }

    #[test]
    fn budget_spend_is_absent_without_budget() {
        let storage = SqliteStorage::in_memory().unwrap();
        let range = DateRange::new(day(1), day(30)).unwrap();
        assert_eq!(
            storage
                .budget_spend(1, "Food", BudgetPeriod::Month, range)
                .unwrap(),
            None
        );
        storage
            .upsert_budget(1, "Food", Decimal::from(500), BudgetPeriod::Month, stamp(1, 8))
            .unwrap();
        let spend = storage
            .budget_spend(1, "Food", BudgetPeriod::Month, range)
            .unwrap()
            .unwrap();
        assert_eq!(spend.limit, Decimal::from(500));
        assert_eq!(spend.spent, Decimal::ZERO);
    }
}
