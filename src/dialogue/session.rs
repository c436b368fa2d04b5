//! Per-user conversation state and where it is kept between events.

use std::{collections::HashMap, sync::Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::ledger::{BudgetPeriod, TransactionKind};

/// Where a user currently is inside a multi-step flow. Each variant carries exactly the data
/// gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Idle,
    ChoosingCategory {
        kind: TransactionKind,
    },
    ChoosingDate {
        kind: TransactionKind,
        category: String,
    },
    EnteringAmount {
        kind: TransactionKind,
        category: String,
        date: NaiveDate,
    },
    EnteringDescription {
        kind: TransactionKind,
        category: String,
        date: NaiveDate,
        amount: Decimal,
    },
    BudgetCategory,
    BudgetPeriod {
        category: String,
    },
    BudgetAmount {
        category: String,
        period: BudgetPeriod,
    },
}

impl DialogueState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }
}

/// Storage for dialogue states keyed by user id.
pub trait SessionStore: Send + Sync {
    fn load(&self, user_id: i64) -> DialogueState;
    fn save(&self, user_id: i64, state: DialogueState);
    fn reset(&self, user_id: i64);
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<i64, DialogueState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, user_id: i64) -> DialogueState {
        match self.sessions.lock() {
            Ok(map) => map.get(&user_id).cloned().unwrap_or_default(),
            Err(_) => {
                error!(user_id, "session store poisoned; treating user as idle");
                DialogueState::Idle
            }
        }
    }

    fn save(&self, user_id: i64, state: DialogueState) {
        match self.sessions.lock() {
            Ok(mut map) => {
                if state.is_idle() {
                    map.remove(&user_id);
                } else {
                    map.insert(user_id, state);
                }
            }
            Err(_) => error!(user_id, ?state, "session store poisoned; state not saved"),
        }
    }

    fn reset(&self, user_id: i64) {
        if self.sessions.lock().map(|mut map| map.remove(&user_id)).is_err() {
            error!(user_id, "session store poisoned; state not reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_store_degrades_to_idle() {
        let store = std::sync::Arc::new(MemorySessionStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.lock().unwrap();
            panic!("poison the session map");
        })
        .join();

        store.save(1, DialogueState::BudgetCategory);
        store.reset(1);
        assert_eq!(store.load(1), DialogueState::Idle);
    }

    #[test]
    fn unknown_user_starts_idle() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load(1), DialogueState::Idle);
    }

    #[test]
    fn states_are_isolated_per_user() {
        let store = MemorySessionStore::new();
        store.save(
            1,
            DialogueState::ChoosingCategory {
                kind: TransactionKind::Income,
            },
        );
        store.save(2, DialogueState::BudgetCategory);
        assert_eq!(store.load(2), DialogueState::BudgetCategory);
        store.reset(1);
        assert!(store.load(1).is_idle());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn saving_idle_drops_the_entry() {
        let store = MemorySessionStore::new();
        store.save(5, DialogueState::BudgetCategory);
        store.save(5, DialogueState::Idle);
        assert!(store.is_empty());
    }
}
