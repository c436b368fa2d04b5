#![doc(test(attr(deny(warnings))))]

//! Fintrack Core records personal income and expenses, tracks per-category budgets, and derives
//! balances, period reports, chart data, and exports from the stored ledger. A conversational
//! layer turns menu presses and typed messages into ledger operations.

pub mod cli;
pub mod config;
pub mod core;
pub mod dialogue;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
