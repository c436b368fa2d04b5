pub mod clock;
pub mod ledger_store;
pub mod period;
pub mod services;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger_store::LedgerStore;
pub use period::{PeriodToken, ResolvedPeriod};
