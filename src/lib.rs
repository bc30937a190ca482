//! # Reconciliation Core
//!
//! A library for reconciling a retail ledger: invoices (factures), payments
//! (paiements), cash-register operations, cash sessions (journées), and
//! expenses (dépenses).
//!
//! ## Features
//!
//! - **Outstanding balances**: authoritative reste à payer recomputed from
//!   linked payments, with the sign inversion credit notes require
//! - **Cash-on-hand**: opening float + internal total − expense total for a
//!   session, recomputed from the underlying rows
//! - **Integrity findings**: stored-vs-computed drift, payment/operation
//!   mode mismatches, missing cash-register operations, and multiple open
//!   sessions on one register, reported as data rather than raised
//! - **Repair/backfill**: an explicit, operator-invoked operation that fills
//!   missing business-centre linkage, nulls only, idempotently
//! - **Storage abstraction**: database-agnostic via the [`LedgerReader`]
//!   and [`LedgerWriter`] traits
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{Auditor, MemoryLedger};
//!
//! // Any LedgerReader implementation works; MemoryLedger is built in
//! let auditor = Auditor::new(MemoryLedger::new());
//! ```

pub mod reconciliation;
pub mod repair;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::*;
pub use repair::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_ledger::MemoryLedger;
