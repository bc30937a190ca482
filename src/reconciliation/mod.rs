//! Reconciliation module: pure balance computations, integrity findings,
//! and the auditor that runs them over a ledger snapshot

pub mod auditor;
pub mod engine;
pub mod findings;

pub use auditor::*;
pub use engine::*;
pub use findings::*;
