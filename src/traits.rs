//! Traits for ledger access abstraction

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repair::InferenceRule;
use crate::types::*;

/// Scope predicate for filtered queries and repair runs:
/// equality on business centre, range on date. A field left as `None`
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    /// Restrict to one business centre
    pub centre_id: Option<String>,
    /// Inclusive lower bound on the row date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the row date
    pub to: Option<NaiveDate>,
}

impl Scope {
    /// Scope matching every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a single business centre
    pub fn for_centre(centre_id: impl Into<String>) -> Self {
        Self {
            centre_id: Some(centre_id.into()),
            ..Self::default()
        }
    }

    /// Add an inclusive date range
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Whether a row with the given date falls inside the range
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// Whether a row owned by the given centre (possibly unassigned) matches
    pub fn matches_centre(&self, centre_id: Option<&str>) -> bool {
        match &self.centre_id {
            Some(wanted) => centre_id == Some(wanted.as_str()),
            None => true,
        }
    }
}

/// Read-side ledger abstraction
///
/// This trait lets the reconciliation engine work against any backend
/// (PostgreSQL, SQLite, in-memory, etc.). Implementations supply immutable
/// snapshots; the engine never writes through this trait. Only genuine
/// access failures should surface as `ReconciliationError::Storage` —
/// inconsistent data is returned as-is for the engine to flag.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Get an invoice by ID
    async fn get_invoice(&self, invoice_id: &str) -> ReconciliationResult<Option<Invoice>>;

    /// Get the payments linked to an invoice, ordered by payment date
    async fn get_invoice_payments(&self, invoice_id: &str) -> ReconciliationResult<Vec<Payment>>;

    /// Get a cash-register operation by ID
    async fn get_operation(&self, operation_id: &str)
        -> ReconciliationResult<Option<CashOperation>>;

    /// Get a cash session by ID
    async fn get_cash_session(&self, session_id: &str)
        -> ReconciliationResult<Option<CashSession>>;

    /// Get all cash-register operations recorded in a session
    async fn get_session_operations(
        &self,
        session_id: &str,
    ) -> ReconciliationResult<Vec<CashOperation>>;

    /// Get all expenses paid from a session's drawer
    async fn get_session_expenses(&self, session_id: &str) -> ReconciliationResult<Vec<Expense>>;

    /// Get the sessions currently open on a register
    async fn get_open_sessions(&self, register_id: &str) -> ReconciliationResult<Vec<CashSession>>;

    /// List expenses matching a scope (centre equality, date range)
    async fn list_expenses(&self, scope: &Scope) -> ReconciliationResult<Vec<Expense>>;

    /// Find invoices in scope whose business-centre linkage is null
    async fn find_invoices_missing_centre(
        &self,
        scope: &Scope,
    ) -> ReconciliationResult<Vec<Invoice>>;

    /// Infer the business centre an invoice should belong to, following the
    /// given rule transitively through linked rows. Returns `None` when the
    /// linkage chain is broken and nothing can be inferred.
    async fn infer_centre(
        &self,
        invoice_id: &str,
        rule: InferenceRule,
    ) -> ReconciliationResult<Option<String>>;
}

/// Write-side ledger abstraction, used only by the repair operation
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Assign a business centre to an invoice whose linkage is null.
    ///
    /// Returns `true` if the row was updated, `false` if the invoice already
    /// carries a non-null centre (existing values are never overwritten).
    async fn set_invoice_centre(
        &mut self,
        invoice_id: &str,
        centre_id: &str,
    ) -> ReconciliationResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_matches_everything() {
        let scope = Scope::all();
        assert!(scope.matches_date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
        assert!(scope.matches_centre(Some("centre-1")));
        assert!(scope.matches_centre(None));
    }

    #[test]
    fn date_range_is_inclusive() {
        let scope = Scope::all().between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert!(scope.matches_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(scope.matches_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!scope.matches_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(!scope.matches_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn centre_scope_excludes_unassigned_rows() {
        let scope = Scope::for_centre("centre-1");
        assert!(scope.matches_centre(Some("centre-1")));
        assert!(!scope.matches_centre(Some("centre-2")));
        assert!(!scope.matches_centre(None));
    }
}
