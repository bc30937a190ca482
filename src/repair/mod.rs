//! Repair/backfill operation for missing business-centre linkage
//!
//! Unlike the auditor, this module writes. It is invoked deliberately by an
//! operator, fills NULL centre assignments only, and must be the only
//! writer in its scope while it runs (callers serialize repair runs by
//! centre and date range; no row locking is assumed).

use serde::{Deserialize, Serialize};

use crate::traits::{LedgerReader, LedgerWriter, Scope};
use crate::types::*;
use crate::utils::validation::validate_scope;

/// How a missing business centre is inferred for an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InferenceRule {
    /// Centre of an expense reached through the invoice's payments and
    /// their cash session
    LinkedExpense,
    /// Centre recorded on the invoice's due-date schedule rows
    DueSchedule,
}

/// Outcome of one repair run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Candidate rows in scope (invoices with a null centre)
    pub matched: usize,
    /// Rows actually written
    pub updated: usize,
}

impl RepairOutcome {
    /// Whether the run found nothing to do. Not an error, merely empty.
    pub fn is_noop(&self) -> bool {
        self.updated == 0
    }
}

/// Runner for the backfill operation over any ledger backend
pub struct RepairRunner<S: LedgerReader + LedgerWriter> {
    ledger: S,
}

impl<S: LedgerReader + LedgerWriter> RepairRunner<S> {
    /// Create a runner over the given ledger handle
    pub fn new(ledger: S) -> Self {
        Self { ledger }
    }

    /// Recover the ledger handle
    pub fn into_inner(self) -> S {
        self.ledger
    }

    /// Find invoices in scope whose business-centre linkage is null, infer
    /// the centre through the given rule, and assign it.
    ///
    /// Each update is a single authoritative write. Non-null values are
    /// never overwritten, so re-running with the same scope after a
    /// successful repair updates zero rows.
    pub async fn backfill_invoice_centres(
        &mut self,
        scope: &Scope,
        rule: InferenceRule,
    ) -> ReconciliationResult<RepairOutcome> {
        validate_scope(scope)?;

        let candidates = self.ledger.find_invoices_missing_centre(scope).await?;
        let matched = candidates.len();
        let mut updated = 0;

        for invoice in candidates {
            // Query contract: candidates carry no centre. Re-check anyway so
            // a misbehaving reader cannot make us clobber a value.
            if invoice.centre_id.is_some() {
                continue;
            }
            if let Some(centre_id) = self.ledger.infer_centre(&invoice.id, rule).await? {
                if self.ledger.set_invoice_centre(&invoice.id, &centre_id).await? {
                    updated += 1;
                }
            }
        }

        Ok(RepairOutcome { matched, updated })
    }
}
