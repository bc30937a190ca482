//! Structured findings emitted by the auditor
//!
//! A finding is data for the reporting layer (kind, entity, expected vs.
//! actual), not an error: the engine reports inconsistencies, it never
//! raises on them and never corrects them.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::PaymentMode;

/// Integrity problem categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    /// An invoice's persisted outstanding balance disagrees with the value
    /// recomputed from its payments beyond tolerance
    OutstandingDrift,
    /// A session's persisted running total disagrees with the value
    /// recomputed from its operations or expenses beyond tolerance
    SessionTotalDrift,
    /// A linked cash-register operation records a different payment means
    /// than its payment
    ModeMismatch,
    /// A drawer-affecting payment has no linked cash-register operation
    MissingOperation,
    /// More than one session is open on a single register
    MultipleOpenSessions,
}

/// One detected inconsistency, ready for the reporting layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// What category of problem this is
    pub kind: FindingKind,
    /// The entity the finding is about (invoice, payment, session, register)
    pub entity_id: String,
    /// Expected value, where the finding is numeric
    pub expected: Option<BigDecimal>,
    /// Actual (persisted) value, where the finding is numeric
    pub actual: Option<BigDecimal>,
    /// Human-readable context for the report
    pub detail: String,
}

impl Finding {
    /// Stored outstanding balance diverges from the recomputed one
    pub fn outstanding_drift(invoice_id: &str, computed: BigDecimal, stored: BigDecimal) -> Self {
        Self {
            kind: FindingKind::OutstandingDrift,
            entity_id: invoice_id.to_string(),
            detail: format!(
                "Invoice {}: stored outstanding {} but payments give {}",
                invoice_id, stored, computed
            ),
            expected: Some(computed),
            actual: Some(stored),
        }
    }

    /// A session running total diverges from the recomputed one
    pub fn session_total_drift(
        session_id: &str,
        which: &str,
        computed: BigDecimal,
        stored: BigDecimal,
    ) -> Self {
        Self {
            kind: FindingKind::SessionTotalDrift,
            entity_id: session_id.to_string(),
            detail: format!(
                "Session {}: stored {} {} but ledger rows give {}",
                session_id, which, stored, computed
            ),
            expected: Some(computed),
            actual: Some(stored),
        }
    }

    /// Payment and linked operation record different means
    pub fn mode_mismatch(payment_id: &str, payment_mode: PaymentMode, means: PaymentMode) -> Self {
        Self {
            kind: FindingKind::ModeMismatch,
            entity_id: payment_id.to_string(),
            expected: None,
            actual: None,
            detail: format!(
                "Payment {} has mode {:?} but its operation records {:?}",
                payment_id, payment_mode, means
            ),
        }
    }

    /// Drawer-affecting payment with no cash-register operation
    pub fn missing_operation(payment_id: &str, payment_mode: PaymentMode) -> Self {
        Self {
            kind: FindingKind::MissingOperation,
            entity_id: payment_id.to_string(),
            expected: None,
            actual: None,
            detail: format!(
                "Payment {} ({:?}) has no linked cash-register operation",
                payment_id, payment_mode
            ),
        }
    }

    /// Several sessions open at once on one register
    pub fn multiple_open_sessions(register_id: &str, count: usize) -> Self {
        Self {
            kind: FindingKind::MultipleOpenSessions,
            entity_id: register_id.to_string(),
            expected: Some(BigDecimal::from(1)),
            actual: Some(BigDecimal::from(count as i64)),
            detail: format!("Register {} has {} sessions open", register_id, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn drift_finding_carries_expected_and_actual() {
        let f = Finding::outstanding_drift(
            "F-9",
            BigDecimal::from_str("500.00").unwrap(),
            BigDecimal::from_str("480.00").unwrap(),
        );
        assert_eq!(f.kind, FindingKind::OutstandingDrift);
        assert_eq!(f.entity_id, "F-9");
        assert_eq!(f.expected, Some(BigDecimal::from_str("500.00").unwrap()));
        assert_eq!(f.actual, Some(BigDecimal::from_str("480.00").unwrap()));
    }

    #[test]
    fn findings_serialize_for_the_reporting_layer() {
        let f = Finding::missing_operation("P-1", PaymentMode::Especes);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "MissingOperation");
        assert_eq!(json["entity_id"], "P-1");
    }
}
