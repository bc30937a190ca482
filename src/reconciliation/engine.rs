//! Pure reconciliation computations
//!
//! Every function here operates on an already-fetched, immutable snapshot:
//! no I/O, no mutation, deterministic results independent of row ordering.

use bigdecimal::BigDecimal;

use crate::types::{CashOperation, InvoiceType, Payment};

/// Kinds of payment/operation inconsistency the engine can detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MismatchKind {
    /// The payment's mode affects the cash drawer but no cash-register
    /// operation is linked
    MissingOperation,
    /// The linked operation records a different payment means than the
    /// payment itself
    ModeMismatch,
}

/// Compute the authoritative outstanding balance (reste à payer) of an
/// invoice from its total and linked payments.
///
/// Payments are summed and subtracted from the total; for credit notes the
/// sign convention inverts and the sum is added instead. Amounts are stored
/// positive uniformly, so the inversion lives here rather than in the data.
/// An invoice with zero payments returns the total unchanged.
///
/// Precondition: all payments reference the same invoice. The caller
/// (normally [`crate::reconciliation::Auditor`]) checks this; pure summation
/// cannot.
pub fn compute_outstanding(
    total: &BigDecimal,
    payments: &[Payment],
    invoice_type: InvoiceType,
) -> BigDecimal {
    let paid: BigDecimal = payments.iter().map(|p| &p.amount).sum();
    match invoice_type {
        InvoiceType::CreditNote => total + paid,
        InvoiceType::Sale | InvoiceType::Purchase => total - paid,
    }
}

/// Compute current cash-on-hand for a session:
/// opening float + internal total − expense total.
///
/// No clamping: a negative result is valid (and alarming) data, not an
/// error.
pub fn compute_cash_on_hand(
    opening_float: &BigDecimal,
    internal_total: &BigDecimal,
    expense_total: &BigDecimal,
) -> BigDecimal {
    opening_float + internal_total - expense_total
}

/// Check a payment against its (possibly absent) cash-register operation.
///
/// Returns `MissingOperation` when no operation is linked and the payment's
/// mode requires one, `ModeMismatch` when the linked operation's recorded
/// means differs from the payment's mode, and `None` otherwise. The engine
/// reports; it never fixes.
pub fn detect_payment_operation_mismatch(
    payment: &Payment,
    operation: Option<&CashOperation>,
) -> Option<MismatchKind> {
    match operation {
        None => {
            if payment.mode.requires_operation() {
                Some(MismatchKind::MissingOperation)
            } else {
                None
            }
        }
        Some(op) => {
            if op.means != payment.mode {
                Some(MismatchKind::ModeMismatch)
            } else {
                None
            }
        }
    }
}

/// Whether a persisted value has drifted from the computed one beyond
/// `tolerance`.
///
/// The tolerance absorbs rounding noise in fields that were persisted
/// through floating point by legacy writers; a flagged drift means the
/// stored field is stale and must be recomputed, never silently trusted.
pub fn detect_drift(
    stored: &BigDecimal,
    computed: &BigDecimal,
    tolerance: &BigDecimal,
) -> bool {
    (stored - computed).abs() > tolerance.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMode;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn payment(invoice_id: &str, amount: &str, mode: PaymentMode) -> Payment {
        Payment::new(
            invoice_id.to_string(),
            BigDecimal::from_str(amount).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            mode,
        )
    }

    #[test]
    fn outstanding_is_total_minus_payments() {
        let payments = vec![
            payment("F-1", "500.00", PaymentMode::Especes),
            payment("F-1", "500.00", PaymentMode::Cheque),
        ];
        let outstanding = compute_outstanding(
            &BigDecimal::from_str("1500.00").unwrap(),
            &payments,
            InvoiceType::Sale,
        );
        assert_eq!(outstanding, BigDecimal::from_str("500.00").unwrap());
    }

    #[test]
    fn outstanding_is_independent_of_payment_ordering() {
        let total = BigDecimal::from_str("1000.00").unwrap();
        let a = payment("F-1", "300.00", PaymentMode::Especes);
        let b = payment("F-1", "150.50", PaymentMode::Carte);
        let c = payment("F-1", "49.50", PaymentMode::Virement);

        let forward = compute_outstanding(
            &total,
            &[a.clone(), b.clone(), c.clone()],
            InvoiceType::Sale,
        );
        let reversed = compute_outstanding(&total, &[c, b, a], InvoiceType::Sale);
        assert_eq!(forward, reversed);
        assert_eq!(forward, BigDecimal::from_str("500.00").unwrap());
    }

    #[test]
    fn zero_payments_leave_total_unchanged() {
        let total = BigDecimal::from_str("250.00").unwrap();
        assert_eq!(compute_outstanding(&total, &[], InvoiceType::Sale), total);
        assert_eq!(
            compute_outstanding(&total, &[], InvoiceType::CreditNote),
            total
        );
    }

    #[test]
    fn credit_note_inverts_payment_sign() {
        let payments = vec![payment("A-1", "200.00", PaymentMode::Virement)];
        let outstanding = compute_outstanding(
            &BigDecimal::from_str("1000.00").unwrap(),
            &payments,
            InvoiceType::CreditNote,
        );
        assert_eq!(outstanding, BigDecimal::from_str("1200.00").unwrap());
    }

    #[test]
    fn cash_on_hand_is_linear() {
        let cash = compute_cash_on_hand(
            &BigDecimal::from_str("1000.00").unwrap(),
            &BigDecimal::from_str("2300.00").unwrap(),
            &BigDecimal::from_str("2800.00").unwrap(),
        );
        assert_eq!(cash, BigDecimal::from_str("500.00").unwrap());
    }

    #[test]
    fn cash_on_hand_may_be_negative() {
        let cash = compute_cash_on_hand(
            &BigDecimal::from(100),
            &BigDecimal::from(50),
            &BigDecimal::from(400),
        );
        assert_eq!(cash, BigDecimal::from(-250));
    }

    #[test]
    fn cash_payment_without_operation_is_missing() {
        let p = payment("F-1", "100.00", PaymentMode::Especes);
        assert_eq!(
            detect_payment_operation_mismatch(&p, None),
            Some(MismatchKind::MissingOperation)
        );
    }

    #[test]
    fn transfer_without_operation_is_fine() {
        let p = payment("F-1", "100.00", PaymentMode::Virement);
        assert_eq!(detect_payment_operation_mismatch(&p, None), None);
    }

    #[test]
    fn mode_mismatch_between_payment_and_operation() {
        let p = payment("F-1", "100.00", PaymentMode::Especes);
        let op = CashOperation {
            id: "OP-1".to_string(),
            payment_id: p.id.clone(),
            amount: p.amount.clone(),
            means: PaymentMode::Cheque,
            session_id: "J-1".to_string(),
        };
        assert_eq!(
            detect_payment_operation_mismatch(&p, Some(&op)),
            Some(MismatchKind::ModeMismatch)
        );
    }

    #[test]
    fn matching_modes_produce_no_finding() {
        let p = payment("F-1", "100.00", PaymentMode::Cheque);
        let op = CashOperation {
            id: "OP-1".to_string(),
            payment_id: p.id.clone(),
            amount: p.amount.clone(),
            means: PaymentMode::Cheque,
            session_id: "J-1".to_string(),
        };
        assert_eq!(detect_payment_operation_mismatch(&p, Some(&op)), None);
    }

    #[test]
    fn drift_respects_tolerance() {
        let stored = BigDecimal::from_str("500.00").unwrap();
        let computed = BigDecimal::from_str("500.0001").unwrap();

        let loose = BigDecimal::from_str("0.01").unwrap();
        let tight = BigDecimal::from_str("0.00001").unwrap();

        assert!(!detect_drift(&stored, &computed, &loose));
        assert!(detect_drift(&stored, &computed, &tight));
    }

    #[test]
    fn drift_is_symmetric() {
        let a = BigDecimal::from_str("100.00").unwrap();
        let b = BigDecimal::from_str("99.00").unwrap();
        let tol = BigDecimal::from_str("0.5").unwrap();
        assert!(detect_drift(&a, &b, &tol));
        assert!(detect_drift(&b, &a, &tol));
    }
}
