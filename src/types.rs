//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Invoice kinds handled by the reconciliation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Sale-side invoice (facture client)
    Sale,
    /// Purchase-side invoice (facture fournisseur)
    Purchase,
    /// Credit note issued instead of deleting an invoice; payment sign inverts
    CreditNote,
}

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Issued,
    PartiallyPaid,
    Paid,
    Cancelled,
}

/// Payment means recorded on a payment or cash-register operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash (espèces)
    Especes,
    /// Check (chèque)
    Cheque,
    /// Card (carte bancaire)
    Carte,
    /// Bank transfer (virement)
    Virement,
}

impl PaymentMode {
    /// Whether this mode affects the physical cash drawer and therefore
    /// requires a matching cash-register operation.
    /// Cash and checks pass through the drawer; cards and transfers settle
    /// directly with the bank.
    pub fn requires_operation(&self) -> bool {
        matches!(self, PaymentMode::Especes | PaymentMode::Cheque)
    }
}

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Settled,
    Cancelled,
}

/// Cash-session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Open,
    Closed,
}

/// An invoice row as read from the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier for the invoice
    pub id: String,
    /// Sale, purchase, or credit note
    pub invoice_type: InvoiceType,
    /// Lifecycle status
    pub status: InvoiceStatus,
    /// Total amount, tax included
    pub total: BigDecimal,
    /// Persisted outstanding balance (reste à payer); may be stale
    pub outstanding: BigDecimal,
    /// Date the invoice was issued
    pub issue_date: NaiveDate,
    /// Owning client or supplier
    pub party_id: String,
    /// Owning business centre; null in legacy rows, filled by the repair
    /// operation
    pub centre_id: Option<String>,
    /// When the row was created
    pub created_at: NaiveDateTime,
    /// When the row was last updated
    pub updated_at: NaiveDateTime,
}

impl Invoice {
    /// Create a new invoice with outstanding equal to the total
    pub fn new(
        id: String,
        invoice_type: InvoiceType,
        total: BigDecimal,
        issue_date: NaiveDate,
        party_id: String,
        centre_id: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            invoice_type,
            status: InvoiceStatus::Issued,
            outstanding: total.clone(),
            total,
            issue_date,
            party_id,
            centre_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A payment row linked to exactly one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier for the payment
    pub id: String,
    /// The invoice this payment settles (exactly one)
    pub invoice_id: String,
    /// Amount paid; stored positive regardless of invoice type
    pub amount: BigDecimal,
    /// Date the payment was taken
    pub date: NaiveDate,
    /// Payment means
    pub mode: PaymentMode,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// Linked cash-register operation, if the mode requires one.
    /// A None here for a drawer-affecting mode is a reportable defect.
    pub operation_id: Option<String>,
}

impl Payment {
    /// Create a settled payment with a fresh identifier
    pub fn new(invoice_id: String, amount: BigDecimal, date: NaiveDate, mode: PaymentMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_id,
            amount,
            date,
            mode,
            status: PaymentStatus::Settled,
            operation_id: None,
        }
    }

    /// Attach the cash-register operation created for this payment
    pub fn with_operation(mut self, operation_id: String) -> Self {
        self.operation_id = Some(operation_id);
        self
    }
}

/// A cash-register operation recording a drawer movement for a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashOperation {
    /// Unique identifier for the operation
    pub id: String,
    /// The payment that originated this operation
    pub payment_id: String,
    /// Amount moved through the drawer
    pub amount: BigDecimal,
    /// Payment means as recorded at the register; must match the payment's
    /// mode
    pub means: PaymentMode,
    /// The cash session this operation belongs to
    pub session_id: String,
}

/// One open/close day of a physical cash register (journée de caisse)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashSession {
    /// Unique identifier for the session
    pub id: String,
    /// The physical register (caisse) this session belongs to
    pub register_id: String,
    /// Float counted into the drawer at opening
    pub opening_float: BigDecimal,
    /// Persisted running total of drawer-affecting operations
    pub internal_total: BigDecimal,
    /// Persisted running total of expenses paid from the drawer
    pub expense_total: BigDecimal,
    /// Open or closed
    pub status: SessionStatus,
    /// When the session was opened
    pub opened_at: NaiveDateTime,
    /// When the session was closed, if it has been
    pub closed_at: Option<NaiveDateTime>,
}

impl CashSession {
    /// Open a new session with the given float
    pub fn open(id: String, register_id: String, opening_float: BigDecimal) -> Self {
        Self {
            id,
            register_id,
            opening_float,
            internal_total: BigDecimal::from(0),
            expense_total: BigDecimal::from(0),
            status: SessionStatus::Open,
            opened_at: chrono::Utc::now().naive_utc(),
            closed_at: None,
        }
    }
}

/// An expense row paid from a cash session's drawer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for the expense
    pub id: String,
    /// Amount spent
    pub amount: BigDecimal,
    /// Reporting category (e.g. "FOURNITURES", "TRANSPORT")
    pub category: String,
    /// Date the expense was recorded
    pub date: NaiveDate,
    /// Owning business centre
    pub centre_id: String,
    /// The cash session the expense was paid from, if any
    pub session_id: Option<String>,
}

/// One row of an invoice's due-date schedule (échéancier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueSchedule {
    /// Unique identifier for the schedule row
    pub id: String,
    /// The invoice this schedule row belongs to
    pub invoice_id: String,
    /// Date the installment falls due
    pub due_date: NaiveDate,
    /// Amount due at that date
    pub amount: BigDecimal,
    /// Business centre recorded on the schedule row; used to infer a missing
    /// centre on the invoice itself
    pub centre_id: Option<String>,
}

/// Errors that can occur in the reconciliation system.
///
/// Data inconsistency is NOT an error here: stored-vs-computed drift and
/// payment/operation mismatches come back as findings. Only genuine access
/// failures and precondition breaches surface through this enum.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Cash session not found: {0}")]
    SessionNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
