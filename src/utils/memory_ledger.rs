//! In-memory ledger implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::repair::InferenceRule;
use crate::traits::{LedgerReader, LedgerWriter, Scope};
use crate::types::*;

/// In-memory ledger for tests and development.
///
/// Clones share the underlying tables, so a handle can be kept to inspect
/// state after another handle has been moved into an auditor or repair
/// runner.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    payments: Arc<RwLock<HashMap<String, Payment>>>,
    operations: Arc<RwLock<HashMap<String, CashOperation>>>,
    sessions: Arc<RwLock<HashMap<String, CashSession>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    schedules: Arc<RwLock<HashMap<String, DueSchedule>>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all tables (useful for testing)
    pub fn clear(&self) {
        self.invoices.write().unwrap().clear();
        self.payments.write().unwrap().clear();
        self.operations.write().unwrap().clear();
        self.sessions.write().unwrap().clear();
        self.expenses.write().unwrap().clear();
        self.schedules.write().unwrap().clear();
    }

    /// Insert or replace an invoice
    pub fn insert_invoice(&self, invoice: Invoice) {
        self.invoices
            .write()
            .unwrap()
            .insert(invoice.id.clone(), invoice);
    }

    /// Insert or replace a payment
    pub fn insert_payment(&self, payment: Payment) {
        self.payments
            .write()
            .unwrap()
            .insert(payment.id.clone(), payment);
    }

    /// Insert or replace a cash-register operation
    pub fn insert_operation(&self, operation: CashOperation) {
        self.operations
            .write()
            .unwrap()
            .insert(operation.id.clone(), operation);
    }

    /// Insert or replace a cash session
    pub fn insert_session(&self, session: CashSession) {
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    /// Insert or replace an expense
    pub fn insert_expense(&self, expense: Expense) {
        self.expenses
            .write()
            .unwrap()
            .insert(expense.id.clone(), expense);
    }

    /// Insert or replace a due-schedule row
    pub fn insert_schedule(&self, schedule: DueSchedule) {
        self.schedules
            .write()
            .unwrap()
            .insert(schedule.id.clone(), schedule);
    }
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn get_invoice(&self, invoice_id: &str) -> ReconciliationResult<Option<Invoice>> {
        Ok(self.invoices.read().unwrap().get(invoice_id).cloned())
    }

    async fn get_invoice_payments(&self, invoice_id: &str) -> ReconciliationResult<Vec<Payment>> {
        let payments = self.payments.read().unwrap();
        let mut linked: Vec<Payment> = payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect();
        linked.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(linked)
    }

    async fn get_operation(
        &self,
        operation_id: &str,
    ) -> ReconciliationResult<Option<CashOperation>> {
        Ok(self.operations.read().unwrap().get(operation_id).cloned())
    }

    async fn get_cash_session(
        &self,
        session_id: &str,
    ) -> ReconciliationResult<Option<CashSession>> {
        Ok(self.sessions.read().unwrap().get(session_id).cloned())
    }

    async fn get_session_operations(
        &self,
        session_id: &str,
    ) -> ReconciliationResult<Vec<CashOperation>> {
        let operations = self.operations.read().unwrap();
        Ok(operations
            .values()
            .filter(|op| op.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn get_session_expenses(&self, session_id: &str) -> ReconciliationResult<Vec<Expense>> {
        let expenses = self.expenses.read().unwrap();
        Ok(expenses
            .values()
            .filter(|e| e.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect())
    }

    async fn get_open_sessions(&self, register_id: &str) -> ReconciliationResult<Vec<CashSession>> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions
            .values()
            .filter(|s| s.register_id == register_id && s.status == SessionStatus::Open)
            .cloned()
            .collect())
    }

    async fn list_expenses(&self, scope: &Scope) -> ReconciliationResult<Vec<Expense>> {
        let expenses = self.expenses.read().unwrap();
        Ok(expenses
            .values()
            .filter(|e| scope.matches_centre(Some(&e.centre_id)) && scope.matches_date(e.date))
            .cloned()
            .collect())
    }

    async fn find_invoices_missing_centre(
        &self,
        scope: &Scope,
    ) -> ReconciliationResult<Vec<Invoice>> {
        // Candidate rows have no centre by definition, so only the date
        // component of the scope applies here
        let invoices = self.invoices.read().unwrap();
        Ok(invoices
            .values()
            .filter(|inv| inv.centre_id.is_none() && scope.matches_date(inv.issue_date))
            .cloned()
            .collect())
    }

    async fn infer_centre(
        &self,
        invoice_id: &str,
        rule: InferenceRule,
    ) -> ReconciliationResult<Option<String>> {
        match rule {
            InferenceRule::DueSchedule => {
                let schedules = self.schedules.read().unwrap();
                let mut rows: Vec<&DueSchedule> = schedules
                    .values()
                    .filter(|s| s.invoice_id == invoice_id)
                    .collect();
                rows.sort_by_key(|s| s.due_date);
                Ok(rows.iter().find_map(|s| s.centre_id.clone()))
            }
            InferenceRule::LinkedExpense => {
                // invoice -> payments -> operation -> session -> expenses
                let payments = self.get_invoice_payments(invoice_id).await?;
                for payment in payments {
                    let Some(op_id) = payment.operation_id else {
                        continue;
                    };
                    let Some(operation) = self.get_operation(&op_id).await? else {
                        continue;
                    };
                    let mut expenses = self.get_session_expenses(&operation.session_id).await?;
                    expenses.sort_by(|a, b| a.id.cmp(&b.id));
                    if let Some(expense) = expenses.first() {
                        return Ok(Some(expense.centre_id.clone()));
                    }
                }
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl LedgerWriter for MemoryLedger {
    async fn set_invoice_centre(
        &mut self,
        invoice_id: &str,
        centre_id: &str,
    ) -> ReconciliationResult<bool> {
        let mut invoices = self.invoices.write().unwrap();
        let invoice = invoices
            .get_mut(invoice_id)
            .ok_or_else(|| ReconciliationError::InvoiceNotFound(invoice_id.to_string()))?;

        // Nulls only; existing assignments are authoritative
        if invoice.centre_id.is_some() {
            return Ok(false);
        }

        invoice.centre_id = Some(centre_id.to_string());
        invoice.updated_at = chrono::Utc::now().naive_utc();
        Ok(true)
    }
}
