//! Translation of business events into journal entry input.
//!
//! The builder never validates; whatever it produces goes through the same
//! ledger validation as a manual entry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{ProductionJobId, round_money};

use super::events::{
    ExpenseRecorded, GoodsReceived, OrderInvoiced, PaymentReceived, ProductionCompleted,
    SupplierPaid,
};
use crate::accounts::{AccountCode, AccountMap};
use crate::ledger::{CreateJournalEntryInput, JournalEntryType, JournalLineInput, SourceRef};

/// Builds balanced entries against a resolved account map.
#[derive(Debug, Clone)]
pub struct PostingBuilder {
    accounts: AccountMap,
}

impl PostingBuilder {
    /// Creates a builder for `accounts`.
    #[must_use]
    pub const fn new(accounts: AccountMap) -> Self {
        Self { accounts }
    }

    /// The account map in use.
    #[must_use]
    pub const fn accounts(&self) -> &AccountMap {
        &self.accounts
    }

    fn debit(&self, code: AccountCode, amount: Decimal) -> JournalLineInput {
        JournalLineInput::debit(self.accounts.id(code), amount)
    }

    fn credit(&self, code: AccountCode, amount: Decimal) -> JournalLineInput {
        JournalLineInput::credit(self.accounts.id(code), amount)
    }

    /// DR Accounts Receivable / CR Sales Revenue.
    #[must_use]
    pub fn order_invoiced(&self, event: &OrderInvoiced) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Sales,
            description: format!("Invoice for order {}", event.order_number),
            source: Some(SourceRef::Order(event.order_id)),
            lines: vec![
                self.debit(AccountCode::AccountsReceivable, event.amount),
                self.credit(AccountCode::SalesRevenue, event.amount),
            ],
        }
    }

    /// DR Cash or Bank / CR Accounts Receivable.
    #[must_use]
    pub fn payment_received(&self, event: &PaymentReceived) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Receipt,
            description: format!("Payment received for order {}", event.order_number),
            source: Some(SourceRef::Payment(event.payment_id)),
            lines: vec![
                self.debit(event.deposit_to.account_code(), event.amount),
                self.credit(AccountCode::AccountsReceivable, event.amount),
            ],
        }
    }

    /// DR Raw-Materials Inventory / CR Accounts Payable, for the receipt
    /// total (each line's quantity times unit cost, rounded to cents).
    #[must_use]
    pub fn goods_received(&self, event: &GoodsReceived) -> CreateJournalEntryInput {
        let total: Decimal = event
            .lines
            .iter()
            .map(|l| round_money(l.quantity * l.unit_cost))
            .sum();

        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Purchase,
            description: format!("Goods received on {}", event.po_number),
            source: Some(SourceRef::PurchaseOrder(event.purchase_order_id)),
            lines: vec![
                self.debit(AccountCode::RawMaterialsInventory, total),
                self.credit(AccountCode::AccountsPayable, total),
            ],
        }
    }

    /// DR Accounts Payable / CR Cash or Bank.
    #[must_use]
    pub fn supplier_paid(&self, event: &SupplierPaid) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Payment,
            description: format!("Supplier payment for {}", event.po_number),
            source: Some(SourceRef::PurchaseOrder(event.purchase_order_id)),
            lines: vec![
                self.debit(AccountCode::AccountsPayable, event.amount),
                self.credit(event.paid_from.account_code(), event.amount),
            ],
        }
    }

    /// DR Raw Materials Used / CR Raw-Materials Inventory for materials and
    /// DR Direct Labor / CR Cash for labor. Zero legs are left out.
    #[must_use]
    pub fn production_cost_captured(
        &self,
        job_id: ProductionJobId,
        job_number: &str,
        date: NaiveDate,
        materials_cost: Decimal,
        labor_cost: Decimal,
    ) -> CreateJournalEntryInput {
        let mut lines = Vec::with_capacity(4);
        if !materials_cost.is_zero() {
            lines.push(
                self.debit(AccountCode::RawMaterialsUsed, materials_cost)
                    .with_description("Materials consumed"),
            );
            lines.push(self.credit(AccountCode::RawMaterialsInventory, materials_cost));
        }
        if !labor_cost.is_zero() {
            lines.push(
                self.debit(AccountCode::DirectLabor, labor_cost)
                    .with_description("Direct labor"),
            );
            lines.push(self.credit(AccountCode::Cash, labor_cost));
        }

        CreateJournalEntryInput {
            transaction_date: date,
            entry_type: JournalEntryType::Inventory,
            description: format!("Production costs for job {job_number}"),
            source: Some(SourceRef::ProductionJob(job_id)),
            lines,
        }
    }

    /// DR Finished-Goods Inventory / CR Raw Materials Used and CR Direct
    /// Labor, capitalising the job's captured costs.
    #[must_use]
    pub fn production_completed(&self, event: &ProductionCompleted) -> CreateJournalEntryInput {
        let total = event.materials_cost + event.labor_cost;
        let mut lines = vec![self.debit(AccountCode::FinishedGoodsInventory, total)];
        if !event.materials_cost.is_zero() {
            lines.push(self.credit(AccountCode::RawMaterialsUsed, event.materials_cost));
        }
        if !event.labor_cost.is_zero() {
            lines.push(self.credit(AccountCode::DirectLabor, event.labor_cost));
        }

        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Inventory,
            description: format!("Finished goods from job {}", event.job_number),
            source: Some(SourceRef::ProductionJob(event.job_id)),
            lines,
        }
    }

    /// DR the category's 68xx account / CR Cash or Bank.
    #[must_use]
    pub fn expense_recorded(&self, event: &ExpenseRecorded) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            transaction_date: event.date,
            entry_type: JournalEntryType::Expense,
            description: event.description.clone(),
            source: Some(SourceRef::Expense(event.expense_id)),
            lines: vec![
                self.debit(event.category.account_code(), event.amount),
                self.credit(event.paid_from.account_code(), event.amount),
            ],
        }
    }
}
