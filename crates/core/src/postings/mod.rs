//! Ledger-triggering workflows.
//!
//! Sales, purchasing, production and expense collaborators report
//! [`events`] here. Each event becomes one balanced entry, recorded
//! atomically through [`Ledger::record`](crate::ledger::Ledger::record).

pub mod builder;
pub mod error;
pub mod events;
pub mod workflow;


pub use builder::PostingBuilder;
pub use error::PostingError;
pub use events::{
    ExpenseRecorded, GoodsReceived, MaterialUsage, OrderInvoiced, PaymentReceived,
    ProductionCompleted, ProductionCostCaptured, ReceiptLine, SupplierPaid,
};
pub use workflow::PostingWorkflow;
