//! Bookkeeping: chart of accounts, invoices, payments and journal entries

pub mod account;
pub mod expense;
pub mod invoice;
pub mod invoice_item;
pub mod payment;
pub mod transaction;

pub use account::AccountType;
pub use expense::ExpenseCategory;
pub use invoice::{InvoiceStatus, InvoiceType};
pub use payment::{PaymentMethod, PaymentStatus};
