//! Chart of accounts, invoicing, payments, journal transactions and expenses

pub mod accounts;
pub mod expenses;
pub mod invoices;
pub mod payments;
pub mod transactions;

pub use accounts::LedgerAccountService;
pub use expenses::ExpenseService;
pub use invoices::InvoiceService;
pub use payments::PaymentService;
pub use transactions::TransactionService;
