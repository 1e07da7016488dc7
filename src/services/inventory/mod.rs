//! Product catalogue, suppliers and the stock ledger

pub mod brands;
pub mod categories;
pub mod movements;
pub mod products;
pub mod suppliers;

pub use brands::BrandService;
pub use categories::CategoryService;
pub use movements::InventoryMovementService;
pub use products::ProductService;
pub use suppliers::SupplierService;
