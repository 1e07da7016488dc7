//! Product catalogue and stock ledger

pub mod brand;
pub mod category;
pub mod inventory_item;
pub mod product;
pub mod product_image;
pub mod supplier;

pub use inventory_item::MovementType;
pub use product::{ProductStatus, UnitType};
