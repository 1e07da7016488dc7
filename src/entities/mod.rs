//! SeaORM entities, grouped by business module

pub mod accounts;
pub mod core_data;
pub mod field_service;
pub mod finance;
pub mod inventory;
