//! Seed data script - populates an empty database with demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! Each group is only created when its table is empty, so the script can be
//! re-run safely:
//! - admin superuser (admin@farjad.com / admin123)
//! - categories, brands and suppliers
//! - two products
//! - two contacts
//! - service types Maintenance and Repair
//! - Cash Account and Sales Revenue ledger accounts

use anyhow::Context;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::info;

use farjad_erp::{
    auth::hash_password,
    entities::{
        accounts::user,
        core_data::contact::{self, ContactType},
        field_service::service_type,
        finance::account::{self, AccountType},
        inventory::{
            brand, category,
            product::{self, ProductStatus, UnitType},
            supplier,
        },
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = farjad_erp::config::load_config().context("failed to load configuration")?;
    farjad_erp::config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Farjad ERP seed data ===");
    let db = farjad_erp::db::establish_connection_from_app_config(&cfg).await?;
    farjad_erp::db::run_migrations(&db).await?;

    seed_users(&db).await?;
    seed_categories(&db).await?;
    seed_brands(&db).await?;
    seed_suppliers(&db).await?;
    seed_products(&db).await?;
    seed_contacts(&db).await?;
    seed_service_types(&db).await?;
    seed_accounts(&db).await?;

    info!("=== Seed data complete ===");
    info!("Log in with admin@farjad.com / admin123 at http://{}:{}/swagger-ui", cfg.host, cfg.port);
    Ok(())
}

/// Returns true (and logs) when `E`'s table already has rows
async fn populated<E>(db: &DatabaseConnection, label: &str) -> anyhow::Result<bool>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let count = E::find().count(db).await?;
    if count > 0 {
        info!(count, "{label}: already present, skipping");
    }
    Ok(count > 0)
}

async fn seed_users(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<user::Entity>(db, "Users").await? {
        return Ok(());
    }
    let admin = user::ActiveModel {
        username: Set("admin".to_string()),
        email: Set("admin@farjad.com".to_string()),
        first_name: Set("Admin".to_string()),
        last_name: Set("User".to_string()),
        phone: Set(String::new()),
        password_hash: Set(hash_password("admin123")?),
        is_active: Set(true),
        is_verified: Set(true),
        is_staff: Set(true),
        is_superuser: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(user_id = %admin.id, "Created admin user");
    Ok(())
}

async fn seed_categories(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<category::Entity>(db, "Categories").await? {
        return Ok(());
    }
    for (name, description) in [
        ("Electronics", "Electronic products"),
        ("Tools", "Industrial tools"),
        ("Parts", "Spare parts"),
    ] {
        category::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            parent_id: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 3 categories");
    Ok(())
}

async fn seed_brands(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<brand::Entity>(db, "Brands").await? {
        return Ok(());
    }
    for (name, description, website) in [
        ("Siemens", "Siemens industrial equipment", "https://www.siemens.com"),
        ("ABB", "ABB automation products", "https://new.abb.com"),
        ("Schneider", "Schneider Electric products", "https://www.se.com"),
    ] {
        brand::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            website: Set(website.to_string()),
            logo: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 3 brands");
    Ok(())
}

async fn seed_suppliers(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<supplier::Entity>(db, "Suppliers").await? {
        return Ok(());
    }
    let suppliers = [
        (
            "Industrial Supply Co.",
            "John Smith",
            "john@industrialsupply.com",
            "+1-555-0123",
            "123 Industrial Blvd",
        ),
        (
            "Tech Parts Ltd.",
            "Jane Doe",
            "jane@techparts.com",
            "+1-555-0456",
            "456 Technology Ave",
        ),
    ];
    for (name, contact_person, email, phone, address) in suppliers {
        supplier::ActiveModel {
            name: Set(name.to_string()),
            contact_person: Set(contact_person.to_string()),
            email: Set(email.to_string()),
            phone: Set(phone.to_string()),
            address: Set(address.to_string()),
            city: Set("Springfield".to_string()),
            country: Set("USA".to_string()),
            tax_id: Set(String::new()),
            payment_terms: Set("Net 30".to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 2 suppliers");
    Ok(())
}

async fn seed_products(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<product::Entity>(db, "Products").await? {
        return Ok(());
    }
    let category = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .one(db)
        .await?
        .context("products need at least one category")?;
    let brand = brand::Entity::find()
        .order_by_asc(brand::Column::Name)
        .one(db)
        .await?
        .context("products need at least one brand")?;

    let products = [
        (
            "Industrial Motor",
            "MOT-001",
            "High-performance industrial motor",
            dec!(1200.00),
            dec!(1500.00),
        ),
        (
            "Control Panel",
            "CP-001",
            "Advanced control panel system",
            dec!(2000.00),
            dec!(2500.00),
        ),
    ];
    for (name, sku, description, cost, price) in products {
        product::ActiveModel {
            name: Set(name.to_string()),
            sku: Set(sku.to_string()),
            barcode: Set(None),
            description: Set(description.to_string()),
            short_description: Set(String::new()),
            category_id: Set(category.id),
            brand_id: Set(brand.id),
            cost_price: Set(cost),
            selling_price: Set(price),
            unit_type: Set(UnitType::Piece),
            min_stock_level: Set(0),
            max_stock_level: Set(1000),
            weight: Set(None),
            dimensions: Set(String::new()),
            status: Set(ProductStatus::Active),
            is_taxable: Set(true),
            tax_rate: Set(dec!(0)),
            image: Set(None),
            created_by: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 2 products");
    Ok(())
}

async fn seed_contacts(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<contact::Entity>(db, "Contacts").await? {
        return Ok(());
    }
    for (first_name, last_name, email, phone, notes) in [
        ("John", "Doe", "john.doe@example.com", "+1-555-0100", "Engineer"),
        ("Jane", "Smith", "jane.smith@example.com", "+1-555-0101", "Manager"),
    ] {
        contact::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            email: Set(email.to_string()),
            phone: Set(phone.to_string()),
            mobile: Set(String::new()),
            contact_type: Set(ContactType::Customer),
            is_active: Set(true),
            notes: Set(notes.to_string()),
            created_by: Set(None),
            updated_by: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 2 contacts");
    Ok(())
}

async fn seed_service_types(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<service_type::Entity>(db, "Service types").await? {
        return Ok(());
    }
    for (name, description, price, minutes) in [
        ("Maintenance", "Regular maintenance services", dec!(200.00), 120),
        ("Repair", "Equipment repair services", dec!(300.00), 180),
    ] {
        service_type::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            base_price: Set(price),
            estimated_duration_minutes: Set(minutes),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 2 service types");
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<()> {
    if populated::<account::Entity>(db, "Accounts").await? {
        return Ok(());
    }
    for (code, name, account_type) in [
        ("1000", "Cash Account", AccountType::Asset),
        ("4000", "Sales Revenue", AccountType::Revenue),
    ] {
        account::ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            parent_id: Set(None),
            description: Set(String::new()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    info!("Created 2 ledger accounts");
    Ok(())
}
