use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

pub const INVOICE_PREFIX: &str = "INV";
pub const PAYMENT_PREFIX: &str = "PAY";
pub const TRANSACTION_PREFIX: &str = "TXN";
pub const EXPENSE_PREFIX: &str = "EXP";
pub const SERVICE_REQUEST_PREFIX: &str = "SR";

/// `PREFIX-YYYYmmddHHMMSS` for the given instant
pub fn timestamp_number(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, at.format("%Y%m%d%H%M%S"))
}

/// The `attempt`-th candidate: the base number first, then `-2`, `-3`, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

/// Generates a number from the current time that is not yet stored in `column`
pub async fn next_number<E, C>(db: &C, column: E::Column, prefix: &str) -> Result<String, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let base = timestamp_number(prefix, Utc::now());
    let mut attempt = 1;
    loop {
        let number = candidate(&base, attempt);
        let taken = E::find()
            .filter(column.eq(number.as_str()))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(number);
        }
        attempt += 1;
    }
}

/// Uses a client-supplied number when present and non-blank, otherwise generates one
pub async fn provided_or_next<E, C>(
    db: &C,
    column: E::Column,
    prefix: &str,
    provided: Option<String>,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    match provided.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(number) => Ok(number),
        None => next_number::<E, C>(db, column, prefix).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_prefix_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamp_number(INVOICE_PREFIX, at), "INV-20240309070501");
        assert_eq!(timestamp_number(SERVICE_REQUEST_PREFIX, at), "SR-20240309070501");
    }

    #[test]
    fn collision_suffixes_start_at_two() {
        assert_eq!(candidate("PAY-20240309070501", 1), "PAY-20240309070501");
        assert_eq!(candidate("PAY-20240309070501", 2), "PAY-20240309070501-2");
        assert_eq!(candidate("PAY-20240309070501", 3), "PAY-20240309070501-3");
    }
}
