/// Common types and utilities shared across handlers and services
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone regex");
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrites an active-model field only when a value was supplied
pub fn patch<V>(field: &mut ActiveValue<V>, value: Option<V>)
where
    V: Into<sea_orm::Value>,
{
    if let Some(value) = value {
        *field = Set(value);
    }
}

/// The value an active-model field will hold after saving, if known
pub fn current<V>(field: &ActiveValue<V>) -> Option<V>
where
    V: Into<sea_orm::Value> + Clone,
{
    match field {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
        ActiveValue::NotSet => None,
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Phone numbers are optional; when present they must look like `+999999999`
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(error(
            "phone",
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.",
        ))
    }
}

pub fn blank_or_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_url(value) {
        Ok(())
    } else {
        Err(error("url", "Enter a valid URL."))
    }
}

pub fn blank_or_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        Err(error("email", "Enter a valid email address."))
    }
}

pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(error("min_value", "Ensure this value is greater than or equal to 0."))
    }
}

pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= dec!(0.01) {
        Ok(())
    } else {
        Err(error("min_value", "Ensure this value is greater than or equal to 0.01."))
    }
}

pub fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO && *value <= dec!(100) {
        Ok(())
    } else {
        Err(error("range", "Ensure this value is between 0 and 100."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[rstest]
    #[case("", true)]
    #[case("+989121234567", true)]
    #[case("09121234567", true)]
    #[case("12345", false)]
    #[case("+98-912-123", false)]
    fn phone_format(#[case] phone: &str, #[case] ok: bool) {
        assert_eq!(validate_phone(phone).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(100), true)]
    #[case(dec!(100.01), false)]
    #[case(dec!(-1), false)]
    fn percentage_bounds(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(percentage(&value).is_ok(), ok);
    }

    #[test]
    fn amounts_need_a_cent() {
        assert!(positive_amount(&dec!(0.01)).is_ok());
        assert!(positive_amount(&dec!(0.00)).is_err());
        assert!(non_negative(&dec!(0)).is_ok());
    }

    #[test]
    fn blank_values_pass_optional_formats() {
        assert!(blank_or_url("").is_ok());
        assert!(blank_or_url("https://farjad.com").is_ok());
        assert!(blank_or_url("not a url").is_err());
        assert!(blank_or_email("").is_ok());
        assert!(blank_or_email("info@farjad.com").is_ok());
        assert!(blank_or_email("nobody").is_err());
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        parent: Option<Option<u32>>,
    }

    #[test]
    fn nullable_distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent, None);
        let null: Patch = serde_json::from_str(r#"{"parent":null}"#).unwrap();
        assert_eq!(null.parent, Some(None));
        let set: Patch = serde_json::from_str(r#"{"parent":7}"#).unwrap();
        assert_eq!(set.parent, Some(Some(7)));
    }
}
