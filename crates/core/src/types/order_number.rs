//! Human-readable order numbers.
//!
//! Format: `ORD-YYYYMMDD-NNNN`, the order date followed by a four digit
//! random suffix. Ten thousand suffixes per day make collisions unlikely but
//! possible; the `orders.order_number` unique constraint is the real guarantee
//! and writers retry with a fresh number on conflict.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ORD";

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    #[error("order number must look like ORD-YYYYMMDD-NNNN")]
    Format,
    #[error("order number has an invalid date")]
    Date,
}

/// An order number such as `ORD-20260315-0427`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a number for an order placed at `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = rand::rng().random_range(0..10_000);
        Self::from_parts(now.date_naive(), suffix)
    }

    /// Build a number from a date and a suffix. Suffixes above 9999 wrap.
    #[must_use]
    pub fn from_parts(date: NaiveDate, suffix: u16) -> Self {
        Self(format!(
            "{PREFIX}-{}-{:04}",
            date.format("%Y%m%d"),
            suffix % 10_000
        ))
    }

    /// Parse and validate an order number.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::Format` when the shape is wrong and
    /// `OrderNumberError::Date` when the date segment is not a calendar date.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let mut parts = s.split('-');
        let (Some(PREFIX), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(OrderNumberError::Format);
        };

        if date.len() != 8
            || suffix.len() != 4
            || !date.bytes().all(|b| b.is_ascii_digit())
            || !suffix.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(OrderNumberError::Format);
        }

        NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| OrderNumberError::Date)?;

        Ok(Self(s.to_owned()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The calendar date encoded in the number.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let date = self.0.split('-').nth(1)?;
        NaiveDate::parse_from_str(date, "%Y%m%d").ok()
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_from_parts_zero_pads_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(OrderNumber::from_parts(date, 42).as_str(), "ORD-20260305-0042");
        assert_eq!(OrderNumber::from_parts(date, 10_007).as_str(), "ORD-20260305-0007");
    }

    #[test]
    fn test_generate_encodes_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 0).unwrap();
        for _ in 0..50 {
            let number = OrderNumber::generate(now);
            assert!(number.as_str().starts_with("ORD-20261018-"));
            assert_eq!(number.as_str().len(), "ORD-20261018-0000".len());
            assert!(OrderNumber::parse(number.as_str()).is_ok());
        }
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for bad in [
            "",
            "ORD-20260305",
            "ORD-20260305-42",
            "ORD-2026035-0042",
            "INV-20260305-0042",
            "ORD-20260305-00A2",
            "ORD-20260305-0042-1",
        ] {
            assert_eq!(OrderNumber::parse(bad), Err(OrderNumberError::Format), "{bad}");
        }
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        assert_eq!(
            OrderNumber::parse("ORD-20260231-0001"),
            Err(OrderNumberError::Date)
        );
    }

    #[test]
    fn test_date_accessor() {
        let number = OrderNumber::parse("ORD-20251224-9999").unwrap();
        assert_eq!(number.date(), NaiveDate::from_ymd_opt(2025, 12, 24));
    }
}
