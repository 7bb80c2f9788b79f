//! Core types for met-importer

use serde::{Deserialize, Serialize};

/// Unique identifier for a collection object
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub i64);

impl ObjectId {
    /// Create a new ObjectId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ObjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ObjectId> for i64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for ObjectId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ObjectId> for i64 {
    fn eq(&self, other: &ObjectId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for ObjectId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ObjectId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ObjectId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Summary of a completed (or cancelled) import run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Number of object IDs the remote listing reported
    pub total: u64,

    /// Objects fetched, transformed, and handed to the persistence layer
    pub succeeded: u64,

    /// Objects skipped after retries were exhausted or the remote refused them
    pub skipped: u64,

    /// Objects that failed with a non-retryable transport or transform error
    pub failed: u64,
}

impl ImportReport {
    /// Total number of objects that reached a terminal outcome
    pub fn processed(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // --- ObjectId conversions ---

    #[test]
    fn object_id_from_i64_and_back() {
        let id = ObjectId::from(42_i64);
        let raw: i64 = id.into();
        assert_eq!(raw, 42, "conversions must not alter the wrapped value");
    }

    #[test]
    fn object_id_from_str_parses_valid_integer() {
        let id = ObjectId::from_str("436535").unwrap();
        assert_eq!(id.get(), 436535);
    }

    #[test]
    fn object_id_from_str_parses_negative_integer() {
        // the wire type is a plain i64, so negatives are representable
        let id = ObjectId::from_str("-7").unwrap();
        assert_eq!(id.get(), -7);
    }

    #[test]
    fn object_id_from_str_rejects_non_numeric() {
        let result = ObjectId::from_str("abc");
        assert!(result.is_err(), "non-numeric input must fail to parse");
        assert!(
            !result.unwrap_err().to_string().is_empty(),
            "the parse error must carry a message"
        );
    }

    #[test]
    fn object_id_from_str_rejects_empty_string() {
        assert!(ObjectId::from_str("").is_err());
    }

    #[test]
    fn object_id_from_str_rejects_float() {
        assert!(
            ObjectId::from_str("3.14").is_err(),
            "ids are integers, fractional input must be rejected"
        );
    }

    #[test]
    fn object_id_display_matches_inner_value() {
        let id = ObjectId::new(999);
        assert_eq!(id.to_string(), "999");
    }

    #[test]
    fn object_id_partial_eq_with_i64() {
        let id = ObjectId::new(10);
        assert!(id == 10_i64);
        assert!(10_i64 == id, "comparison works in both directions");
        assert!(id != 11_i64);
    }

    // --- ObjectId parsing edge cases ---

    #[test]
    fn object_id_from_str_rejects_whitespace_padded_input() {
        // i64::from_str does not trim, and ObjectId inherits that strictness
        assert!(ObjectId::from_str(" 123 ").is_err());
        assert!(ObjectId::from_str(" 123").is_err());
        assert!(ObjectId::from_str("123 ").is_err());
    }

    #[test]
    fn object_id_from_str_parses_leading_zeros_as_decimal() {
        let id = ObjectId::from_str("0000123").unwrap();
        assert_eq!(id.get(), 123, "leading zeros parse as plain decimal");
    }

    #[test]
    fn object_id_from_str_rejects_i64_overflow_without_panic() {
        // one past i64::MAX
        let result = ObjectId::from_str("9223372036854775808");
        assert!(result.is_err(), "overflow must error, not wrap");
    }

    // --- ImportReport accounting ---

    #[test]
    fn report_processed_sums_all_outcomes() {
        let report = ImportReport {
            total: 10,
            succeeded: 6,
            skipped: 3,
            failed: 1,
        };
        assert_eq!(
            report.processed(),
            10,
            "processed() must sum succeeded, skipped, and failed"
        );
    }

    #[test]
    fn report_default_is_all_zeros() {
        let report = ImportReport::default();
        assert_eq!(report.total, 0);
        assert_eq!(report.processed(), 0);
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = ImportReport {
            total: 4,
            succeeded: 2,
            skipped: 1,
            failed: 1,
        };
        let json = serde_json::to_string(&report).unwrap();
        let parsed: ImportReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
