//! Database enum types with Diesel serialization.
//!
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`
//! and mirrors a CHECK constraint in the migrations.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Recurrence frequency of an event template.
///
/// Maps to `calendar_event.recurrence_frequency` CHECK constraint.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ToSql<Text, Pg> for RecurrenceFrequency {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for RecurrenceFrequency {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"none" => Ok(Self::None),
            b"daily" => Ok(Self::Daily),
            b"weekly" => Ok(Self::Weekly),
            b"monthly" => Ok(Self::Monthly),
            b"yearly" => Ok(Self::Yearly),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl RecurrenceFrequency {
    /// Returns the database string representation of this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    #[must_use]
    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_display_matches_storage_names() {
        assert_eq!(RecurrenceFrequency::Monthly.to_string(), "monthly");
        assert_eq!(RecurrenceFrequency::default(), RecurrenceFrequency::None);
        assert!(!RecurrenceFrequency::None.is_recurring());
        assert!(RecurrenceFrequency::Yearly.is_recurring());
    }
}
