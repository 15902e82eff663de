//! SQLite serialization for typed enums and ids
//!
//! Implements ToSql and FromSql for PieceType, PieceStatus, Location and the
//! row id newtypes so rows can be read and written without string plumbing.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::ids::{BoardId, PieceId, ProjectId};
use crate::entities::{Location, PieceStatus, PieceType};

fn invalid_data(e: String) -> FromSqlError {
    FromSqlError::Other(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        e,
    )))
}

// =========================================================================
// PieceType - ToSql/FromSql
// =========================================================================

impl ToSql for PieceType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for PieceType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(invalid_data)
    }
}

// =========================================================================
// PieceStatus - ToSql/FromSql
// =========================================================================

impl ToSql for PieceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for PieceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(invalid_data)
    }
}

// =========================================================================
// Location - ToSql/FromSql
// =========================================================================

impl ToSql for Location {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Location {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        // Stored form only; shell aliases are not valid column values
        Location::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| invalid_data(format!("Unknown location: {}", s)))
    }
}

// =========================================================================
// Row ids - ToSql/FromSql
// =========================================================================

macro_rules! sql_row_id {
    ($name:ident) => {
        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value.as_i64().map($name)
            }
        }
    };
}

sql_row_id!(BoardId);
sql_row_id!(PieceId);
sql_row_id!(ProjectId);
