//! Entities, storage and repository for the technews user aggregate.
//!
//! A [`User`][model::User] owns three collections (posts, votes and
//! comments). Rows are mapped to Rust values through the
//! [`DataObject`] trait, stored through a [`db::Backend`], and
//! accessed as an aggregate through [`repo::UserRepository`].
#![deny(missing_docs)]

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

pub mod db;
pub mod lazy;
pub mod model;
pub mod query;
pub mod repo;
pub mod schema;
pub mod sqlval;

mod autopk;
mod util;

pub use autopk::AutoPk;
use db::{BackendRow, Column, ConnectionMethods};
pub use query::Query;
pub use sqlval::{FieldType, FromSql, IntoSql, PrimaryKeyType, SqlVal, SqlValRef, ToSql};

/// Result type that uses [`crate::Error`].
pub type Result<T> = std::result::Result<T, crate::Error>;

/// An object stored as one row of a database table.
///
/// Every object uses an automatically generated `i64` primary key
/// which is the first entry of [`DataObject::COLUMNS`].
pub trait DataObject: Sized {
    /// The name of the table.
    const TABLE: &'static str;
    /// The name of the primary key column.
    const PKCOL: &'static str;
    /// Metadata for each column, primary key first.
    const COLUMNS: &'static [Column];
    /// Like [`DataObject::COLUMNS`] but omits the [`AutoPk`].
    const NON_AUTO_COLUMNS: &'static [Column];

    /// Get the primary key.
    fn pk(&self) -> &AutoPk<i64>;

    /// Get the primary key as mutable. Used when the key is generated on insert.
    fn pk_mut(&mut self) -> &mut AutoPk<i64>;

    /// Load an object from a database backend row.
    fn from_row(row: &dyn BackendRow) -> Result<Self>;

    /// Returns the Sql values of all columns except the primary key,
    /// in the order of [`DataObject::NON_AUTO_COLUMNS`].
    fn non_auto_values(&self) -> Vec<SqlValRef<'_>>;

    /// Point relationship fields at this object's primary key. Called
    /// after the object is loaded or first saved.
    fn bind_relations(&mut self) {}

    /// Create a blank query (matching all rows) for this type.
    fn query() -> Query<Self> {
        Query::new(Self::TABLE)
    }
}

/// [`DataObject`] operations that require a live database connection.
pub trait DataObjectOps: DataObject {
    /// Find this object in the database based on primary key.
    /// Returns `Error::NoSuchObject` if the primary key does not exist.
    fn get(conn: &impl ConnectionMethods, id: i64) -> Result<Self> {
        Self::try_get(conn, id)?.ok_or(Error::NoSuchObject)
    }

    /// Find this object in the database based on primary key.
    /// Returns `None` if the primary key does not exist.
    fn try_get(conn: &impl ConnectionMethods, id: i64) -> Result<Option<Self>> {
        Self::query()
            .filter(query::BoolExpr::Eq(
                Self::PKCOL,
                query::Expr::Val(SqlVal::BigInt(id)),
            ))
            .load_first(conn)
    }

    /// Save the object to the database.
    ///
    /// If the primary key is uninitialized this performs an insert and
    /// initializes the key with the generated value. Otherwise it
    /// updates the existing row, returning `Error::NoSuchObject` if
    /// there is no row with that key.
    fn save(&mut self, conn: &impl ConnectionMethods) -> Result<()> {
        let pkcol = Column::new(Self::PKCOL, SqlType::BigInt);
        let existing: Option<i64> = **self.pk();
        match existing {
            Some(pk) => {
                let updated = conn.update(
                    Self::TABLE,
                    pkcol,
                    SqlValRef::BigInt(pk),
                    Self::NON_AUTO_COLUMNS,
                    &self.non_auto_values(),
                )?;
                if updated == 0 {
                    return Err(Error::NoSuchObject);
                }
            }
            None => {
                let pk = conn.insert_returning_pk(
                    Self::TABLE,
                    Self::NON_AUTO_COLUMNS,
                    &pkcol,
                    &self.non_auto_values(),
                )?;
                self.pk_mut().initialize(pk)?;
            }
        }
        self.bind_relations();
        Ok(())
    }

    /// Delete the object from the database.
    fn delete(&self, conn: &impl ConnectionMethods) -> Result<()> {
        let pk = self.pk().to_sql();
        match conn.delete(Self::TABLE, Self::PKCOL, pk)? {
            0 => Err(Error::NoSuchObject),
            _ => Ok(()),
        }
    }
}

impl<T> DataObjectOps for T where T: DataObject {}

/// Technews errors.
#[allow(missing_docs)]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("No such object exists")]
    NoSuchObject,
    #[error("Type mismatch converting SqlVal. Expected {0}, found value {1:?}")]
    CannotConvertSqlVal(SqlType, SqlVal),
    #[error(
        "Mismatch between sql types and rust types while loading data for column {col}. {detail}"
    )]
    SqlResultTypeMismatch { col: String, detail: String },
    #[error("Value has not been loaded from the database")]
    ValueNotLoaded,
    #[error("Cannot use value not saved to the database")]
    ValueNotSaved,
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("Duplicate value for unique column {table}.{column}")]
    UniqueViolation { table: String, column: String },
    #[error("Foreign key constraint failed: {0}")]
    ForeignKeyViolation(String),
    #[error("Unknown backend {0}")]
    UnknownBackend(String),
    #[error("Range error")]
    OutOfRange,
    #[error("Internal logic error {0}")]
    Internal(String),
    #[error("(De)serialization error {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("IO error {0}")]
    IO(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("Sqlite error {0}")]
    SQLite(rusqlite::Error),
    #[cfg(feature = "sqlite")]
    #[error("Sqlite error {0}")]
    SQLiteFromSQL(rusqlite::types::FromSqlError),
}

/// Enumeration of the types a database value may take.
///
/// See also [`SqlVal`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SqlType {
    /// 8 bytes
    BigInt,
    /// String
    Text,
}
impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            SqlType::BigInt => "big int",
            SqlType::Text => "string",
        })
    }
}

#[cfg(feature = "log")]
pub use log::debug;
#[cfg(feature = "log")]
pub use log::error;
#[cfg(feature = "log")]
pub use log::info;
#[cfg(feature = "log")]
pub use log::warn;

#[cfg(not(feature = "log"))]
mod tnlog {
    // this module is just for grouping -- macro_export puts them in the crate root

    /// Noop for when feature log is not enabled.
    #[macro_export]
    macro_rules! debug {
        (target: $target:expr, $($arg:tt)+) => {};
        ($($arg:tt)+) => {};
    }

    /// Noop for when feature log is not enabled.
    #[macro_export]
    macro_rules! info {
        (target: $target:expr, $($arg:tt)+) => {};
        ($($arg:tt)+) => {};
    }

    /// Noop for when feature log is not enabled.
    #[macro_export]
    macro_rules! warn {
        (target: $target:expr, $($arg:tt)+) => {};
        ($($arg:tt)+) => {};
    }

    /// Noop for when feature log is not enabled.
    #[macro_export]
    macro_rules! error {
        (target: $target:expr, $($arg:tt)+) => {};
        ($($arg:tt)+) => {};
    }
}
