//! Contains the [AutoPk] type for autoincrementing primary keys.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{
    Error, FieldType, FromSql, IntoSql, PrimaryKeyType, Result, SqlType, SqlVal, SqlValRef, ToSql,
};

/// Wrapper around a [PrimaryKeyType] to indicate the the primary key
/// will be initialized automatically when the object is created in
/// the database.
/// Dereferences to an `Option<T>`.
///
/// Two uninitialized keys compare equal, so unsaved objects with
/// identical fields are equal to each other.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AutoPk<T: PrimaryKeyType> {
    inner: Option<T>,
}

impl<T: PrimaryKeyType> AutoPk<T> {
    /// Create an uninitialized value for an object which has not yet been saved.
    pub fn uninitialized() -> Self {
        AutoPk { inner: None }
    }

    /// Create an initialized primary key value for a previously saved
    /// object. You do not usually need to call this directly (it will
    /// happen implicitly when you load from the database).
    pub fn with_value(val: T) -> Self {
        AutoPk { inner: Some(val) }
    }

    /// Set the generated value after an insert.
    /// Returns `Error::AlreadyInitialized` if a value is already present.
    pub fn initialize(&mut self, val: SqlVal) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        self.inner = Some(T::from_sql(val)?);
        Ok(())
    }
}

impl<T: PrimaryKeyType> From<Option<T>> for AutoPk<T> {
    fn from(inner: Option<T>) -> Self {
        AutoPk { inner }
    }
}

impl<T: PrimaryKeyType> Deref for AutoPk<T> {
    type Target = Option<T>;
    fn deref(&self) -> &Option<T> {
        &self.inner
    }
}

impl<T: PrimaryKeyType> FromSql for AutoPk<T> {
    fn from_sql(val: SqlVal) -> Result<Self> {
        Ok(AutoPk::with_value(T::from_sql(val)?))
    }
}

impl<T: PrimaryKeyType> ToSql for AutoPk<T> {
    fn to_sql(&self) -> SqlVal {
        self.inner.to_sql()
    }
    fn to_sql_ref(&self) -> SqlValRef<'_> {
        self.inner.to_sql_ref()
    }
}

impl<T: PrimaryKeyType> IntoSql for AutoPk<T> {
    fn into_sql(self) -> SqlVal {
        self.inner.into_sql()
    }
}

impl<T: PrimaryKeyType> FieldType for AutoPk<T> {
    const SQLTYPE: SqlType = T::SQLTYPE;
}

impl<T: PrimaryKeyType + std::fmt::Display> std::fmt::Display for AutoPk<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(val) => val.fmt(f),
            None => f.write_str("null"),
        }
    }
}
