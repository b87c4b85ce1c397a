//! Database values and conversions between them and Rust types.
#![allow(missing_docs)]

use crate::{Error::CannotConvertSqlVal, Result, SqlType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Borrowed form of [`SqlVal`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SqlValRef<'a> {
    Null,
    BigInt(i64),
    Text(&'a str),
}

/// A database value.
///
/// For conversion between `SqlVal` and other types, see [`FromSql`], [`IntoSql`], and [`ToSql`].
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SqlVal {
    Null,
    BigInt(i64),
    Text(String),
}
impl SqlVal {
    pub fn as_ref(&self) -> SqlValRef<'_> {
        SqlValRef::from(self)
    }

    pub fn owned_text(self) -> Result<String> {
        match self {
            SqlVal::Text(val) => Ok(val),
            _ => Err(CannotConvertSqlVal(SqlType::Text, self)),
        }
    }

    /// Tests if this sqlval is compatible with the given
    /// `SqlType`. There are no implicit type conversions.
    pub fn is_compatible(&self, ty: SqlType, null_allowed: bool) -> bool {
        match self {
            SqlVal::Null => null_allowed,
            SqlVal::BigInt(_) => ty == SqlType::BigInt,
            SqlVal::Text(_) => ty == SqlType::Text,
        }
    }
}
impl fmt::Display for SqlVal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            SqlVal::Null => f.write_str("NULL"),
            SqlVal::BigInt(val) => val.fmt(f),
            SqlVal::Text(val) => val.fmt(f),
        }
    }
}

/// Used to convert another type to a `SqlVal`.
///
/// Unlike [`IntoSql`][crate::IntoSql], the value is not consumed.
pub trait ToSql {
    fn to_sql(&self) -> SqlVal;
    fn to_sql_ref(&self) -> SqlValRef<'_>;
}

/// Used to convert another type to a `SqlVal`.
///
/// The value is consumed. For a non-consuming trait, see
/// [`ToSql`][crate::ToSql].
pub trait IntoSql {
    fn into_sql(self) -> SqlVal;
}

impl<T> From<T> for SqlVal
where
    T: IntoSql,
{
    fn from(val: T) -> Self {
        val.into_sql()
    }
}

/// Used to convert a `SqlVal` into another type.
///
/// The `SqlVal` is consumed.
pub trait FromSql {
    fn from_sql(val: SqlVal) -> Result<Self>
    where
        Self: Sized;
}

impl From<SqlValRef<'_>> for SqlVal {
    fn from(vref: SqlValRef) -> SqlVal {
        match vref {
            SqlValRef::Null => SqlVal::Null,
            SqlValRef::BigInt(v) => SqlVal::BigInt(v),
            SqlValRef::Text(v) => SqlVal::Text(v.to_string()),
        }
    }
}

impl<'a> From<&'a SqlVal> for SqlValRef<'a> {
    fn from(val: &'a SqlVal) -> SqlValRef<'a> {
        match val {
            SqlVal::Null => SqlValRef::Null,
            SqlVal::BigInt(v) => SqlValRef::BigInt(*v),
            SqlVal::Text(v) => SqlValRef::Text(v.as_ref()),
        }
    }
}

/// Type suitable for being a database column.
pub trait FieldType: ToSql + IntoSql + FromSql {
    const SQLTYPE: SqlType;
}

/// Marker trait for a type suitable for being a primary key
pub trait PrimaryKeyType: FieldType + Clone + PartialEq {}

impl FromSql for i64 {
    fn from_sql(val: SqlVal) -> Result<Self> {
        match val {
            SqlVal::BigInt(v) => Ok(v),
            _ => Err(CannotConvertSqlVal(SqlType::BigInt, val)),
        }
    }
}
impl IntoSql for i64 {
    fn into_sql(self) -> SqlVal {
        SqlVal::BigInt(self)
    }
}
impl ToSql for i64 {
    fn to_sql(&self) -> SqlVal {
        SqlVal::BigInt(*self)
    }
    fn to_sql_ref(&self) -> SqlValRef<'_> {
        SqlValRef::BigInt(*self)
    }
}
impl FieldType for i64 {
    const SQLTYPE: SqlType = SqlType::BigInt;
}
impl PrimaryKeyType for i64 {}

impl FromSql for String {
    fn from_sql(val: SqlVal) -> Result<Self> {
        val.owned_text()
    }
}
impl ToSql for String {
    fn to_sql(&self) -> SqlVal {
        SqlVal::Text(self.clone())
    }
    fn to_sql_ref(&self) -> SqlValRef<'_> {
        SqlValRef::Text(self)
    }
}
impl IntoSql for String {
    fn into_sql(self) -> SqlVal {
        SqlVal::Text(self)
    }
}
impl FieldType for String {
    const SQLTYPE: SqlType = SqlType::Text;
}

impl ToSql for &str {
    fn to_sql(&self) -> SqlVal {
        SqlVal::Text((*self).to_string())
    }
    fn to_sql_ref(&self) -> SqlValRef<'_> {
        SqlValRef::Text(self)
    }
}
impl IntoSql for &str {
    fn into_sql(self) -> SqlVal {
        SqlVal::Text(self.to_string())
    }
}

impl<T> ToSql for Option<T>
where
    T: ToSql,
{
    fn to_sql(&self) -> SqlVal {
        match self {
            None => SqlVal::Null,
            Some(v) => v.to_sql(),
        }
    }
    fn to_sql_ref(&self) -> SqlValRef<'_> {
        match self {
            None => SqlValRef::Null,
            Some(v) => v.to_sql_ref(),
        }
    }
}
impl<T> IntoSql for Option<T>
where
    T: IntoSql,
{
    fn into_sql(self) -> SqlVal {
        match self {
            None => SqlVal::Null,
            Some(v) => v.into_sql(),
        }
    }
}
impl<T> FromSql for Option<T>
where
    T: FromSql,
{
    fn from_sql(val: SqlVal) -> Result<Self> {
        Ok(match val {
            SqlVal::Null => None,
            _ => Some(T::from_sql(val)?),
        })
    }
}
impl<T> FieldType for Option<T>
where
    T: FieldType,
{
    const SQLTYPE: SqlType = T::SQLTYPE;
}
