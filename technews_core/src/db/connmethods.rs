//! The [`ConnectionMethods`] trait shared by connections and transactions.

use std::fmt::Debug;

use crate::query::{BoolExpr, Expr, Order};
use crate::{Error, FromSql, Result, SqlType, SqlVal, SqlValRef};

/// Methods available on a database connection. Most users do not need
/// to call these methods directly and will instead use methods on
/// [DataObject][crate::DataObject] or the `UserRepository`. These
/// methods are exposed for implementation details and for the CLI.
pub trait ConnectionMethods: Debug {
    /// Execute raw SQL. May contain several statements.
    fn execute(&self, sql: &str) -> Result<()>;
    /// Select `columns` from `table` where `expr` holds.
    fn query(
        &self,
        table: &str,
        columns: &[Column],
        expr: Option<BoolExpr>,
        limit: Option<i32>,
        offset: Option<i32>,
        sort: Option<&[Order]>,
    ) -> Result<RawQueryResult>;
    /// Insert a row and return the value of the generated primary key.
    fn insert_returning_pk(
        &self,
        table: &str,
        columns: &[Column],
        pkcol: &Column,
        values: &[SqlValRef<'_>],
    ) -> Result<SqlVal>;
    /// Update the row identified by `pk`. Returns the number of rows changed.
    fn update(
        &self,
        table: &str,
        pkcol: Column,
        pk: SqlValRef<'_>,
        columns: &[Column],
        values: &[SqlValRef<'_>],
    ) -> Result<usize>;
    /// Delete the row identified by `pk`. Returns the number of rows deleted.
    fn delete(&self, table: &str, pkcol: &'static str, pk: SqlVal) -> Result<usize> {
        self.delete_where(table, BoolExpr::Eq(pkcol, Expr::Val(pk)))
    }
    /// Delete all rows of `table` where `expr` holds. Returns the number of rows deleted.
    fn delete_where(&self, table: &str, expr: BoolExpr) -> Result<usize>;
    /// Tests if a table exists in the database.
    fn has_table(&self, table: &str) -> Result<bool>;
}

/// Represents a database column. Most users do not need to use this
/// directly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    name: &'static str,
    ty: SqlType,
}
impl Column {
    /// Create a column.
    pub const fn new(name: &'static str, ty: SqlType) -> Self {
        Column { name, ty }
    }
    /// The column name.
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// The column type.
    pub fn ty(&self) -> &SqlType {
        &self.ty
    }
}

/// Backend-specific row abstraction. Only implementors of new
/// backends need use this trait directly.
pub trait BackendRow {
    /// Get the value at `idx`, which must be compatible with `ty`.
    fn get(&self, idx: usize, ty: SqlType) -> Result<SqlValRef<'_>>;
    /// Returns the number of columns in the row.
    fn len(&self) -> usize;
    /// Returns true if there are no columns in the row.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl dyn BackendRow + '_ {
    /// Get the value of column `col` (at index `idx`) converted to `T`.
    pub fn get_as<T: FromSql>(&self, idx: usize, col: &Column) -> Result<T> {
        T::from_sql(self.get(idx, *col.ty())?.into()).map_err(|e| match e {
            Error::CannotConvertSqlVal(ty, val) => Error::SqlResultTypeMismatch {
                col: col.name().to_string(),
                detail: format!("expected {ty}, found {val:?}"),
            },
            e => e,
        })
    }
}

/// A row whose values have been read out of the database.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VecRow {
    values: Vec<SqlVal>,
}
impl VecRow {
    /// Create a row from its values.
    pub fn new(values: Vec<SqlVal>) -> Self {
        VecRow { values }
    }
}
impl BackendRow for VecRow {
    fn get(&self, idx: usize, ty: SqlType) -> Result<SqlValRef<'_>> {
        let val = self.values.get(idx).ok_or(Error::OutOfRange)?;
        if val.is_compatible(ty, true) {
            Ok(val.as_ref())
        } else {
            Err(Error::CannotConvertSqlVal(ty, val.clone()))
        }
    }
    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Rows returned by [`ConnectionMethods::query`].
pub type RawQueryResult = Vec<VecRow>;
