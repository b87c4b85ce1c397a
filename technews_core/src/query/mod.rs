//! Types to support database queries. Most callers use
//! [`DataObject::query`] and the repository rather than building
//! expressions by hand.

#![allow(missing_docs)]

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::db::ConnectionMethods;
use crate::{DataObject, Result, SqlVal};

type TblName = Cow<'static, str>;

/// Abstract representation of a database expression.
#[derive(Clone, Debug)]
pub enum Expr {
    /// A column, referenced by name.
    Column(&'static str),
    /// A value.
    Val(SqlVal),
    /// A boolean condition.
    Condition(Box<BoolExpr>),
}

/// Abstract representation of a boolean expression.
#[derive(Clone, Debug)]
pub enum BoolExpr {
    True,
    Eq(&'static str, Expr),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    /// Expression which is true if the value of `col` is present in
    /// the set of values of `tbl2_col` where `expr` evaluated on a row
    /// in `tbl2` is true.
    Subquery {
        col: &'static str,
        tbl2: TblName,
        tbl2_col: &'static str,
        expr: Box<BoolExpr>,
    },
    In(&'static str, Vec<SqlVal>),
}

impl BoolExpr {
    /// Shorthand for `col = val`.
    pub fn eq(col: &'static str, val: impl Into<SqlVal>) -> Self {
        BoolExpr::Eq(col, Expr::Val(val.into()))
    }

    /// Combine with another expression using `AND`.
    pub fn and(self, other: BoolExpr) -> Self {
        BoolExpr::And(Box::new(self), Box::new(other))
    }

    /// Combine with another expression using `OR`.
    pub fn or(self, other: BoolExpr) -> Self {
        BoolExpr::Or(Box::new(self), Box::new(other))
    }
}

/// Represents the direction of a sort.
#[derive(Clone, Debug)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Represents a sorting term (ORDER BY in SQL).
#[derive(Clone, Debug)]
pub struct Order {
    pub direction: OrderDirection,
    pub column: &'static str,
}

/// Representation of a database query.
#[derive(Clone, Debug)]
pub struct Query<T: DataObject> {
    table: TblName,
    filter: Option<BoolExpr>,
    limit: Option<i32>,
    offset: Option<i32>,
    sort: Vec<Order>,
    phantom: PhantomData<T>,
}
impl<T: DataObject> Query<T> {
    /// Creates a query which matches all objects in `table`. The set
    /// of matched objects can be restricted with `filter` and
    /// `limit`.
    pub fn new(table: &'static str) -> Query<T> {
        Query {
            table: Cow::Borrowed(table),
            filter: None,
            limit: None,
            offset: None,
            sort: Vec::new(),
            phantom: PhantomData,
        }
    }

    /// Restricts the query to matching only objects for which `expr`
    /// is true. Returns `self` as this method is expected to be
    /// chained.
    pub fn filter(mut self, expr: BoolExpr) -> Query<T> {
        self.filter = Some(expr);
        self
    }

    /// Limits the query to matching the first `lim` objects. Returns
    /// `self` as this method is expected to be chained.
    pub fn limit(mut self, lim: i32) -> Query<T> {
        self.limit = Some(lim);
        self
    }

    /// Skips the first `off` objects before returning them. Returns
    /// `self` as this method is expected to be chained.
    pub fn offset(mut self, off: i32) -> Query<T> {
        self.offset = Some(off);
        self
    }

    /// Order the query results by the given column. Multiple calls to
    /// this method may be made, with earlier calls taking precedence.
    pub fn order(mut self, column: &'static str, direction: OrderDirection) -> Query<T> {
        self.sort.push(Order { direction, column });
        self
    }

    /// Shorthand for `order(column, OrderDirection::Ascending)`
    pub fn order_asc(self, column: &'static str) -> Query<T> {
        self.order(column, OrderDirection::Ascending)
    }

    /// Shorthand for `order(column, OrderDirection::Descending)`
    pub fn order_desc(self, column: &'static str) -> Query<T> {
        self.order(column, OrderDirection::Descending)
    }

    fn fetch(self, conn: &impl ConnectionMethods, limit: Option<i32>) -> Result<Vec<T>> {
        let sort = if self.sort.is_empty() {
            None
        } else {
            Some(self.sort.as_slice())
        };
        let rows = conn.query(
            &self.table,
            T::COLUMNS,
            self.filter,
            limit,
            self.offset,
            sort,
        )?;
        rows.iter()
            .map(|row| {
                let mut obj = T::from_row(row)?;
                obj.bind_relations();
                Ok(obj)
            })
            .collect()
    }

    /// Executes the query against `conn` and returns the first result (if any).
    pub fn load_first(self, conn: &impl ConnectionMethods) -> Result<Option<T>> {
        Ok(self.fetch(conn, Some(1))?.into_iter().next())
    }

    /// Executes the query against `conn`.
    pub fn load(self, conn: &impl ConnectionMethods) -> Result<Vec<T>> {
        let limit = self.limit;
        self.fetch(conn, limit)
    }

    /// Executes the query against `conn` and deletes all matching objects.
    pub fn delete(self, conn: &impl ConnectionMethods) -> Result<usize> {
        conn.delete_where(&self.table, self.filter.unwrap_or(BoolExpr::True))
    }
}
