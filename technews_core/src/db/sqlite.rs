//! SQLite database backend
use std::borrow::Cow;
use std::ops::Deref;
use std::path::Path;
#[cfg(feature = "log")]
use std::sync::Once;

use super::helper;
use super::{Backend, BackendConnection, BackendTransaction, Connection, ConnectionMethods};
use super::{Column, RawQueryResult, Transaction, VecRow};
use crate::query::{BoolExpr, Expr, Order};
use crate::schema::{AColumn, ARef, ATable};
use crate::{connection_method_wrapper, debug, Error, Result, SqlType, SqlVal, SqlValRef};

/// The name of the sqlite backend.
pub const BACKEND_NAME: &str = "sqlite";

#[cfg(feature = "log")]
fn log_callback(error_code: std::ffi::c_int, message: &str) {
    match error_code {
        rusqlite::ffi::SQLITE_NOTICE => {
            #[cfg(feature = "debug")]
            log::trace!("{}", message)
        }
        rusqlite::ffi::SQLITE_OK
        | rusqlite::ffi::SQLITE_DONE
        | rusqlite::ffi::SQLITE_NOTICE_RECOVER_WAL
        | rusqlite::ffi::SQLITE_NOTICE_RECOVER_ROLLBACK => log::info!("{}", message),
        rusqlite::ffi::SQLITE_WARNING | rusqlite::ffi::SQLITE_WARNING_AUTOINDEX => {
            log::warn!("{}", message)
        }
        // constraint failures are reported to the caller as errors
        code if code & 0xff == rusqlite::ffi::SQLITE_CONSTRAINT => log::debug!("{}", message),
        _ => log::error!("{error_code} {}", message),
    }
}

/// SQLite [`Backend`] implementation.
#[derive(Debug, Default, Clone)]
pub struct SQLiteBackend;
impl SQLiteBackend {
    /// Create the backend.
    pub fn new() -> SQLiteBackend {
        SQLiteBackend {}
    }
}
impl SQLiteBackend {
    /// Open a connection without boxing it. Foreign key enforcement is
    /// switched on for every connection.
    pub fn connect_sqlite(&self, path: &str) -> Result<SQLiteConnection> {
        let connection = SQLiteConnection::open(Path::new(path))?;
        ConnectionMethods::execute(&connection, "PRAGMA foreign_keys = ON")?;
        Ok(connection)
    }
}

impl Backend for SQLiteBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn create_table_sql(&self, table: &ATable, allow_exists: bool) -> Result<String> {
        Ok(create_table(table, allow_exists))
    }

    fn connect(&self, path: &str) -> Result<Connection> {
        Ok(Connection {
            conn: Box::new(self.connect_sqlite(path)?),
        })
    }
}

/// SQLite database connection.
#[derive(Debug)]
pub struct SQLiteConnection {
    conn: rusqlite::Connection,
}
impl SQLiteConnection {
    fn open(path: impl AsRef<Path>) -> Result<Self> {
        #[cfg(feature = "log")]
        static INIT_SQLITE_LOGGING: Once = Once::new();

        #[cfg(feature = "log")]
        INIT_SQLITE_LOGGING.call_once(|| {
            _ = unsafe { rusqlite::trace::config_log(Some(log_callback)) };
        });

        rusqlite::Connection::open(path)
            .map(|conn| SQLiteConnection { conn })
            .map_err(|e| e.into())
    }

    // For use with connection_method_wrapper macro
    #[allow(clippy::unnecessary_wraps)]
    fn wrapped_connection_methods(&self) -> Result<&rusqlite::Connection> {
        Ok(&self.conn)
    }
}
connection_method_wrapper!(SQLiteConnection);

impl BackendConnection for SQLiteConnection {
    fn transaction(&mut self) -> Result<Transaction<'_>> {
        let trans: rusqlite::Transaction<'_> = self.conn.transaction()?;
        let trans = Box::new(SqliteTransaction::new(trans));
        Ok(Transaction::new(trans))
    }
    fn backend(&self) -> Box<dyn Backend> {
        Box::new(SQLiteBackend {})
    }
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
    fn is_closed(&self) -> bool {
        false
    }
}

impl ConnectionMethods for rusqlite::Connection {
    fn execute(&self, sql: &str) -> Result<()> {
        debug!("execute sql {}", sql);
        self.execute_batch(sql)?;
        Ok(())
    }

    fn query(
        &self,
        table: &str,
        columns: &[Column],
        expr: Option<BoolExpr>,
        limit: Option<i32>,
        offset: Option<i32>,
        order: Option<&[Order]>,
    ) -> Result<RawQueryResult> {
        let mut sqlquery = String::new();
        helper::sql_select(columns, table, &mut sqlquery);
        let mut values: Vec<SqlVal> = Vec::new();
        if let Some(expr) = expr {
            sqlquery.push_str(" WHERE ");
            sql_for_expr(
                Expr::Condition(Box::new(expr)),
                &mut values,
                &mut sqlquery,
            );
        }

        if let Some(order) = order {
            helper::sql_order(order, &mut sqlquery)
        }

        if let Some(limit) = limit {
            helper::sql_limit(limit, &mut sqlquery)
        }

        if let Some(offset) = offset {
            if limit.is_none() {
                // Sqlite only supports offset in conjunction with
                // limit, so add a max limit if we don't have one
                // already.
                helper::sql_limit(i32::MAX, &mut sqlquery)
            }
            helper::sql_offset(offset, &mut sqlquery)
        }

        debug!("query sql {}", sqlquery);
        #[cfg(feature = "debug")]
        debug!("values {:?}", values);

        let mut stmt = self.prepare(&sqlquery)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(values))?;
        let mut result = RawQueryResult::new();
        while let Some(row) = rows.next()? {
            let vals = columns
                .iter()
                .enumerate()
                .map(|(idx, col)| sql_val_from_rusqlite(row.get_ref(idx)?, col))
                .collect::<Result<Vec<SqlVal>>>()?;
            result.push(VecRow::new(vals));
        }
        Ok(result)
    }
    fn insert_returning_pk(
        &self,
        table: &str,
        columns: &[Column],
        pkcol: &Column,
        values: &[SqlValRef<'_>],
    ) -> Result<SqlVal> {
        let mut sql = String::new();
        helper::sql_insert_with_placeholders(
            table,
            columns,
            &mut SQLitePlaceholderSource::new(),
            &mut sql,
        );
        debug!("insert sql {}", sql);
        #[cfg(feature = "debug")]
        debug!("values {:?}", values);
        self.execute(&sql, rusqlite::params_from_iter(values))?;
        let pk: SqlVal = self.query_row_and_then(
            &format!(
                "SELECT {} FROM {} WHERE ROWID = last_insert_rowid()",
                helper::quote_reserved_word(pkcol.name()),
                helper::quote_reserved_word(table)
            ),
            [],
            |row| sql_val_from_rusqlite(row.get_ref(0)?, pkcol),
        )?;
        Ok(pk)
    }
    fn update(
        &self,
        table: &str,
        pkcol: Column,
        pk: SqlValRef<'_>,
        columns: &[Column],
        values: &[SqlValRef<'_>],
    ) -> Result<usize> {
        let mut sql = String::new();
        helper::sql_update_with_placeholders(
            table,
            pkcol,
            columns,
            &mut SQLitePlaceholderSource::new(),
            &mut sql,
        );
        let placeholder_values = [values, &[pk]].concat();
        debug!("update sql {}", sql);
        #[cfg(feature = "debug")]
        debug!("placeholders {:?}", placeholder_values);
        let cnt = self.execute(&sql, rusqlite::params_from_iter(placeholder_values))?;
        Ok(cnt)
    }
    fn delete_where(&self, table: &str, expr: BoolExpr) -> Result<usize> {
        let mut sql = format!("DELETE FROM {} WHERE ", helper::quote_reserved_word(table));
        let mut values: Vec<SqlVal> = Vec::new();
        sql_for_expr(Expr::Condition(Box::new(expr)), &mut values, &mut sql);
        debug!("delete where sql {}", sql);
        #[cfg(feature = "debug")]
        debug!("placeholders {:?}", values);
        let cnt = self.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(cnt)
    }
    fn has_table(&self, table: &str) -> Result<bool> {
        let mut stmt =
            self.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?;")?;
        let mut rows = stmt.query([table])?;
        Ok(rows.next()?.is_some())
    }
}

#[derive(Debug)]
struct SqliteTransaction<'c> {
    trans: Option<rusqlite::Transaction<'c>>,
}
impl<'c> SqliteTransaction<'c> {
    fn new(trans: rusqlite::Transaction<'c>) -> Self {
        SqliteTransaction { trans: Some(trans) }
    }
    fn get(&self) -> Result<&rusqlite::Transaction<'c>> {
        match &self.trans {
            None => Err(Self::already_consumed()),
            Some(trans) => Ok(trans),
        }
    }
    fn wrapped_connection_methods(&self) -> Result<&rusqlite::Connection> {
        Ok(self.get()?.deref())
    }
    fn already_consumed() -> Error {
        Error::Internal("transaction has already been consumed".to_string())
    }
}
connection_method_wrapper!(SqliteTransaction<'_>);

impl<'c> BackendTransaction<'c> for SqliteTransaction<'c> {
    fn commit(&mut self) -> Result<()> {
        match self.trans.take() {
            None => Err(Self::already_consumed()),
            Some(trans) => Ok(trans.commit()?),
        }
    }
    fn rollback(&mut self) -> Result<()> {
        match self.trans.take() {
            None => Err(Self::already_consumed()),
            Some(trans) => Ok(trans.rollback()?),
        }
    }
    // Workaround for https://github.com/rust-lang/rfcs/issues/2765
    fn connection_methods(&self) -> &dyn ConnectionMethods {
        self
    }
}

impl rusqlite::ToSql for SqlVal {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(sqlvalref_to_sqlite(&self.as_ref()))
    }
}

impl<'a> rusqlite::ToSql for SqlValRef<'a> {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'a>> {
        Ok(sqlvalref_to_sqlite(self))
    }
}

fn sqlvalref_to_sqlite<'a>(valref: &SqlValRef<'a>) -> rusqlite::types::ToSqlOutput<'a> {
    use rusqlite::types::{ToSqlOutput::Borrowed, ToSqlOutput::Owned, Value, ValueRef};
    match valref {
        SqlValRef::BigInt(i) => Owned(Value::Integer(*i)),
        SqlValRef::Text(t) => Borrowed(ValueRef::Text(t.as_bytes())),
        SqlValRef::Null => Owned(Value::Null),
    }
}

fn sql_for_expr(expr: Expr, values: &mut Vec<SqlVal>, w: &mut String) {
    helper::sql_for_expr(expr, values, &mut SQLitePlaceholderSource::new(), w)
}

fn sql_val_from_rusqlite(val: rusqlite::types::ValueRef, col: &Column) -> Result<SqlVal> {
    if matches!(val, rusqlite::types::ValueRef::Null) {
        return Ok(SqlVal::Null);
    }
    Ok(match col.ty() {
        SqlType::BigInt => SqlVal::BigInt(val.as_i64()?),
        SqlType::Text => SqlVal::Text(val.as_str()?.to_string()),
    })
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ffi;
        match &e {
            rusqlite::Error::SqliteFailure(err, msg) => match err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    match msg.as_deref().and_then(parse_unique_violation) {
                        Some((table, column)) => Error::UniqueViolation { table, column },
                        None => Error::SQLite(e),
                    }
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Error::ForeignKeyViolation(
                    msg.clone()
                        .unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string()),
                ),
                _ => Error::SQLite(e),
            },
            rusqlite::Error::FromSqlConversionFailure(_, _, _)
            | rusqlite::Error::InvalidColumnType(_, _, _) => Error::SqlResultTypeMismatch {
                col: String::new(),
                detail: e.to_string(),
            },
            _ => Error::SQLite(e),
        }
    }
}

impl From<rusqlite::types::FromSqlError> for Error {
    fn from(e: rusqlite::types::FromSqlError) -> Self {
        use rusqlite::types::FromSqlError;
        match e {
            FromSqlError::OutOfRange(_) => Error::OutOfRange,
            FromSqlError::InvalidType => Error::SqlResultTypeMismatch {
                col: String::new(),
                detail: e.to_string(),
            },
            e => Error::SQLiteFromSQL(e),
        }
    }
}

/// Extracts `(table, column)` from a message of the form
/// `UNIQUE constraint failed: user.email`. For a composite
/// constraint the first column is reported.
fn parse_unique_violation(msg: &str) -> Option<(String, String)> {
    let cols = msg.strip_prefix("UNIQUE constraint failed: ")?;
    let first = cols.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;
    Some((table.to_string(), column.to_string()))
}

fn create_table(table: &ATable, allow_exists: bool) -> String {
    let coldefs = table
        .columns
        .iter()
        .map(define_column)
        .collect::<Vec<String>>()
        .join(",\n");
    let modifier = if allow_exists { "IF NOT EXISTS " } else { "" };
    let mut constraints = create_table_constraints(table);
    if !constraints.is_empty() {
        constraints = ",\n".to_owned() + &constraints;
    }
    format!(
        "CREATE TABLE {}{} (\n{}{}\n) STRICT;",
        modifier,
        helper::quote_reserved_word(&table.name),
        coldefs,
        constraints
    )
}

fn create_table_constraints(table: &ATable) -> String {
    table
        .columns
        .iter()
        .filter_map(|column| column.reference().map(|r| define_constraint(column, r)))
        .collect::<Vec<String>>()
        .join(",\n")
}

fn define_column(col: &AColumn) -> String {
    let mut constraints: Vec<&str> = Vec::new();
    if !col.is_nullable() {
        constraints.push("NOT NULL");
    }
    if col.is_pk() {
        // integer primary key is automatically an alias for ROWID
        constraints.push("PRIMARY KEY");
    }
    if col.is_unique() {
        constraints.push("UNIQUE");
    }
    let name = helper::quote_reserved_word(col.name());
    if constraints.is_empty() {
        format!("{} {}", name, sqltype(col.sqltype()))
    } else {
        format!(
            "{} {} {}",
            name,
            sqltype(col.sqltype()),
            constraints.join(" ")
        )
    }
}

fn define_constraint(column: &AColumn, reference: &ARef) -> String {
    format!(
        "FOREIGN KEY ({}) REFERENCES {}({})",
        helper::quote_reserved_word(column.name()),
        helper::quote_reserved_word(reference.table_name()),
        helper::quote_reserved_word(reference.column_name()),
    )
}

fn sqltype(ty: SqlType) -> &'static str {
    match ty {
        SqlType::BigInt => "INTEGER",
        SqlType::Text => "TEXT",
    }
}

#[derive(Debug)]
struct SQLitePlaceholderSource;
impl SQLitePlaceholderSource {
    fn new() -> Self {
        SQLitePlaceholderSource {}
    }
}
impl helper::PlaceholderSource for SQLitePlaceholderSource {
    fn next_placeholder(&mut self) -> Cow<'_, str> {
        // sqlite placeholder is always a question mark.
        Cow::Borrowed("?")
    }
}
