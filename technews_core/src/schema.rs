//! Abstract representation of the technews database schema and the
//! operations which create and empty it.

use serde::{Deserialize, Serialize};

use crate::db::{Backend, BackendConnection, ConnectionMethods};
use crate::model::{Comment, Post, User, Vote};
use crate::query::BoolExpr;
use crate::{info, DataObject, Result, SqlType};

/// Abstract representation of a database column reference constraint.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ARef {
    table_name: String,
    column_name: String,
}
impl ARef {
    /// Create new reference to a table and column.
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        ARef {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }
    /// Get table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
    /// Get column name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }
}

/// Abstract representation of a database column schema.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AColumn {
    name: String,
    sqltype: SqlType,
    nullable: bool,
    pk: bool,
    unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<ARef>,
}
impl AColumn {
    /// Simple column that is non-null, non-pk and non-unique.
    pub fn new(name: impl Into<String>, sqltype: SqlType) -> Self {
        AColumn {
            name: name.into(),
            sqltype,
            nullable: false,
            pk: false,
            unique: false,
            reference: None,
        }
    }
    /// Integer primary key generated by the database.
    pub fn pk_auto(name: impl Into<String>) -> Self {
        AColumn {
            pk: true,
            ..Self::new(name, SqlType::BigInt)
        }
    }
    /// Add a unique constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
    /// Allow nulls.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
    /// Add a foreign key constraint referencing `table`.`column`.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.reference = Some(ARef::new(table, column));
        self
    }
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Column type.
    pub fn sqltype(&self) -> SqlType {
        self.sqltype
    }
    /// Whether the column accepts nulls.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
    /// Whether the column has a unique constraint.
    pub fn is_unique(&self) -> bool {
        self.unique
    }
    /// Whether the column is the primary key.
    pub fn is_pk(&self) -> bool {
        self.pk
    }
    /// The column this column refers to, if any.
    pub fn reference(&self) -> Option<&ARef> {
        self.reference.as_ref()
    }
}

/// Abstract representation of a database table schema.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ATable {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<AColumn>,
}
impl ATable {
    /// Create a table with no columns.
    pub fn new(name: impl Into<String>) -> ATable {
        ATable {
            name: name.into(),
            columns: Vec::new(),
        }
    }
    /// Append a column, returning `self` for chaining.
    pub fn column(mut self, col: AColumn) -> Self {
        self.columns.push(col);
        self
    }
    /// Find a column by name.
    pub fn get_column<'a>(&'a self, name: &str) -> Option<&'a AColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
    /// The primary key column.
    pub fn pk(&self) -> Option<&AColumn> {
        self.columns.iter().find(|c| c.is_pk())
    }
}

/// An ordered set of tables. Referenced tables come before the
/// tables referencing them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Schema {
    tables: Vec<ATable>,
}
impl Schema {
    /// Create a schema from tables in dependency order.
    pub fn new(tables: Vec<ATable>) -> Self {
        Schema { tables }
    }
    /// Tables in dependency order.
    pub fn tables(&self) -> impl Iterator<Item = &ATable> {
        self.tables.iter()
    }
    /// Find a table by name.
    pub fn get_table<'a>(&'a self, name: &str) -> Option<&'a ATable> {
        self.tables.iter().find(|t| t.name == name)
    }
    /// SQL creating every table.
    pub fn create_sql(&self, backend: &impl Backend, allow_exists: bool) -> Result<String> {
        let stmts = self
            .tables
            .iter()
            .map(|t| backend.create_table_sql(t, allow_exists))
            .collect::<Result<Vec<String>>>()?;
        Ok(stmts.join("\n"))
    }
}

/// The tables backing [`User`] and its owned collections.
pub fn technews_schema() -> Schema {
    let user = ATable::new(User::TABLE)
        .column(AColumn::pk_auto(User::PKCOL))
        .column(AColumn::new("username", SqlType::Text))
        .column(AColumn::new("email", SqlType::Text).unique())
        .column(AColumn::new("password", SqlType::Text));
    let post = ATable::new(Post::TABLE)
        .column(AColumn::pk_auto(Post::PKCOL))
        .column(AColumn::new("title", SqlType::Text))
        .column(AColumn::new("post_url", SqlType::Text))
        .column(AColumn::new("user_id", SqlType::BigInt).references(User::TABLE, User::PKCOL));
    let vote = ATable::new(Vote::TABLE)
        .column(AColumn::pk_auto(Vote::PKCOL))
        .column(AColumn::new("user_id", SqlType::BigInt).references(User::TABLE, User::PKCOL))
        .column(AColumn::new("post_id", SqlType::BigInt).references(Post::TABLE, Post::PKCOL));
    let comment = ATable::new(Comment::TABLE)
        .column(AColumn::pk_auto(Comment::PKCOL))
        .column(AColumn::new("comment_text", SqlType::Text))
        .column(AColumn::new("user_id", SqlType::BigInt).references(User::TABLE, User::PKCOL))
        .column(AColumn::new("post_id", SqlType::BigInt).references(Post::TABLE, Post::PKCOL));
    Schema::new(vec![user, post, vote, comment])
}

/// Create any missing tables. Safe to run repeatedly.
pub fn migrate(conn: &mut impl BackendConnection) -> Result<()> {
    let sql = technews_schema().create_sql(&conn.backend(), true)?;
    let tx = conn.transaction()?;
    tx.execute(&sql)?;
    tx.commit()?;
    info!("schema is up to date");
    Ok(())
}

/// Whether every table of the schema exists.
pub fn is_migrated(conn: &impl ConnectionMethods) -> Result<bool> {
    for table in technews_schema().tables() {
        if !conn.has_table(&table.name)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Delete every row from every table, children first.
pub fn clear_data(conn: &mut impl BackendConnection) -> Result<()> {
    let schema = technews_schema();
    let tx = conn.transaction()?;
    for table in schema.tables.iter().rev() {
        let cnt = tx.delete_where(&table.name, BoolExpr::True)?;
        info!("deleted {} rows from {}", cnt, table.name);
    }
    tx.commit()
}
