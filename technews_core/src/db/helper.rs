//! SQL generation shared by backends.

use super::Column;
use crate::query::Expr::{Column as ColumnExpr, Condition, Val};
use crate::query::{BoolExpr::*, Expr, Order, OrderDirection};
use crate::SqlVal;
use std::borrow::Cow;

pub trait PlaceholderSource {
    fn next_placeholder(&mut self) -> Cow<'_, str>;
}

/// Quotes the `word` if it is a reserved word.
pub fn quote_reserved_word(word: &str) -> Cow<'_, str> {
    if sqlparser::keywords::ALL_KEYWORDS.contains(&word.to_uppercase().as_str()) {
        format!("\"{word}\"").into()
    } else {
        word.into()
    }
}

/// Writes to `w` the SQL to express the expression given in `expr`. Values contained in `expr` are rendered
/// as placeholders in the SQL string and the actual values are added to `values`.
pub fn sql_for_expr<P>(expr: Expr, values: &mut Vec<SqlVal>, pls: &mut P, w: &mut String)
where
    P: PlaceholderSource,
{
    match expr {
        ColumnExpr(name) => w.push_str(&quote_reserved_word(name)),
        Val(v) => match v {
            // No risk of SQL injection with integers
            SqlVal::BigInt(i) => w.push_str(&i.to_string()),
            SqlVal::Null => w.push_str("NULL"),
            _ => {
                values.push(v);
                w.push_str(&pls.next_placeholder());
            }
        },
        Condition(c) => match *c {
            True => w.push_str("TRUE"),
            Eq(col, ex) => match ex {
                Expr::Val(SqlVal::Null) => {
                    w.push_str(&format!("{} IS NULL", quote_reserved_word(col)))
                }
                _ => {
                    w.push_str(&format!("{} = ", quote_reserved_word(col)));
                    sql_for_expr(ex, values, pls, w);
                }
            },
            And(a, b) => {
                w.push('(');
                sql_for_expr(Condition(a), values, pls, w);
                w.push_str(" AND ");
                sql_for_expr(Condition(b), values, pls, w);
                w.push(')');
            }
            Or(a, b) => {
                w.push('(');
                sql_for_expr(Condition(a), values, pls, w);
                w.push_str(" OR ");
                sql_for_expr(Condition(b), values, pls, w);
                w.push(')');
            }
            Subquery {
                col,
                tbl2,
                tbl2_col,
                expr,
            } => {
                w.push_str(&format!(
                    "{} IN (SELECT {} FROM {} WHERE ",
                    quote_reserved_word(col),
                    quote_reserved_word(tbl2_col),
                    quote_reserved_word(&tbl2),
                ));
                sql_for_expr(Condition(expr), values, pls, w);
                w.push(')');
            }
            In(_, vals) if vals.is_empty() => w.push_str("FALSE"),
            In(col, vals) => {
                w.push_str(&format!("{} IN (", quote_reserved_word(col)));
                let mut sep = "";
                for val in vals {
                    w.push_str(sep);
                    sql_for_expr(Val(val), values, pls, w);
                    sep = ", ";
                }
                w.push(')');
            }
        },
    }
}

pub fn sql_select(columns: &[Column], table: &str, w: &mut String) {
    w.push_str("SELECT ");
    list_columns(columns, w);
    w.push_str(&format!(" FROM {}", quote_reserved_word(table)));
}

pub fn sql_insert_with_placeholders(
    table: &str,
    columns: &[Column],
    pls: &mut impl PlaceholderSource,
    w: &mut String,
) {
    w.push_str(&format!("INSERT INTO {} ", quote_reserved_word(table)));
    if !columns.is_empty() {
        w.push('(');
        list_columns(columns, w);
        w.push_str(") VALUES (");
        let placeholders = columns
            .iter()
            .map(|_| pls.next_placeholder().into_owned())
            .collect::<Vec<String>>();
        w.push_str(&placeholders.join(", "));
        w.push(')');
    } else {
        w.push_str("DEFAULT VALUES");
    }
}

/// Writes to `w` the SQL of an UPDATE to `table` of `columns` using values in `pls`,
/// for the row uniquely identified by `pkcol`.
pub fn sql_update_with_placeholders(
    table: &str,
    pkcol: Column,
    columns: &[Column],
    pls: &mut impl PlaceholderSource,
    w: &mut String,
) {
    w.push_str(&format!("UPDATE {} SET ", quote_reserved_word(table)));
    let assignments = columns
        .iter()
        .map(|c| format!("{} = {}", quote_reserved_word(c.name()), pls.next_placeholder()))
        .collect::<Vec<String>>();
    w.push_str(&assignments.join(", "));
    w.push_str(&format!(
        " WHERE {} = {}",
        quote_reserved_word(pkcol.name()),
        pls.next_placeholder()
    ));
}

pub fn sql_limit(limit: i32, w: &mut String) {
    w.push_str(&format!(" LIMIT {limit}"));
}

pub fn sql_offset(offset: i32, w: &mut String) {
    w.push_str(&format!(" OFFSET {offset}"));
}

/// Writes to `w` the SQL of the list of column `order`.
pub fn sql_order(order: &[Order], w: &mut String) {
    let terms = order
        .iter()
        .map(|o| {
            let sql_dir = match o.direction {
                OrderDirection::Ascending => "ASC",
                OrderDirection::Descending => "DESC",
            };
            format!("{} {}", quote_reserved_word(o.column), sql_dir)
        })
        .collect::<Vec<String>>();
    w.push_str(" ORDER BY ");
    w.push_str(&terms.join(", "));
}

/// Writes to `w` the SQL of the list of `columns`.
pub fn list_columns(columns: &[Column], w: &mut String) {
    w.push_str(
        &columns
            .iter()
            .map(|c| quote_reserved_word(c.name()))
            .collect::<Vec<Cow<str>>>()
            .join(", "),
    );
}
