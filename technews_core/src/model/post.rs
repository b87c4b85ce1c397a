use std::fmt;

use serde::Serialize;

use crate::db::{BackendRow, Column};
use crate::lazy::Owned;
use crate::{AutoPk, DataObject, Result, SqlType, SqlValRef, ToSql};

/// An article link submitted by a user.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Generated on first save.
    pub id: AutoPk<i64>,
    /// Headline shown in listings.
    pub title: String,
    /// Link to the article.
    pub post_url: String,
    /// The submitting user. Set when the owning user is saved.
    pub user_id: Option<i64>,
}

impl Post {
    /// Create an unsaved post with no owner.
    pub fn new(title: impl Into<String>, post_url: impl Into<String>) -> Self {
        Post {
            id: AutoPk::uninitialized(),
            title: title.into(),
            post_url: post_url.into(),
            user_id: None,
        }
    }
}

impl DataObject for Post {
    const TABLE: &'static str = "post";
    const PKCOL: &'static str = "id";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", SqlType::BigInt),
        Column::new("title", SqlType::Text),
        Column::new("post_url", SqlType::Text),
        Column::new("user_id", SqlType::BigInt),
    ];
    const NON_AUTO_COLUMNS: &'static [Column] = &[
        Column::new("title", SqlType::Text),
        Column::new("post_url", SqlType::Text),
        Column::new("user_id", SqlType::BigInt),
    ];

    fn pk(&self) -> &AutoPk<i64> {
        &self.id
    }
    fn pk_mut(&mut self) -> &mut AutoPk<i64> {
        &mut self.id
    }
    fn from_row(row: &dyn BackendRow) -> Result<Self> {
        let cols = Self::COLUMNS;
        Ok(Post {
            id: row.get_as(0, &cols[0])?,
            title: row.get_as(1, &cols[1])?,
            post_url: row.get_as(2, &cols[2])?,
            user_id: row.get_as(3, &cols[3])?,
        })
    }
    fn non_auto_values(&self) -> Vec<SqlValRef<'_>> {
        vec![
            self.title.to_sql_ref(),
            self.post_url.to_sql_ref(),
            self.user_id.to_sql_ref(),
        ]
    }
}

impl Owned for Post {
    const OWNER_COL: &'static str = "user_id";
    fn set_owner(&mut self, owner: i64) {
        self.user_id = Some(owner);
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Post{{id={}, title='{}', postUrl='{}', userId={}}}",
            self.id,
            self.title,
            self.post_url,
            display_opt(self.user_id)
        )
    }
}

pub(super) fn display_opt(val: Option<i64>) -> String {
    val.map_or_else(|| "null".to_string(), |v| v.to_string())
}
