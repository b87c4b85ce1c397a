use std::fmt;

use serde::Serialize;

use super::post::display_opt;
use crate::db::{BackendRow, Column};
use crate::lazy::Owned;
use crate::{AutoPk, DataObject, Result, SqlType, SqlValRef, ToSql};

/// A comment left by a user on a post.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Generated on first save.
    pub id: AutoPk<i64>,
    /// Body of the comment.
    pub comment_text: String,
    /// The author. Set when the owning user is saved.
    pub user_id: Option<i64>,
    /// The post commented on.
    pub post_id: i64,
}

impl Comment {
    /// Create an unsaved comment on `post_id`.
    pub fn new(comment_text: impl Into<String>, post_id: i64) -> Self {
        Comment {
            id: AutoPk::uninitialized(),
            comment_text: comment_text.into(),
            user_id: None,
            post_id,
        }
    }
}

impl DataObject for Comment {
    const TABLE: &'static str = "comment";
    const PKCOL: &'static str = "id";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", SqlType::BigInt),
        Column::new("comment_text", SqlType::Text),
        Column::new("user_id", SqlType::BigInt),
        Column::new("post_id", SqlType::BigInt),
    ];
    const NON_AUTO_COLUMNS: &'static [Column] = &[
        Column::new("comment_text", SqlType::Text),
        Column::new("user_id", SqlType::BigInt),
        Column::new("post_id", SqlType::BigInt),
    ];

    fn pk(&self) -> &AutoPk<i64> {
        &self.id
    }
    fn pk_mut(&mut self) -> &mut AutoPk<i64> {
        &mut self.id
    }
    fn from_row(row: &dyn BackendRow) -> Result<Self> {
        let cols = Self::COLUMNS;
        Ok(Comment {
            id: row.get_as(0, &cols[0])?,
            comment_text: row.get_as(1, &cols[1])?,
            user_id: row.get_as(2, &cols[2])?,
            post_id: row.get_as(3, &cols[3])?,
        })
    }
    fn non_auto_values(&self) -> Vec<SqlValRef<'_>> {
        vec![
            self.comment_text.to_sql_ref(),
            self.user_id.to_sql_ref(),
            self.post_id.to_sql_ref(),
        ]
    }
}

impl Owned for Comment {
    const OWNER_COL: &'static str = "user_id";
    fn set_owner(&mut self, owner: i64) {
        self.user_id = Some(owner);
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Comment{{id={}, commentText='{}', userId={}, postId={}}}",
            self.id,
            self.comment_text,
            display_opt(self.user_id),
            self.post_id
        )
    }
}
