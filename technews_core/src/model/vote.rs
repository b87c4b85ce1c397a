use std::fmt;

use serde::Serialize;

use super::post::display_opt;
use crate::db::{BackendRow, Column};
use crate::lazy::Owned;
use crate::{AutoPk, DataObject, Result, SqlType, SqlValRef, ToSql};

/// An up-vote cast by a user on a post.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Generated on first save.
    pub id: AutoPk<i64>,
    /// The voting user. Set when the owning user is saved.
    pub user_id: Option<i64>,
    /// The post voted on.
    pub post_id: i64,
}

impl Vote {
    /// Create an unsaved vote on `post_id`.
    pub fn new(post_id: i64) -> Self {
        Vote {
            id: AutoPk::uninitialized(),
            user_id: None,
            post_id,
        }
    }
}

impl DataObject for Vote {
    const TABLE: &'static str = "vote";
    const PKCOL: &'static str = "id";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", SqlType::BigInt),
        Column::new("user_id", SqlType::BigInt),
        Column::new("post_id", SqlType::BigInt),
    ];
    const NON_AUTO_COLUMNS: &'static [Column] = &[
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
        Ok(Vote {
            id: row.get_as(0, &cols[0])?,
            user_id: row.get_as(1, &cols[1])?,
            post_id: row.get_as(2, &cols[2])?,
        })
    }
    fn non_auto_values(&self) -> Vec<SqlValRef<'_>> {
        vec![self.user_id.to_sql_ref(), self.post_id.to_sql_ref()]
    }
}

impl Owned for Vote {
    const OWNER_COL: &'static str = "user_id";
    fn set_owner(&mut self, owner: i64) {
        self.user_id = Some(owner);
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vote{{id={}, userId={}, postId={}}}",
            self.id,
            display_opt(self.user_id),
            self.post_id
        )
    }
}
