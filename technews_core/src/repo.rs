//! Loading, saving and deleting a [`User`] together with the
//! collections it owns.

use std::borrow::Cow;

use crate::db::{BackendConnection, ConnectionMethods};
use crate::lazy::Owned;
use crate::model::{Comment, Post, User, Vote};
use crate::query::BoolExpr;
use crate::{debug, info, DataObject, DataObjectOps, Error, Result, SqlVal};

/// Column of [`Vote`] and [`Comment`] referring to a [`Post`].
const POST_REF_COL: &str = "post_id";

/// Data access for the user aggregate.
///
/// Loading a user always loads its posts. Votes and comments are bound
/// to the user and load on the first call to their `load` method.
pub trait UserRepository {
    /// Find a user by id. Returns `None` if there is no such user.
    fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    /// Find the user with the given email. Returns `None` if there is no such user.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// All users, ordered by id.
    fn find_all(&self) -> Result<Vec<User>>;
    /// Insert `user` if it has no id, otherwise update it. Loaded
    /// collections are saved too. Runs in a single transaction; on
    /// failure nothing is written and `user` is left unchanged.
    ///
    /// Returns `Error::UniqueViolation` if another user has the same email.
    fn save(&mut self, user: &mut User) -> Result<()>;
    /// Delete a user along with its posts, votes and comments, and any
    /// votes or comments on its posts. Runs in a single transaction;
    /// on failure nothing is deleted.
    ///
    /// Returns `Error::NoSuchObject` if there is no such user.
    fn delete_by_id(&mut self, id: i64) -> Result<()>;
}

impl<C: BackendConnection> UserRepository for C {
    fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        find_one(self, BoolExpr::eq(User::PKCOL, id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        find_one(self, BoolExpr::eq("email", email))
    }

    fn find_all(&self) -> Result<Vec<User>> {
        let users = User::query().order_asc(User::PKCOL).load(self)?;
        for user in &users {
            user.load_eager(self)?;
        }
        Ok(users)
    }

    fn save(&mut self, user: &mut User) -> Result<()> {
        let snapshot = user.clone();
        let tx = self.transaction()?;
        let result = save_aggregate(&tx, user).and_then(|_| tx.commit());
        match result {
            Ok(()) => {
                info!("saved user {}", user.id().unwrap_or_default());
                Ok(())
            }
            Err(e) => {
                debug!("save of user failed: {}", e);
                *user = snapshot;
                Err(e)
            }
        }
    }

    fn delete_by_id(&mut self, id: i64) -> Result<()> {
        let tx = self.transaction()?;
        let votes = tx.delete_where(Vote::TABLE, references_user_or_posts(Vote::OWNER_COL, id))?;
        let comments = tx.delete_where(
            Comment::TABLE,
            references_user_or_posts(Comment::OWNER_COL, id),
        )?;
        let posts = tx.delete_where(Post::TABLE, BoolExpr::eq(Post::OWNER_COL, id))?;
        let users = tx.delete(User::TABLE, User::PKCOL, SqlVal::BigInt(id))?;
        if users == 0 {
            tx.rollback()?;
            return Err(Error::NoSuchObject);
        }
        tx.commit()?;
        info!(
            "deleted user {} with {} posts, {} votes and {} comments",
            id, posts, votes, comments
        );
        Ok(())
    }
}

fn find_one(conn: &impl ConnectionMethods, expr: BoolExpr) -> Result<Option<User>> {
    let user = User::query().filter(expr).load_first(conn)?;
    if let Some(user) = &user {
        user.load_eager(conn)?;
    }
    Ok(user)
}

fn save_aggregate(conn: &impl ConnectionMethods, user: &mut User) -> Result<()> {
    DataObjectOps::save(user, conn)?;
    user.save_owned(conn)
}

/// Rows whose `owner_col` is the user, or which refer to one of the
/// user's posts.
fn references_user_or_posts(owner_col: &'static str, id: i64) -> BoolExpr {
    let on_users_posts = BoolExpr::Subquery {
        col: POST_REF_COL,
        tbl2: Cow::Borrowed(Post::TABLE),
        tbl2_col: Post::PKCOL,
        expr: Box::new(BoolExpr::eq(Post::OWNER_COL, id)),
    };
    BoolExpr::eq(owner_col, id).or(on_users_posts)
}
