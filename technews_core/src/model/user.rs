use std::fmt;

use serde::Serialize;

use super::{Comment, Post, Vote};
use crate::db::{BackendRow, Column, ConnectionMethods};
use crate::lazy::{Fetch, OneToMany};
use crate::{AutoPk, DataObject, Result, SqlType, SqlValRef, ToSql};

/// A registered user of the site.
///
/// Equality and hashing cover every field, including the transient
/// `logged_in` flag and the contents of all three collections. An
/// unloaded collection is not equal to a loaded empty one.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: AutoPk<i64>,
    username: String,
    email: String,
    password: String,
    logged_in: bool,
    posts: OneToMany<Post>,
    votes: OneToMany<Vote>,
    comments: OneToMany<Comment>,
}

/// The collections owned by a [`User`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UserRelation {
    /// Submitted posts.
    Posts,
    /// Votes cast.
    Votes,
    /// Comments written.
    Comments,
}

impl UserRelation {
    /// Every relation, in declaration order.
    pub const ALL: [UserRelation; 3] = [
        UserRelation::Posts,
        UserRelation::Votes,
        UserRelation::Comments,
    ];

    /// When the relation is read from the database.
    pub const fn fetch(self) -> Fetch {
        match self {
            UserRelation::Posts => Fetch::Eager,
            UserRelation::Votes | UserRelation::Comments => Fetch::Lazy,
        }
    }
}

const fn eager_count() -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < UserRelation::ALL.len() {
        if matches!(UserRelation::ALL[i].fetch(), Fetch::Eager) {
            count += 1;
        }
        i += 1;
    }
    count
}

const _: () = assert!(
    eager_count() == 1,
    "exactly one user relation may be fetched eagerly"
);

impl User {
    /// Create a user. Pass `None` for `id` to have one generated when
    /// the user is first saved. No field is validated.
    pub fn new(
        id: Option<i64>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut user = User {
            id: AutoPk::from(id),
            username: username.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        };
        user.bind_relations();
        user
    }

    /// The generated id, if the user has been saved.
    pub fn id(&self) -> Option<i64> {
        *self.id
    }
    /// Replace the id. Collections keep their values and belong to the
    /// new id from now on.
    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = AutoPk::from(id);
        self.posts.rebind(id);
        self.votes.rebind(id);
        self.comments.rebind(id);
    }

    /// Display name. Not required to be unique.
    pub fn username(&self) -> &str {
        &self.username
    }
    /// Set the display name.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Email address. Unique across all users.
    pub fn email(&self) -> &str {
        &self.email
    }
    /// Set the email address.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// The stored credential, verbatim.
    pub fn password(&self) -> &str {
        &self.password
    }
    /// Set the stored credential.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Session flag. Never persisted.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }
    /// Set the session flag.
    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    /// Posts, loaded whenever the user is loaded.
    pub fn posts(&self) -> &OneToMany<Post> {
        &self.posts
    }
    /// Mutable access to the posts.
    pub fn posts_mut(&mut self) -> &mut OneToMany<Post> {
        &mut self.posts
    }
    /// Replace the posts.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts.set(posts);
    }

    /// Votes, loaded on first call to [`OneToMany::load`].
    pub fn votes(&self) -> &OneToMany<Vote> {
        &self.votes
    }
    /// Mutable access to the votes.
    pub fn votes_mut(&mut self) -> &mut OneToMany<Vote> {
        &mut self.votes
    }
    /// Replace the votes.
    pub fn set_votes(&mut self, votes: Vec<Vote>) {
        self.votes.set(votes);
    }

    /// Comments, loaded on first call to [`OneToMany::load`].
    pub fn comments(&self) -> &OneToMany<Comment> {
        &self.comments
    }
    /// Mutable access to the comments.
    pub fn comments_mut(&mut self) -> &mut OneToMany<Comment> {
        &mut self.comments
    }
    /// Replace the comments.
    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments.set(comments);
    }

    /// Whether `relation` is available without a database call.
    pub fn is_loaded(&self, relation: UserRelation) -> bool {
        match relation {
            UserRelation::Posts => self.posts.is_loaded(),
            UserRelation::Votes => self.votes.is_loaded(),
            UserRelation::Comments => self.comments.is_loaded(),
        }
    }

    /// Load `relation` if it is not already loaded.
    pub fn load_relation(&self, relation: UserRelation, conn: &impl ConnectionMethods) -> Result<()> {
        match relation {
            UserRelation::Posts => self.posts.load(conn).map(|_| ()),
            UserRelation::Votes => self.votes.load(conn).map(|_| ()),
            UserRelation::Comments => self.comments.load(conn).map(|_| ()),
        }
    }

    /// Load every relation configured as [`Fetch::Eager`].
    pub fn load_eager(&self, conn: &impl ConnectionMethods) -> Result<()> {
        for relation in UserRelation::ALL {
            if relation.fetch() == Fetch::Eager {
                self.load_relation(relation, conn)?;
            }
        }
        Ok(())
    }

    /// Save every loaded collection. The user must already have an
    /// id. Posts are saved first since votes and comments may refer to
    /// them.
    pub fn save_owned(&mut self, conn: &impl ConnectionMethods) -> Result<()> {
        self.posts.save(conn)?;
        self.votes.save(conn)?;
        self.comments.save(conn)
    }
}

impl DataObject for User {
    const TABLE: &'static str = "user";
    const PKCOL: &'static str = "id";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", SqlType::BigInt),
        Column::new("username", SqlType::Text),
        Column::new("email", SqlType::Text),
        Column::new("password", SqlType::Text),
    ];
    const NON_AUTO_COLUMNS: &'static [Column] = &[
        Column::new("username", SqlType::Text),
        Column::new("email", SqlType::Text),
        Column::new("password", SqlType::Text),
    ];

    fn pk(&self) -> &AutoPk<i64> {
        &self.id
    }
    fn pk_mut(&mut self) -> &mut AutoPk<i64> {
        &mut self.id
    }
    fn from_row(row: &dyn BackendRow) -> Result<Self> {
        let cols = Self::COLUMNS;
        Ok(User {
            id: row.get_as(0, &cols[0])?,
            username: row.get_as(1, &cols[1])?,
            email: row.get_as(2, &cols[2])?,
            password: row.get_as(3, &cols[3])?,
            ..Default::default()
        })
    }
    fn non_auto_values(&self) -> Vec<SqlValRef<'_>> {
        vec![
            self.username.to_sql_ref(),
            self.email.to_sql_ref(),
            self.password.to_sql_ref(),
        ]
    }
    fn bind_relations(&mut self) {
        if let Some(id) = *self.id {
            self.posts.ensure_init(id);
            self.votes.ensure_init(id);
            self.comments.ensure_init(id);
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User{{id={}, username='{}', email='{}', password='{}', loggedIn={}, posts={}, votes={}, comments={}}}",
            self.id,
            self.username,
            self.email,
            self.password,
            self.logged_in,
            self.posts,
            self.votes,
            self.comments
        )
    }
}
