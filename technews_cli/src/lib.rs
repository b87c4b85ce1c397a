#![doc(hidden)]
//! This library is not stable, and usage is strongly discouraged.
//!
//! It is intended only to assist developing the CLI.
//! Backwards compatibility of the library will not be considered, as the
//! only objective of the crate is to provide a stable CLI.
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use technews_core::db::{self, Connection, ConnectionSpec};
use technews_core::model::{Comment, Post, User, UserRelation, Vote};
use technews_core::repo::UserRepository;
use technews_core::schema;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Environment variable holding a `backend:connection` string which
/// takes precedence over the saved connection.
pub const CONNECTION_ENV: &str = "TECHNEWS_CONNECTION";

/// How a user is identified on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserKey {
    Id(i64),
    Email(String),
}
impl From<&str> for UserKey {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(id) => UserKey::Id(id),
            Err(_) => UserKey::Email(s.to_string()),
        }
    }
}

pub fn init(backend: &str, connstr: &str) -> Result<ConnectionSpec> {
    if db::get_backend(backend).is_none() {
        bail!("Unknown backend {backend}");
    }

    let spec = ConnectionSpec::new(backend, connstr);
    db::connect(&spec)?; // ensure we can
    std::fs::create_dir_all(base_dir()?)?;
    spec.save(&base_dir()?)?;
    log::info!("saved connection to {}", base_dir()?.display());
    Ok(spec)
}

/// The connection to use. `explicit` is a `backend:connection` string
/// and wins over the one saved by [`init`].
pub fn load_connspec(explicit: Option<&str>) -> Result<ConnectionSpec> {
    if let Some(s) = explicit {
        return Ok(ConnectionSpec::try_from(s)?);
    }
    match ConnectionSpec::load(base_dir()?) {
        Ok(spec) => Ok(spec),
        Err(technews_core::Error::IO(_)) => Err(anyhow!(
            "No technews connection info found. Did you run technews init?"
        )),
        Err(e) => Err(e.into()),
    }
}

pub fn connect(spec: &ConnectionSpec) -> Result<Connection> {
    db::connect(spec).with_context(|| format!("could not connect to {}", spec.backend_name))
}

pub fn migrate(conn: &mut Connection) -> Result<()> {
    schema::migrate(conn)?;
    Ok(())
}

pub fn clear_data(conn: &mut Connection) -> Result<()> {
    ensure_migrated(conn)?;
    schema::clear_data(conn)?;
    Ok(())
}

pub fn add_user(conn: &mut Connection, username: &str, email: &str, password: &str) -> Result<User> {
    ensure_migrated(conn)?;
    let mut user = User::new(None, username, email, password);
    conn.save(&mut user)?;
    Ok(user)
}

/// Find a user and load every relation, so the result serializes in full.
pub fn show_user(conn: &Connection, key: &UserKey) -> Result<User> {
    ensure_migrated(conn)?;
    let user = find_user(conn, key)?;
    for relation in UserRelation::ALL {
        user.load_relation(relation, conn)?;
    }
    Ok(user)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    ensure_migrated(conn)?;
    Ok(conn.find_all()?)
}

pub fn delete_user(conn: &mut Connection, key: &UserKey) -> Result<i64> {
    ensure_migrated(conn)?;
    let id = match key {
        UserKey::Id(id) => *id,
        UserKey::Email(_) => find_user(conn, key)?
            .id()
            .ok_or_else(|| anyhow!("loaded user has no id"))?,
    };
    conn.delete_by_id(id)
        .with_context(|| format!("could not delete user {id}"))?;
    Ok(id)
}

pub fn add_post(conn: &mut Connection, key: &UserKey, title: &str, url: &str) -> Result<Post> {
    ensure_migrated(conn)?;
    let mut user = find_user(conn, key)?;
    user.posts_mut().push(&*conn, Post::new(title, url))?;
    conn.save(&mut user)?;
    last_saved(user.posts().get()?)
}

pub fn add_vote(conn: &mut Connection, key: &UserKey, post_id: i64) -> Result<Vote> {
    ensure_migrated(conn)?;
    let mut user = find_user(conn, key)?;
    user.votes_mut().push(&*conn, Vote::new(post_id))?;
    conn.save(&mut user)?;
    last_saved(user.votes().get()?)
}

pub fn add_comment(conn: &mut Connection, key: &UserKey, post_id: i64, text: &str) -> Result<Comment> {
    ensure_migrated(conn)?;
    let mut user = find_user(conn, key)?;
    user.comments_mut()
        .push(&*conn, Comment::new(text, post_id))?;
    conn.save(&mut user)?;
    last_saved(user.comments().get()?)
}

fn find_user(conn: &Connection, key: &UserKey) -> Result<User> {
    let found = match key {
        UserKey::Id(id) => conn.find_by_id(*id)?,
        UserKey::Email(email) => conn.find_by_email(email)?,
    };
    found.ok_or_else(|| match key {
        UserKey::Id(id) => anyhow!("No user with id {id}"),
        UserKey::Email(email) => anyhow!("No user with email {email}"),
    })
}

fn last_saved<T: Clone>(values: &[T]) -> Result<T> {
    values
        .last()
        .cloned()
        .ok_or_else(|| anyhow!("nothing was saved"))
}

fn ensure_migrated(conn: &Connection) -> Result<()> {
    if !schema::is_migrated(conn)? {
        bail!("The database has no technews tables. Did you run technews migrate?");
    }
    Ok(())
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn base_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|d| d.join(".technews"))
        .map_err(|e| e.into())
}

pub fn handle_error(r: Result<()>) {
    if let Err(e) = r {
        eprintln!("Encountered unexpected error: {e:#}");
        std::process::exit(1);
    }
}
