#![allow(dead_code)] //this module is used by multiple tests, not all use all parts
use technews_core::db::Connection;
use technews_core::model::{Comment, Post, User, Vote};
use technews_core::query::BoolExpr;
use technews_core::repo::UserRepository;
use technews_core::{DataObject, DataObjectOps};

pub fn alice() -> User {
    User::new(None, "alice", "alice@example.com", "hunter2")
}

pub fn bob() -> User {
    User::new(None, "bob", "bob@example.com", "correct horse")
}

/// Save `user` with `posts` posts, then one vote and one comment on
/// each of them.
pub fn save_with_content(conn: &mut Connection, user: &mut User, posts: usize) {
    user.set_posts(
        (0..posts)
            .map(|i| Post::new(format!("Post {i}"), format!("https://example.com/{i}")))
            .collect(),
    );
    conn.save(user).unwrap();

    let post_ids: Vec<i64> = user
        .posts()
        .get()
        .unwrap()
        .iter()
        .map(|p| p.id.unwrap())
        .collect();
    for post_id in post_ids {
        user.votes_mut().push(&*conn, Vote::new(post_id)).unwrap();
        user.comments_mut()
            .push(&*conn, Comment::new(format!("on {post_id}"), post_id))
            .unwrap();
    }
    conn.save(user).unwrap();
}

/// Number of rows of `T` whose `user_id` is `user_id`.
pub fn count_owned_by<T: DataObject>(conn: &Connection, user_id: i64) -> usize {
    T::query()
        .filter(BoolExpr::eq("user_id", user_id))
        .load(conn)
        .unwrap()
        .len()
}

/// Number of rows of `T` whose `post_id` is `post_id`.
pub fn count_on_post<T: DataObject>(conn: &Connection, post_id: i64) -> usize {
    T::query()
        .filter(BoolExpr::eq("post_id", post_id))
        .load(conn)
        .unwrap()
        .len()
}

pub fn user_exists(conn: &Connection, id: i64) -> bool {
    User::try_get(conn, id).unwrap().is_some()
}
