use pretty_assertions::assert_eq;
use technews_core::db::Connection;
use technews_core::model::{Post, User};
use technews_core::query::BoolExpr;
use technews_test_helper::*;
use technews_test_macros::technews_test;

mod common;
use common::*;

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

#[technews_test]
fn order_limit_offset(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 4);

    let newest = Post::query()
        .order_desc(Post::PKCOL)
        .limit(2)
        .load(&conn)
        .unwrap();
    assert_eq!(titles(&newest), vec!["Post 3", "Post 2"]);

    let skipped = Post::query()
        .order_asc(Post::PKCOL)
        .limit(2)
        .offset(1)
        .load(&conn)
        .unwrap();
    assert_eq!(titles(&skipped), vec!["Post 1", "Post 2"]);
}

#[technews_test]
fn filter_with_and(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    save_with_content(&mut conn, &mut a, 2);
    save_with_content(&mut conn, &mut b, 2);

    let found = Post::query()
        .filter(BoolExpr::eq("user_id", b.id().unwrap()).and(BoolExpr::eq("title", "Post 1")))
        .load(&conn)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].user_id, b.id());
}

#[technews_test]
fn query_delete(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    conn.save(&mut a).unwrap();
    conn.save(&mut b).unwrap();

    let deleted = User::query()
        .filter(BoolExpr::eq("email", "bob@example.com"))
        .delete(&conn)
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(user_exists(&conn, a.id().unwrap()));
    assert!(!user_exists(&conn, b.id().unwrap()));
}
