use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use technews_core::db::Connection;
use technews_core::model::{Comment, Post, User, UserRelation, Vote};
use technews_core::Error;
use technews_test_helper::*;
use technews_test_macros::technews_test;

mod common;
use common::*;

#[technews_test]
fn save_generates_id(mut conn: Connection) {
    let mut user = User::new(None, "a", "a@x.com", "p");
    conn.save(&mut user).unwrap();
    let id = user.id().expect("id generated on save");

    let found = conn.find_by_id(id).unwrap().unwrap();
    assert_eq!(found.id(), Some(id));
    assert_eq!(found.username(), "a");
    assert_eq!(found.email(), "a@x.com");
    assert_eq!(found.password(), "p");
    assert!(!found.is_logged_in());
}

#[technews_test]
fn find_missing_user(conn: Connection) {
    assert!(conn.find_by_id(42).unwrap().is_none());
    assert!(conn.find_by_email("nobody@example.com").unwrap().is_none());
}

#[technews_test]
fn find_by_email(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    conn.save(&mut a).unwrap();
    conn.save(&mut b).unwrap();

    let found = conn.find_by_email("bob@example.com").unwrap().unwrap();
    assert_eq!(found.id(), b.id());
    assert_eq!(found.username(), "bob");
}

#[technews_test]
fn duplicate_email_is_rejected(mut conn: Connection) {
    let mut first = alice();
    conn.save(&mut first).unwrap();

    let mut second = User::new(None, "impostor", "alice@example.com", "x");
    let err = conn.save(&mut second).unwrap_err();
    assert_matches!(
        err,
        Error::UniqueViolation { ref table, ref column } if table == "user" && column == "email"
    );
    // A failed save leaves the user as it was.
    assert_eq!(second.id(), None);
    assert_eq!(conn.find_all().unwrap().len(), 1);

    let mut third = bob();
    conn.save(&mut third).unwrap();
    assert_eq!(conn.find_all().unwrap().len(), 2);
}

#[technews_test]
fn duplicate_email_on_update_is_rejected(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    conn.save(&mut a).unwrap();
    conn.save(&mut b).unwrap();

    b.set_email("alice@example.com");
    assert_matches!(conn.save(&mut b), Err(Error::UniqueViolation { .. }));
    assert_eq!(b.email(), "alice@example.com");
    let stored = conn.find_by_id(b.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.email(), "bob@example.com");
}

#[technews_test]
fn update_existing_user(mut conn: Connection) {
    let mut user = alice();
    conn.save(&mut user).unwrap();
    user.set_username("alicia");
    conn.save(&mut user).unwrap();

    let found = conn.find_by_id(user.id().unwrap()).unwrap().unwrap();
    assert_eq!(found.username(), "alicia");
    assert_eq!(conn.find_all().unwrap().len(), 1);
}

#[technews_test]
fn posts_survive_setting_the_id(mut conn: Connection) {
    let mut stored = alice();
    conn.save(&mut stored).unwrap();
    let id = stored.id().unwrap();

    let mut user = alice();
    user.set_posts(vec![Post::new("Kept", "https://example.com/kept")]);
    user.set_id(Some(id));
    conn.save(&mut user).unwrap();

    let found = conn.find_by_id(id).unwrap().unwrap();
    let posts = found.posts().get().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Kept");
    assert_eq!(posts[0].user_id, Some(id));
}

#[technews_test]
fn save_with_unknown_id_fails(mut conn: Connection) {
    let mut user = User::new(Some(1000), "ghost", "ghost@example.com", "p");
    assert_matches!(conn.save(&mut user), Err(Error::NoSuchObject));
}

#[technews_test]
fn logged_in_is_not_persisted(mut conn: Connection) {
    let mut user = alice();
    user.set_logged_in(true);
    conn.save(&mut user).unwrap();

    let found = conn.find_by_id(user.id().unwrap()).unwrap().unwrap();
    assert!(!found.is_logged_in());
}

#[technews_test]
fn posts_are_loaded_with_user(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 2);
    let id = user.id().unwrap();

    let found = conn.find_by_id(id).unwrap().unwrap();
    assert!(found.is_loaded(UserRelation::Posts));
    assert!(!found.is_loaded(UserRelation::Votes));
    assert!(!found.is_loaded(UserRelation::Comments));

    let titles: Vec<&str> = found
        .posts()
        .get()
        .unwrap()
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Post 0", "Post 1"]);
    assert!(found
        .posts()
        .get()
        .unwrap()
        .iter()
        .all(|p| p.user_id == Some(id)));
}

#[technews_test]
fn votes_and_comments_load_independently(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 1);
    let found = conn.find_by_email("alice@example.com").unwrap().unwrap();

    assert_matches!(found.votes().get(), Err(Error::ValueNotLoaded));
    let votes = found.votes().load(&conn).unwrap();
    assert_eq!(votes.len(), 1);
    assert!(found.is_loaded(UserRelation::Votes));
    assert!(!found.is_loaded(UserRelation::Comments));

    let comments = found.comments().load(&conn).unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_text, format!("on {}", votes[0].post_id));
}

#[technews_test]
fn delete_cascades_to_owned_rows(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 3);
    let id = user.id().unwrap();
    let post_ids: Vec<i64> = user
        .posts()
        .get()
        .unwrap()
        .iter()
        .map(|p| p.id.unwrap())
        .collect();
    assert_eq!(count_owned_by::<Post>(&conn, id), 3);
    assert_eq!(count_owned_by::<Vote>(&conn, id), 3);
    assert_eq!(count_owned_by::<Comment>(&conn, id), 3);

    conn.delete_by_id(id).unwrap();

    assert!(!user_exists(&conn, id));
    assert!(conn.find_by_id(id).unwrap().is_none());
    assert_eq!(count_owned_by::<Post>(&conn, id), 0);
    assert_eq!(count_owned_by::<Vote>(&conn, id), 0);
    assert_eq!(count_owned_by::<Comment>(&conn, id), 0);
    for post_id in post_ids {
        assert_eq!(count_on_post::<Vote>(&conn, post_id), 0);
        assert_eq!(count_on_post::<Comment>(&conn, post_id), 0);
    }
}

#[technews_test]
fn delete_removes_other_users_activity_on_deleted_posts(mut conn: Connection) {
    let mut author = alice();
    save_with_content(&mut conn, &mut author, 1);
    let post_id = author.posts().get().unwrap()[0].id.unwrap();

    let mut reader = bob();
    reader.set_votes(vec![Vote::new(post_id)]);
    reader.set_comments(vec![Comment::new("great read", post_id)]);
    conn.save(&mut reader).unwrap();
    let reader_id = reader.id().unwrap();
    assert_eq!(count_on_post::<Vote>(&conn, post_id), 2);

    conn.delete_by_id(author.id().unwrap()).unwrap();

    assert!(user_exists(&conn, reader_id));
    assert_eq!(count_owned_by::<Vote>(&conn, reader_id), 0);
    assert_eq!(count_owned_by::<Comment>(&conn, reader_id), 0);
}

#[technews_test]
fn delete_leaves_other_users_alone(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    save_with_content(&mut conn, &mut a, 1);
    save_with_content(&mut conn, &mut b, 2);

    conn.delete_by_id(a.id().unwrap()).unwrap();

    let b_id = b.id().unwrap();
    let found = conn.find_by_id(b_id).unwrap().unwrap();
    assert_eq!(found.posts().get().unwrap().len(), 2);
    assert_eq!(count_owned_by::<Vote>(&conn, b_id), 2);
    assert_eq!(count_owned_by::<Comment>(&conn, b_id), 2);
}

#[technews_test]
fn delete_missing_user(mut conn: Connection) {
    assert_matches!(conn.delete_by_id(5), Err(Error::NoSuchObject));
}

#[technews_test]
fn failed_cascade_rolls_back(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 2);
    let id = user.id().unwrap();

    conn.execute(
        "CREATE TRIGGER block_comment_delete BEFORE DELETE ON comment \
         BEGIN SELECT RAISE(ABORT, 'comments are forever'); END;",
    )
    .unwrap();

    assert!(conn.delete_by_id(id).is_err());

    assert!(user_exists(&conn, id));
    assert_eq!(count_owned_by::<Post>(&conn, id), 2);
    assert_eq!(count_owned_by::<Vote>(&conn, id), 2);
    assert_eq!(count_owned_by::<Comment>(&conn, id), 2);
}

#[technews_test]
fn find_all_orders_by_id(mut conn: Connection) {
    let mut b = bob();
    let mut a = alice();
    conn.save(&mut b).unwrap();
    conn.save(&mut a).unwrap();

    let emails: Vec<String> = conn
        .find_all()
        .unwrap()
        .iter()
        .map(|u| u.email().to_string())
        .collect();
    assert_eq!(emails, vec!["bob@example.com", "alice@example.com"]);
}
