use pretty_assertions::assert_eq;
use technews_cli::*;
use technews_core::model::UserRelation;
use technews_test_helper::{setup_db, sqlite_connection};

#[test]
fn user_key_parsing() {
    assert_eq!(UserKey::from("12"), UserKey::Id(12));
    assert_eq!(
        UserKey::from("a@x.com"),
        UserKey::Email("a@x.com".to_string())
    );
}

#[test]
fn commands_require_schema() {
    let mut conn = sqlite_connection();
    let err = add_user(&mut conn, "a", "a@x.com", "p").unwrap_err();
    assert!(err.to_string().contains("technews migrate"));
}

#[test]
fn add_content_and_show() {
    let mut conn = sqlite_connection();
    setup_db(&mut conn);
    let user = add_user(&mut conn, "a", "a@x.com", "p").unwrap();
    let key = UserKey::Id(user.id().unwrap());

    let post = add_post(&mut conn, &key, "title", "https://example.com").unwrap();
    let post_id = post.id.unwrap();
    assert_eq!(post.user_id, user.id());
    let vote = add_vote(&mut conn, &key, post_id).unwrap();
    assert_eq!(vote.post_id, post_id);
    let comment = add_comment(&mut conn, &key, post_id, "first").unwrap();
    assert_eq!(comment.comment_text, "first");

    let shown = show_user(&conn, &UserKey::Email("a@x.com".to_string())).unwrap();
    for relation in UserRelation::ALL {
        assert!(shown.is_loaded(relation));
    }
    assert_eq!(shown.votes().get().unwrap().len(), 1);
    assert_eq!(shown.comments().get().unwrap().len(), 1);
}

#[test]
fn vote_on_missing_post_fails() {
    let mut conn = sqlite_connection();
    setup_db(&mut conn);
    let user = add_user(&mut conn, "a", "a@x.com", "p").unwrap();
    let key = UserKey::Id(user.id().unwrap());
    assert!(add_vote(&mut conn, &key, 999).is_err());
    let shown = show_user(&conn, &key).unwrap();
    assert!(shown.votes().get().unwrap().is_empty());
}

#[test]
fn delete_missing_user_fails() {
    let mut conn = sqlite_connection();
    setup_db(&mut conn);
    assert!(delete_user(&mut conn, &UserKey::Id(1)).is_err());
    assert!(delete_user(&mut conn, &UserKey::Email("nobody@x.com".to_string())).is_err());
}
