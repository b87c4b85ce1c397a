use pretty_assertions::assert_eq;
use technews_core::db::sqlite::SQLiteBackend;
use technews_core::db::{Backend, Connection};
use technews_core::model::{Post, User};
use technews_core::schema::{self, technews_schema};
use technews_core::SqlType;
use technews_test_helper::*;
use technews_test_macros::technews_test;

mod common;
use common::*;

#[test]
fn schema_tables_in_dependency_order() {
    let schema = technews_schema();
    let names: Vec<&str> = schema.tables().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["user", "post", "vote", "comment"]);

    let user = schema.get_table("user").unwrap();
    assert!(user.pk().unwrap().is_pk());
    let email = user.get_column("email").unwrap();
    assert!(email.is_unique());
    assert!(!email.is_nullable());
    assert_eq!(email.sqltype(), SqlType::Text);

    let post_owner = schema.get_table("post").unwrap().get_column("user_id").unwrap();
    let reference = post_owner.reference().unwrap();
    assert_eq!(reference.table_name(), "user");
    assert_eq!(reference.column_name(), "id");
}

#[test]
fn create_table_sql() {
    let backend = SQLiteBackend::new();
    let schema = technews_schema();
    let sql = backend
        .create_table_sql(schema.get_table("user").unwrap(), true)
        .unwrap();
    assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"user\""));
    assert!(sql.contains("UNIQUE"));
    assert!(sql.trim_end().ends_with("STRICT;"));

    let sql = backend
        .create_table_sql(schema.get_table("vote").unwrap(), false)
        .unwrap();
    assert!(sql.starts_with("CREATE TABLE "));
    assert!(!sql.contains("IF NOT EXISTS"));
    assert!(sql.contains("FOREIGN KEY"));
    assert!(sql.contains("REFERENCES"));
}

#[technews_test(nomigrate)]
fn migrate_creates_tables(mut conn: Connection) {
    assert!(!schema::is_migrated(&conn).unwrap());
    schema::migrate(&mut conn).unwrap();
    assert!(schema::is_migrated(&conn).unwrap());
    for table in technews_schema().tables() {
        assert!(conn.has_table(&table.name).unwrap(), "{} missing", table.name);
    }
}

#[technews_test]
fn migrate_is_idempotent(mut conn: Connection) {
    let mut user = alice();
    save_with_content(&mut conn, &mut user, 1);

    schema::migrate(&mut conn).unwrap();

    let found = conn.find_by_id(user.id().unwrap()).unwrap().unwrap();
    assert_eq!(found.posts().get().unwrap().len(), 1);
}

#[technews_test]
fn clear_data_empties_every_table(mut conn: Connection) {
    let mut a = alice();
    let mut b = bob();
    save_with_content(&mut conn, &mut a, 2);
    save_with_content(&mut conn, &mut b, 1);

    schema::clear_data(&mut conn).unwrap();

    assert!(conn.find_all().unwrap().is_empty());
    assert!(Post::query().load(&conn).unwrap().is_empty());
    assert!(schema::is_migrated(&conn).unwrap());
    assert!(User::try_get(&conn, a.id().unwrap()).unwrap().is_none());
}
