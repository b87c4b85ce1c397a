use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use technews_core::db::{connect, get_backend, Backend, Connection, ConnectionSpec};
use technews_core::repo::UserRepository;
use technews_core::Error;
use technews_test_helper::*;
use technews_test_macros::technews_test;

#[technews_test(nomigrate)]
fn connection_not_closed(conn: Connection) {
    assert!(!conn.is_closed());
    assert_eq!(conn.backend_name(), "sqlite");
    assert_eq!(conn.backend().name(), "sqlite");
}

#[test]
fn spec_from_prefixed_string() {
    let spec = ConnectionSpec::try_from("sqlite::memory:").unwrap();
    assert_eq!(spec.backend_name, "sqlite");
    assert_eq!(spec.connection_string(), ":memory:");
    connect(&spec).unwrap();
}

#[test]
fn spec_without_prefix_is_sqlite() {
    let spec = ConnectionSpec::try_from(":memory:").unwrap();
    assert_eq!(spec.backend_name, "sqlite");
    assert_eq!(spec.connection_string(), ":memory:");

    let spec = ConnectionSpec::try_from("news.db").unwrap();
    assert_eq!(spec, ConnectionSpec::new("sqlite", "news.db"));
}

#[test]
fn spec_with_unknown_backend() {
    assert_matches!(
        ConnectionSpec::try_from("oracle:scott@tiger"),
        Err(Error::UnknownBackend(ref name)) if name == "oracle"
    );

    let spec = ConnectionSpec::new("oracle", "scott@tiger");
    assert_matches!(spec.get_backend(), Err(Error::UnknownBackend(_)));
    assert_matches!(connect(&spec), Err(Error::UnknownBackend(_)));
    assert!(get_backend("oracle").is_none());
}

#[test]
fn spec_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let spec = ConnectionSpec::new("sqlite", dir.path().join("news.db").to_string_lossy());

    // A directory gets connection.json inside it.
    spec.save(dir.path()).unwrap();
    assert!(dir.path().join("connection.json").exists());
    assert_eq!(ConnectionSpec::load(dir.path()).unwrap(), spec);

    let file = dir.path().join("other.json");
    spec.save(&file).unwrap();
    assert_eq!(ConnectionSpec::load(&file).unwrap(), spec);
}

#[test]
fn spec_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert_matches!(
        ConnectionSpec::load(dir.path().join("missing.json")),
        Err(Error::IO(_))
    );
}

#[test]
fn file_database_persists_between_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("news.db");
    let spec = ConnectionSpec::new("sqlite", path.to_string_lossy());
    {
        let mut conn = connect(&spec).unwrap();
        setup_db(&mut conn);
        let mut user = technews_core::model::User::new(None, "a", "a@x.com", "p");
        conn.save(&mut user).unwrap();
    }
    let conn = connect(&spec).unwrap();
    assert!(technews_core::schema::is_migrated(&conn).unwrap());
    assert!(conn.find_by_email("a@x.com").unwrap().is_some());
}
