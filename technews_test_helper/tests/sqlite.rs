//! Integration tests for SQLite support
#![cfg(feature = "sqlite")]

use technews_core::db::{BackendConnection, ConnectionMethods};
use technews_core::schema;
use technews_test_helper::{sqlite_connection, BackendTestInstance, SQLiteTestInstance};

/// Test that we can create a SQLite in-memory connection
#[test]
fn connection_creation() {
    let conn = sqlite_connection();
    assert_eq!(conn.backend_name(), "sqlite");
    assert!(!conn.is_closed());
}

/// Each in-memory connection has its own database
#[test]
fn connections_are_independent() {
    let mut conn1 = sqlite_connection();
    let conn2 = sqlite_connection();
    schema::migrate(&mut conn1).unwrap();
    assert!(schema::is_migrated(&conn1).unwrap());
    assert!(!schema::is_migrated(&conn2).unwrap());
}

#[test]
fn instance_migrates_when_asked() {
    SQLiteTestInstance::run_test_sync(
        |conn| assert!(conn.has_table("user").unwrap()),
        true,
    );
    SQLiteTestInstance::run_test_sync(
        |conn| assert!(!conn.has_table("user").unwrap()),
        false,
    );
}
