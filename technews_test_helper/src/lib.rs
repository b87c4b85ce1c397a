//! Test helpers to set up database connections.
//! Macros depend on [`technews_core`], `env_logger` and [`log`].
#![deny(missing_docs)]

#[cfg(feature = "sqlite")]
use technews_core::db::sqlite::{self, SQLiteBackend};
use technews_core::db::{get_backend, Backend};
use technews_core::schema;

// Re-export as they are used by the macros.
pub use technews_core::db::{BackendConnection, Connection};

/// Trait for running a test.
pub trait BackendTestInstance {
    /// Run a synchronous test.
    fn run_test_sync(test: impl FnOnce(Connection), migrate: bool);
}

/// Instance of a SQLite test.
#[cfg(feature = "sqlite")]
#[derive(Default)]
pub struct SQLiteTestInstance {}

#[cfg(feature = "sqlite")]
impl BackendTestInstance for SQLiteTestInstance {
    fn run_test_sync(test: impl FnOnce(Connection), migrate: bool) {
        common_setup();
        log::info!("connecting to sqlite memory database..");
        let mut conn = SQLiteBackend::new()
            .connect(":memory:")
            .expect("Could not connect sqlite backend");
        if migrate {
            setup_db(&mut conn);
        }
        log::info!("running sqlite test");
        test(conn);
    }
}

/// Populate the database schema.
pub fn setup_db(conn: &mut Connection) {
    schema::migrate(conn).expect("could not create schema");
    log::info!("created schema");
}

/// Create a sqlite [`Connection`].
#[cfg(feature = "sqlite")]
pub fn sqlite_connection() -> Connection {
    let backend = get_backend(sqlite::BACKEND_NAME).expect("sqlite backend is available");
    backend.connect(":memory:").expect("could not open sqlite")
}

fn common_setup() {
    env_logger::try_init().ok();
}
