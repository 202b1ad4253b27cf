// Database migrations module

mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;
