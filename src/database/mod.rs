//! Postgres connection pool and schema migrations.

mod pool;

pub use pool::{create_pool, run_migrations, Database, DatabaseError};
