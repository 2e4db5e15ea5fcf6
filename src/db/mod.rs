//! Async PostgreSQL pooling (diesel_async over bb8) and the embedded
//! migration set.

mod pool;

pub use pool::{
    AsyncDbPool, MIGRATIONS, establish_async_connection_pool, run_pending_migrations,
};
