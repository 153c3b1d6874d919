//! # SocialAuth DB
//!
//! Connection pool setup and the persistence seams of the SocialAuth API.
//!
//! - [`repository`]: the [`AccountRepository`] and [`RefreshTokenStore`] traits
//! - [`postgres`]: PostgreSQL implementations backed by `sqlx`
//! - `memory`: in-process implementations (`test-utils` feature)
//!
//! ```ignore
//! use socialauth_db::{init_db_pool, PgAccountRepository};
//!
//! let pool = init_db_pool(&database_url).await?;
//! let accounts = PgAccountRepository::new(pool.clone());
//! ```

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryAccountRepository, InMemoryRefreshTokenStore};
pub use postgres::{PgAccountRepository, PgRefreshTokenStore};
pub use repository::{AccountRepository, RefreshTokenStore, duplicate_field};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects to PostgreSQL.
///
/// The returned pool is cheaply cloneable and shared through the
/// application state.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}
