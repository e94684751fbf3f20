//! Tidyhome DB - Database abstractions
//!
//! SQLx-based access to the managed Postgres database behind the site.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidyhome_db::{create_pool, PoolOptions, Repositories};
//!
//! let pool = create_pool("postgres://localhost/tidyhome", PoolOptions::default())?;
//! let repos = Repositories::new(pool);
//!
//! let booking = repos.bookings.find_by_id(id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, DbPool, PoolOptions};
pub use repo::*;
