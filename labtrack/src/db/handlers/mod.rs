//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations via the [`Repository`] trait
//! - Handles query construction and parameter binding
//! - Returns record types from [`crate::db::models`]
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use labtrack::db::handlers::{Items, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Items::new(&mut tx);
//!     let items = repo.list(&ItemFilter::new(0, 100)).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod items;
pub mod repository;
pub mod rooms;
pub mod users;

pub use items::Items;
pub use repository::Repository;
pub use rooms::Rooms;
pub use users::Users;
