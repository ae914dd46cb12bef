//! Postgres identity layer: user accounts and the pseudonym -> real-name
//! mapping. The graph never sees a name; everything here is keyed by
//! pseudonym id.

pub mod mock;
pub mod models;
pub mod postgres;
pub mod traits;

pub use postgres::PgIdentityStore;
pub use traits::IdentityStore;
