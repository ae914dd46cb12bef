//! Neo4j graph layer: typed nodes, the `GraphStore` trait, the production
//! client, and an in-memory mock for tests.

pub mod client;
pub mod mock;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use traits::GraphStore;
