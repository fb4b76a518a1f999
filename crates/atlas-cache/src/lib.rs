//! Atlas Cache
//!
//! Three independent TTL keyspaces for catalog data:
//!
//! | keyspace        | key                                 | default TTL |
//! |-----------------|-------------------------------------|-------------|
//! | environments    | workspace                           | 10 min      |
//! | diagram lists   | workspace + environment             | 5 min       |
//! | single diagram  | workspace + environment + diagram   | 2 min       |
//!
//! Entries are stored in moka; expiry is checked on read against tokio's
//! clock. Writers must invalidate affected keys before refetching.

#![warn(unreachable_pub)]

pub mod catalog;
pub mod config;
pub mod keys;
pub mod ttl;

pub use catalog::{CacheStats, CatalogCache};
pub use config::CacheConfig;
pub use keys::{DiagramKey, DiagramsKey, EnvironmentsKey};
pub use ttl::{CacheEntry, CacheStore, TtlCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
