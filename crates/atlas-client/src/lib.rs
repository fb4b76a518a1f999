//! Atlas Client
//!
//! Data access for environments and diagrams.
//!
//! - [`Catalog`]: the CRUD seam every consumer codes against
//! - [`HttpCatalog`]: reqwest implementation with bearer auth
//! - [`CachedCatalog`]: cache-first reads, invalidate-on-write
//! - [`CatalogError`]: failure taxonomy shared by all implementations
//!
//! Credentials and sign-out are external collaborators, consumed through
//! [`CredentialProvider`] and [`SessionObserver`].

#![warn(unreachable_pub)]

pub mod auth;
pub mod cached;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod requests;

pub use auth::{CredentialProvider, LogSessionObserver, SessionObserver, StaticToken};
pub use cached::CachedCatalog;
pub use catalog::Catalog;
pub use config::ClientConfig;
pub use error::{CatalogError, CatalogResult};
pub use http::HttpCatalog;
pub use requests::{DiagramPatch, EnvironmentPatch, NewDiagram, NewEnvironment};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
