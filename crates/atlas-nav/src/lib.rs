//! Environment/diagram navigation for Atlas
//!
//! The [`Navigator`] drives a three-step load (environments, then the
//! selected environment's diagram list, then the selected diagram) over a
//! [`CachedCatalog`](atlas_client::CachedCatalog) and publishes a
//! [`NavigationState`] that the UI renders from.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  commit  ┌──────────────────┐  watch  ┌────────┐
//! │  Navigator   │─────────▶│ NavigationState  │────────▶│   UI   │
//! │ (one action  │          └──────────────────┘         └────────┘
//! │  at a time)  │─────────▶ LocationReconciler ───────▶ location bar
//! └──────┬───────┘
//!        │ reads/writes
//!        ▼
//!  CachedCatalog ──▶ Catalog (HTTP)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use atlas_cache::CatalogCache;
//! use atlas_client::{CachedCatalog, HttpCatalog, LogSessionObserver, StaticToken};
//! use atlas_model::WorkspaceId;
//! use atlas_nav::{MemoryLocation, Navigator, NavigatorConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NavigatorConfig::default();
//! let http = HttpCatalog::new(
//!     config.client.clone(),
//!     Arc::new(StaticToken("token".into())),
//!     Arc::new(LogSessionObserver),
//! )?;
//! let catalog = CachedCatalog::new(Arc::new(http), CatalogCache::new(config.cache.clone()));
//! let nav = Navigator::new(
//!     WorkspaceId::new("ws-1"),
//!     catalog,
//!     Arc::new(MemoryLocation::new()),
//!     config,
//! );
//!
//! nav.load(None).await?;
//! println!("{:?}", nav.snapshot().phase);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod location;
pub mod navigator;
pub mod notify;
pub mod paths;
pub mod state;
pub mod transition;

pub use config::NavigatorConfig;
pub use debounce::Debouncer;
pub use error::{NavError, NavResult};
pub use events::{CanvasEvent, EventBus};
pub use location::{slugify, Location, LocationHint, LocationReconciler, LocationSink, MemoryLocation};
pub use navigator::{NavOutcome, Navigator, SaveOutcome};
pub use notify::{Level, Notification, Notifier};
pub use paths::{DiagramPaths, EnvironmentPaths};
pub use state::{allowed_transitions, validate_transition, LocationPair, NavigationState, Phase};
pub use transition::Transition;
