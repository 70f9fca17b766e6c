//! # tracelens-core
//!
//! Client-side data-orchestration core for an analytics dashboard that
//! inspects logged LLM interactions (tasks, sessions, users, events,
//! topics, clusters) inside organizations and projects.
//!
//! This library provides:
//! - Shared filter/navigation state with subscription and persistence
//! - An authenticated fetch client that normalizes failure into a
//!   side-channel notice plus a `None` result
//! - A request cache with in-flight dedup, keep-previous-data, and
//!   interval revalidation
//! - The declarative analytics query model shared by every chart
//! - A cancellable polling loop for long-running clustering jobs
//!
//! The crate performs no aggregation, clustering, or evaluation itself;
//! it requests, caches, and displays results computed by the backend API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tracelens_core::{ApiClient, Config, ExploreService, FilterStore};
//!
//! # async fn example() -> tracelens_core::Result<()> {
//! let config = Config::load()?;
//! let (notices, _toasts) = tracelens_core::notify::channel();
//!
//! let client = Arc::new(ApiClient::new(&config.api, notices)?);
//! let filters = Arc::new(FilterStore::with_storage(Some(
//!     config.storage.resolved_filters_path(),
//! )));
//! let explore = ExploreService::new(client.clone(), filters.clone(), &config.polling);
//!
//! client.set_token(Some("token-from-identity-provider".to_string()));
//! filters.set_project_id(Some("proj-1".to_string()));
//!
//! if let Some(response) = explore.has_tasks().await {
//!     println!("has tasks: {}", response.has_tasks);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use api::ApiClient;
pub use cache::{CacheKey, RequestCache, RevalidateHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use explore::ExploreService;
pub use filters::{
    merge, DateRange, DateRangePreset, Debouncer, FilterSet, FilterStore, NavigationState,
    Pagination,
};
pub use notify::{Notice, NoticeLevel, Notices};
pub use poll::{spawn_poller, PollHandle, DEFAULT_POLL_INTERVAL};
pub use query::{AggregationOperation, AnalyticsQuery, Collection, TimeStep};
pub use types::*;

// Public modules
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod explore;
pub mod filters;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod query;
pub mod types;
