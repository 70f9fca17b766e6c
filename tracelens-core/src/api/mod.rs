//! Authenticated access to the dashboard backend API
//!
//! [`client::ApiClient`] owns the HTTP connection, the bearer token, and the
//! failure-to-notice normalization; [`endpoints`] adds the explore-surface
//! URL builders and typed response shapes on top.

pub mod client;
pub mod endpoints;

pub use client::ApiClient;
pub use endpoints::{
    decode, AggregatedResponse, ClustersResponse, DashboardResponse, HasSessionsResponse,
    HasTasksResponse, LabelledTasksResponse, NamedSeries, OrganizationInitResponse,
};
