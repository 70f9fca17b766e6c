//! High-level data access for dashboard views
//!
//! [`ExploreService`] is the seam between the filter store, the request
//! cache, and the API client: every operation builds its cache key from the
//! endpoint, the token, and the parameters that affect the response, then
//! goes through the cache so views get dedup and keep-previous-data for
//! free. Project-scoped operations stay disabled (a `None` key, no network
//! traffic) until both a token and a project selection exist.

use std::sync::Arc;
use std::time::Duration;

use crate::api::endpoints::{
    decode, AggregatedResponse, ClustersResponse, DashboardResponse, HasSessionsResponse,
    HasTasksResponse, LabelledTasksResponse, OrganizationInitResponse,
};
use crate::api::ApiClient;
use crate::cache::{CacheKey, RequestCache, RevalidateHandle};
use crate::config::PollingConfig;
use crate::filters::{merge, FilterSet, FilterStore};
use crate::poll::{spawn_poller, PollHandle};
use crate::query::AnalyticsQuery;
use crate::types::{Clustering, ClusteringUpdate, Project};

/// Shared data-access layer for a dashboard session.
pub struct ExploreService {
    client: Arc<ApiClient>,
    cache: Arc<RequestCache>,
    filters: Arc<FilterStore>,
    poll_interval: Duration,
}

impl ExploreService {
    pub fn new(
        client: Arc<ApiClient>,
        filters: Arc<FilterStore>,
        polling: &PollingConfig,
    ) -> Self {
        Self {
            client,
            cache: Arc::new(RequestCache::new()),
            filters,
            poll_interval: polling.clustering_interval(),
        }
    }

    /// The request cache backing this service, for explicit invalidation
    /// after mutations.
    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    /// Effective filters for a view: the global selection with the view's
    /// forced overrides applied.
    pub fn effective_filters(&self, forced: Option<&FilterSet>) -> FilterSet {
        let state = self.filters.snapshot();
        merge(&state.data_filters, forced)
    }

    /// Whether the selected project has any logged tasks.
    pub async fn has_tasks(&self) -> Option<HasTasksResponse> {
        let (key, project_id) = self.project_scope("has-tasks", &[]);
        let client = Arc::clone(&self.client);
        let value = self
            .cache
            .fetch_with(key, move || async move { client.has_tasks(&project_id).await })
            .await?;
        decode(value)
    }

    /// Whether the selected project has any logged sessions.
    pub async fn has_sessions(&self) -> Option<HasSessionsResponse> {
        let (key, project_id) = self.project_scope("has-sessions", &[]);
        let client = Arc::clone(&self.client);
        let value = self
            .cache
            .fetch_with(key, move || async move {
                client.has_sessions(&project_id).await
            })
            .await?;
        decode(value)
    }

    /// Labelling progress gating evaluation suggestions.
    pub async fn has_enough_labelled_tasks(&self) -> Option<LabelledTasksResponse> {
        let (key, project_id) = self.project_scope("has-enough-labelled-tasks", &[]);
        let client = Arc::clone(&self.client);
        let value = self
            .cache
            .fetch_with(key, move || async move {
                client.has_enough_labelled_tasks(&project_id).await
            })
            .await?;
        decode(value)
    }

    /// Clusters produced by a clustering job, newest first.
    pub async fn clusters(&self, clustering_id: &str, limit: usize) -> Option<ClustersResponse> {
        let (key, project_id) =
            self.project_scope("clusters", &[clustering_id, &limit.to_string()]);
        let client = Arc::clone(&self.client);
        let clustering_id = clustering_id.to_string();
        let value = self
            .cache
            .fetch_with(key, move || async move {
                client.clusters(&project_id, &clustering_id, limit).await
            })
            .await?;
        decode(value)
    }

    /// Named aggregate series for the landing dashboard.
    pub async fn dashboard(&self, graph_names: &[&str]) -> Option<DashboardResponse> {
        let (key, project_id) = self.project_scope("dashboard", &[&graph_names.join(",")]);
        let client = Arc::clone(&self.client);
        let graph_names: Vec<String> = graph_names.iter().map(|s| s.to_string()).collect();
        let value = self
            .cache
            .fetch_with(key, move || async move {
                let names: Vec<&str> = graph_names.iter().map(String::as_str).collect();
                client.dashboard(&project_id, &names).await
            })
            .await?;
        decode(value)
    }

    /// Run an aggregation query.
    ///
    /// The query is sent verbatim; a query without a project id is never
    /// issued. The serialized payload is part of the cache key, so equal
    /// queries share an entry and differing filters do not collide.
    pub async fn aggregated(&self, query: &AnalyticsQuery) -> Option<AggregatedResponse> {
        if !query.is_sendable() {
            tracing::debug!("aggregation skipped: no project selected");
            return None;
        }
        let payload = match serde_json::to_value(query) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize aggregation query");
                return None;
            }
        };

        let key = self.key("aggregated", &[&query.project_id, &payload.to_string()]);
        let client = Arc::clone(&self.client);
        let project_id = query.project_id.clone();
        let body = payload.clone();
        let value = self
            .cache
            .fetch_with(key, move || async move {
                client.aggregated(&project_id, &body).await
            })
            .await?;
        decode(value)
    }

    /// Project details by id.
    pub async fn project(&self, project_id: &str) -> Option<Project> {
        let key = self.key("project", &[project_id]);
        let client = Arc::clone(&self.client);
        let project_id = project_id.to_string();
        let value = self
            .cache
            .fetch_with(key, move || async move { client.project(&project_id).await })
            .await?;
        decode(value)
    }

    /// Resolve the initially selected project for an organization.
    ///
    /// Not cached: init is a one-shot login-time call with backend side
    /// effects, not a revalidatable read.
    pub async fn init_organization(&self, org_id: &str) -> Option<OrganizationInitResponse> {
        let value = self.client.init_organization(org_id).await?;
        decode(value)
    }

    /// Start polling `clustering` until it reaches a terminal status.
    ///
    /// Returns `None` when no project is selected. Dropping the handle
    /// cancels the loop; so does closing the view explicitly via
    /// [`PollHandle::cancel`].
    pub fn poll_clustering(&self, clustering: Clustering) -> Option<PollHandle> {
        let project_id = self.filters.snapshot().project_id?;
        let clustering_id = clustering.id.clone();
        let client = Arc::clone(&self.client);

        Some(spawn_poller(clustering, self.poll_interval, move || {
            let client = Arc::clone(&client);
            let project_id = project_id.clone();
            let clustering_id = clustering_id.clone();
            async move {
                let value = client.clustering_status(&project_id, &clustering_id).await?;
                decode::<ClusteringUpdate>(value)
            }
        }))
    }

    /// Keep the selected project's details fresh on a fixed interval, the
    /// pattern behind always-current usage/credits gauges.
    ///
    /// Returns `None` when no token or project is available yet.
    pub fn watch_project(&self, period: Duration) -> Option<RevalidateHandle> {
        let (key, project_id) = self.project_scope("project", &[]);
        let key = key?;
        let client = Arc::clone(&self.client);
        Some(self.cache.revalidate_every(key, period, move || {
            let client = Arc::clone(&client);
            let project_id = project_id.clone();
            async move { client.project(&project_id).await }
        }))
    }

    /// Cache key for a token-scoped request; `None` until a token exists.
    fn key(&self, operation: &str, params: &[&str]) -> Option<CacheKey> {
        let token = self.client.token()?;
        let mut parts = vec![operation.to_string(), token];
        parts.extend(params.iter().map(|p| p.to_string()));
        Some(CacheKey::new(parts))
    }

    /// Key + project id for a project-scoped request. The key stays `None`
    /// (fetch disabled) until both a token and a project selection exist.
    fn project_scope(&self, operation: &str, params: &[&str]) -> (Option<CacheKey>, String) {
        let project_id = self.filters.snapshot().project_id.unwrap_or_default();
        if project_id.is_empty() {
            return (None, project_id);
        }
        let mut all_params = vec![project_id.as_str()];
        all_params.extend_from_slice(params);
        let key = self.key(operation, &all_params);
        (key, project_id)
    }
}
