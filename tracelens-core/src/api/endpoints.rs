//! Explore-surface endpoints and response shapes
//!
//! URL builders and typed responses for the backend routes the dashboard
//! depends on. The client itself stays schema-agnostic; [`decode`] applies
//! the types at the call site, and every response struct defaults its
//! fields so a body lacking the expected aggregate keys reads as "no data"
//! rather than an error.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use urlencoding::encode;

use crate::types::{Cluster, Project};

use super::client::ApiClient;

/// Response from POST /api/explore/{project_id}/has-tasks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HasTasksResponse {
    pub has_tasks: bool,
}

/// Response from POST /api/explore/{project_id}/has-sessions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HasSessionsResponse {
    pub has_sessions: bool,
}

/// Response from POST /api/explore/{project_id}/has-enough-labelled-tasks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelledTasksResponse {
    pub project_id: String,
    /// Labelled-task count required before evaluation suggestions unlock
    pub enough_labelled_tasks: i64,
    pub has_enough_labelled_tasks: bool,
    pub currently_labelled_tasks: i64,
}

/// Response from POST /api/explore/{project_id}/clusters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClustersResponse {
    pub clusters: Vec<Cluster>,
}

/// One named series from the dashboard endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedSeries {
    pub graph_name: String,
    pub series: Vec<Value>,
}

/// Response from POST /api/explore/{project_id}/dashboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardResponse {
    pub graphs: Vec<NamedSeries>,
}

/// Response from POST /api/explore/{project_id}/aggregated
///
/// Row order is whatever the backend returned; the client never reorders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AggregatedResponse {
    pub aggregated: Vec<Value>,
}

impl AggregatedResponse {
    /// A well-formed zero-record response; rendered as an empty state,
    /// distinct from a failed request.
    pub fn is_empty(&self) -> bool {
        self.aggregated.is_empty()
    }
}

/// Response from POST /api/organizations/{org_id}/init
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganizationInitResponse {
    pub selected_project: Option<Project>,
    pub redirect_url: Option<String>,
}

/// Deserialize a response body, treating an unexpected shape as absent.
pub fn decode<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(error = %e, "unexpected response shape");
            None
        }
    }
}

impl ApiClient {
    /// POST /api/explore/{project_id}/has-tasks
    pub async fn has_tasks(&self, project_id: &str) -> Option<Value> {
        let path = format!("/api/explore/{}/has-tasks", encode(project_id));
        self.post(&path, &json!({})).await
    }

    /// POST /api/explore/{project_id}/has-sessions
    pub async fn has_sessions(&self, project_id: &str) -> Option<Value> {
        let path = format!("/api/explore/{}/has-sessions", encode(project_id));
        self.post(&path, &json!({})).await
    }

    /// POST /api/explore/{project_id}/has-enough-labelled-tasks
    pub async fn has_enough_labelled_tasks(&self, project_id: &str) -> Option<Value> {
        let path = format!(
            "/api/explore/{}/has-enough-labelled-tasks",
            encode(project_id)
        );
        self.post(&path, &json!({})).await
    }

    /// POST /api/explore/{project_id}/clusterings/{clustering_id}
    ///
    /// Returns the partial fields that changed since the last refresh.
    pub async fn clustering_status(&self, project_id: &str, clustering_id: &str) -> Option<Value> {
        let path = format!(
            "/api/explore/{}/clusterings/{}",
            encode(project_id),
            encode(clustering_id)
        );
        self.post(&path, &json!({})).await
    }

    /// POST /api/explore/{project_id}/clusters
    pub async fn clusters(
        &self,
        project_id: &str,
        clustering_id: &str,
        limit: usize,
    ) -> Option<Value> {
        let path = format!("/api/explore/{}/clusters", encode(project_id));
        let body = json!({ "clustering_id": clustering_id, "limit": limit });
        self.post(&path, &body).await
    }

    /// POST /api/explore/{project_id}/dashboard
    pub async fn dashboard(&self, project_id: &str, graph_names: &[&str]) -> Option<Value> {
        let path = format!("/api/explore/{}/dashboard", encode(project_id));
        let body = json!({ "graph_name": graph_names });
        self.post(&path, &body).await
    }

    /// POST /api/explore/{project_id}/aggregated
    pub async fn aggregated(&self, project_id: &str, payload: &Value) -> Option<Value> {
        let path = format!("/api/explore/{}/aggregated", encode(project_id));
        self.post(&path, payload).await
    }

    /// GET /api/projects/{project_id}
    pub async fn project(&self, project_id: &str) -> Option<Value> {
        let path = format!("/api/projects/{}", encode(project_id));
        self.get(&path).await
    }

    /// POST /api/organizations/{org_id}/init
    pub async fn init_organization(&self, org_id: &str) -> Option<Value> {
        let path = format!("/api/organizations/{}/init", encode(org_id));
        self.post(&path, &json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_typed_response() {
        let value = json!({ "has_tasks": true });
        let response: HasTasksResponse = decode(value).unwrap();
        assert!(response.has_tasks);
    }

    #[test]
    fn test_missing_keys_read_as_no_data() {
        // A body without the expected aggregate keys is "no data", not an error.
        let response: AggregatedResponse = decode(json!({})).unwrap();
        assert!(response.is_empty());

        let response: ClustersResponse = decode(json!({})).unwrap();
        assert!(response.clusters.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let decoded: Option<HasTasksResponse> = decode(json!("not an object"));
        assert!(decoded.is_none());
    }

    #[test]
    fn test_clusters_response_shape() {
        let value = json!({
            "clusters": [
                {
                    "id": "c1",
                    "clustering_id": "cl-1",
                    "name": "Refund requests",
                    "size": 42
                }
            ]
        });
        let response: ClustersResponse = decode(value).unwrap();
        assert_eq!(response.clusters.len(), 1);
        assert_eq!(response.clusters[0].name, "Refund requests");
        assert_eq!(response.clusters[0].size, 42);
        assert!(response.clusters[0].description.is_none());
    }
}
