//! Core domain types for tracelens
//!
//! These types mirror the records the backend exposes for exploration.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Organization** | Billing/membership boundary owning Projects |
//! | **Project** | A stream of logged LLM interactions under an Organization |
//! | **Task** | One logged LLM interaction (input, output, evaluations) |
//! | **Session** | A group of Tasks from one conversation |
//! | **Cluster** | A named group of similar Tasks or Sessions |
//! | **Clustering** | An asynchronous backend job that produces Clusters |
//!
//! The client never computes any of these; it requests, caches, and displays
//! what the backend returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Project
// ============================================

/// A project containing logged LLM interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Human-friendly name
    pub project_name: String,
    /// Owning organization
    pub org_id: String,
    /// When this project was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Extensible backend-defined settings
    #[serde(default)]
    pub settings: serde_json::Value,
}

// ============================================
// Clustering
// ============================================

/// Lifecycle of a clustering job.
///
/// Transitions only move forward through `started → summaries → completed`,
/// or to `failed`. `completed` and `failed` are terminal: once observed,
/// polling for this job must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringStatus {
    /// Job accepted, embeddings being computed
    Started,
    /// Clusters found, summaries being generated
    Summaries,
    /// All clusters and summaries available
    Completed,
    /// Job aborted server-side; no automatic retry
    Failed,
}

impl ClusteringStatus {
    /// Whether this status ends the job's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClusteringStatus::Completed | ClusteringStatus::Failed)
    }

    /// Returns the identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringStatus::Started => "started",
            ClusteringStatus::Summaries => "summaries",
            ClusteringStatus::Completed => "completed",
            ClusteringStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ClusteringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClusteringStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(ClusteringStatus::Started),
            "summaries" => Ok(ClusteringStatus::Summaries),
            "completed" => Ok(ClusteringStatus::Completed),
            "failed" => Ok(ClusteringStatus::Failed),
            _ => Err(format!("unknown clustering status: {}", s)),
        }
    }
}

/// An asynchronous clustering job and its last known progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clustering {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Human-friendly name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text instruction the clusters were derived from
    #[serde(default)]
    pub instruction: Option<String>,
    /// Number of clusters produced so far
    #[serde(default)]
    pub nb_clusters: Option<u32>,
    /// Current lifecycle state
    pub status: ClusteringStatus,
    /// Advisory progress figure reported by the backend; not guaranteed
    /// monotonic, clamped only for display
    #[serde(default)]
    pub percent_of_completion: Option<f64>,
}

impl Clustering {
    /// Shallow-merge a partial status refresh into this job.
    ///
    /// Fields present in the update overwrite; absent fields keep their
    /// prior values.
    pub fn merge_update(&mut self, update: ClusteringUpdate) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(instruction) = update.instruction {
            self.instruction = Some(instruction);
        }
        if let Some(nb_clusters) = update.nb_clusters {
            self.nb_clusters = Some(nb_clusters);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(percent) = update.percent_of_completion {
            self.percent_of_completion = Some(percent);
        }
    }

    /// Completion percentage clamped to `[0, 100]` for display.
    pub fn percent_display(&self) -> f64 {
        self.percent_of_completion.unwrap_or(0.0).clamp(0.0, 100.0)
    }
}

/// Partial refresh payload for a clustering job.
///
/// The status endpoint returns only the fields that changed; everything is
/// optional so a sparse body deserializes cleanly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusteringUpdate {
    pub name: Option<String>,
    pub instruction: Option<String>,
    pub nb_clusters: Option<u32>,
    pub status: Option<ClusteringStatus>,
    pub percent_of_completion: Option<f64>,
}

// ============================================
// Cluster
// ============================================

/// A named group of similar records produced by a clustering job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// The job that produced this cluster
    pub clustering_id: String,
    /// Short generated name
    pub name: String,
    /// Longer generated summary
    #[serde(default)]
    pub description: Option<String>,
    /// Number of records in this cluster
    #[serde(default)]
    pub size: i64,
}
