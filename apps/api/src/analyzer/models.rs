use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platforms::github::GitHubProfile;

/// One analysis run's progress stage. Bands: Basic 0–30, Detailed 30–70,
/// Advanced 70–95, Complete 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Basic,
    Detailed,
    Advanced,
    Complete,
}

/// Progress event delivered to the channel supplied for one `analyze` call.
/// The subscription is scoped to the call; there is no shared per-username
/// listener registry.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisProgress {
    pub run_id: Uuid,
    pub stage: AnalysisStage,
    /// 0–100.
    pub progress: u8,
    pub current_task: String,
    pub estimated_seconds_remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub language: String,
    pub percentage: f64,
    pub color: String,
    /// Derived 0–100, not upstream data.
    pub proficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryCategory {
    pub name: String,
    pub count: usize,
    /// Over the active (non-fork, non-archived) repository count.
    pub percentage: f64,
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekActivity {
    pub week_start: DateTime<Utc>,
    pub commits: u32,
    pub additions: u32,
    pub deletions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetrics {
    pub total_stars: u32,
    pub total_forks: u32,
    pub followers: u32,
    pub active_repos: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectComplexity {
    pub avg_repo_size_kb: f64,
    pub language_diversity: usize,
    pub topic_coverage: usize,
    pub mature_repos: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub total_stars: u32,
    pub total_forks: u32,
    pub total_watchers: u32,
    pub followers: u32,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeveloperLevel {
    Junior,
    Mid,
    Senior,
    Expert,
}

impl std::fmt::Display for DeveloperLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeveloperLevel::Junior => write!(f, "Junior"),
            DeveloperLevel::Mid => write!(f, "Mid-Level"),
            DeveloperLevel::Senior => write!(f, "Senior"),
            DeveloperLevel::Expert => write!(f, "Expert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperClassification {
    pub level: DeveloperLevel,
    /// 0–100.
    pub confidence: f64,
    /// Top category names, strongest first.
    pub specialties: Vec<String>,
}

/// The analyzer's aggregate output: one versioned snapshot, regenerated
/// wholesale and cached as a single entry, never field-patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperAnalysis {
    pub profile: GitHubProfile,
    pub language_stats: Vec<LanguageProfile>,
    pub repository_categories: Vec<RepositoryCategory>,
    pub activity_patterns: Vec<WeekActivity>,
    pub collaboration: CollaborationMetrics,
    pub complexity: ProjectComplexity,
    pub classification: DeveloperClassification,
    pub impact: ImpactMetrics,
    pub last_analyzed: DateTime<Utc>,
    pub cache_expiry: DateTime<Utc>,
}
