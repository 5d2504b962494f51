//! GitHub profile analyzer: fetches profile and repositories through the
//! cache-aware client, derives the secondary metrics, and assembles one
//! `DeveloperAnalysis` snapshot per run. Progress is reported through a
//! channel scoped to the call, so concurrent analyses never clobber each
//! other's listeners.

pub mod activity;
pub mod categories;
pub mod classification;
pub mod languages;
pub mod metrics;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::cache::CacheStore;
use crate::platforms::github::GitHubClient;
use crate::platforms::PlatformError;

pub use crate::analyzer::models::{AnalysisProgress, AnalysisStage, DeveloperAnalysis};

const SERVICE: &str = "analyzer";
const METHOD: &str = "analysis";
const SNAPSHOT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

pub struct ProfileAnalyzer {
    github: Arc<GitHubClient>,
    cache: Arc<CacheStore>,
}

struct ProgressReporter {
    run_id: Uuid,
    started: Instant,
    sink: Option<UnboundedSender<AnalysisProgress>>,
}

impl ProgressReporter {
    fn emit(&self, stage: AnalysisStage, progress: u8, task: &str) {
        let Some(sink) = &self.sink else { return };
        let elapsed = self.started.elapsed().as_secs();
        let remaining = if progress == 0 {
            20
        } else {
            elapsed * (100 - progress as u64) / progress as u64
        };
        // A dropped receiver just means nobody is listening anymore.
        let _ = sink.send(AnalysisProgress {
            run_id: self.run_id,
            stage,
            progress,
            current_task: task.to_string(),
            estimated_seconds_remaining: remaining,
        });
    }
}

impl ProfileAnalyzer {
    pub fn new(github: Arc<GitHubClient>, cache: Arc<CacheStore>) -> Self {
        Self { github, cache }
    }

    /// Runs (or short-circuits to a cached snapshot of) one full analysis.
    /// `progress` receives stage events for the duration of this call only.
    pub async fn analyze(
        &self,
        username: &str,
        force_refresh: bool,
        progress: Option<UnboundedSender<AnalysisProgress>>,
    ) -> Result<DeveloperAnalysis, PlatformError> {
        let reporter = ProgressReporter {
            run_id: Uuid::new_v4(),
            started: Instant::now(),
            sink: progress,
        };

        if force_refresh {
            self.cache.invalidate(SERVICE, METHOD, username).await;
        } else if let Some(snapshot) = self
            .cache
            .get::<DeveloperAnalysis>(SERVICE, METHOD, username)
            .await
        {
            if snapshot.cache_expiry > Utc::now() {
                reporter.emit(AnalysisStage::Complete, 100, "Loaded cached analysis");
                return Ok(snapshot);
            }
        }

        info!("starting analysis run {} for {username}", reporter.run_id);

        // Basic: 0–30
        reporter.emit(AnalysisStage::Basic, 5, "Fetching profile");
        let profile = self.github.fetch_user_profile(username, force_refresh).await?;
        reporter.emit(AnalysisStage::Basic, 15, "Fetching repositories");
        let repos = self
            .github
            .fetch_user_repositories(username, force_refresh)
            .await?;
        reporter.emit(AnalysisStage::Basic, 22, "Computing language statistics");
        let raw_languages = self
            .github
            .fetch_language_stats(username, force_refresh)
            .await?;
        let language_stats = languages::build_profiles(&raw_languages);
        reporter.emit(AnalysisStage::Basic, 30, "Basic analysis complete");

        // Detailed: 30–70
        reporter.emit(AnalysisStage::Detailed, 40, "Measuring collaboration");
        let collaboration = metrics::collaboration(&repos, profile.followers);
        let complexity = metrics::complexity(&repos);
        reporter.emit(AnalysisStage::Detailed, 50, "Categorizing repositories");
        let repository_categories = categories::categorize(&repos);
        reporter.emit(AnalysisStage::Detailed, 55, "Deriving activity patterns");
        let active: Vec<_> = repos.iter().filter(|r| r.is_active()).cloned().collect();
        let activity_patterns = activity::derive(&self.github, username, &active).await;
        reporter.emit(AnalysisStage::Detailed, 70, "Detailed analysis complete");

        // Advanced: 70–95
        reporter.emit(AnalysisStage::Advanced, 80, "Classifying developer profile");
        let avg_complexity = languages::average_complexity(
            language_stats.iter().map(|l| l.language.as_str()),
        );
        let classification = classification::classify(
            active.len(),
            collaboration.total_stars,
            avg_complexity,
            &repository_categories,
        );
        let impact = metrics::impact(&repos, profile.followers);
        reporter.emit(AnalysisStage::Advanced, 95, "Advanced analysis complete");

        let now = Utc::now();
        let analysis = DeveloperAnalysis {
            profile,
            language_stats,
            repository_categories,
            activity_patterns,
            collaboration,
            complexity,
            classification,
            impact,
            last_analyzed: now,
            cache_expiry: now + chrono::Duration::from_std(SNAPSHOT_TTL).unwrap_or(chrono::Duration::hours(6)),
        };

        self.cache
            .set(SERVICE, METHOD, username, &analysis, Some(SNAPSHOT_TTL))
            .await;
        reporter.emit(AnalysisStage::Complete, 100, "Analysis complete");
        info!("analysis run {} for {username} complete", reporter.run_id);
        Ok(analysis)
    }
}
