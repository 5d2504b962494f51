use serde::{Deserialize, Serialize};

/// Weights folding the two platform scores into the overall score.
pub const GITHUB_WEIGHT: f64 = 0.60;
pub const LEETCODE_WEIGHT: f64 = 0.40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubScoreDetails {
    pub public_repos: u32,
    pub active_repos: usize,
    pub total_stars: u32,
    pub followers: u32,
    pub languages_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubScore {
    pub overall: u32,
    pub repository: f64,
    pub language: f64,
    pub collaboration: f64,
    pub complexity: f64,
    pub activity: f64,
    pub details: GitHubScoreDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeScoreDetails {
    pub total_solved: u32,
    pub hard_solved: u32,
    pub contest_rating: f64,
    pub contests_attended: u32,
    pub recent_submissions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeScore {
    pub overall: u32,
    pub problem_solving: f64,
    pub contest: f64,
    pub consistency: f64,
    pub difficulty: f64,
    pub details: LeetCodeScoreDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDistribution {
    /// GitHub share of the combined signal, as a percentage.
    pub practical: f64,
    /// LeetCode share of the combined signal, as a percentage.
    pub algorithmic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// `max(0, 100 - |github - leetcode|)`.
    pub balance_score: u32,
    pub skill_distribution: SkillDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub area: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    Excellent,
    Good,
    Fair,
    Developing,
    Beginner,
}

impl std::fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessLevel::Excellent => write!(f, "Excellent"),
            ReadinessLevel::Good => write!(f, "Good"),
            ReadinessLevel::Fair => write!(f, "Fair"),
            ReadinessLevel::Developing => write!(f, "Developing"),
            ReadinessLevel::Beginner => write!(f, "Beginner"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewReadiness {
    pub overall: u32,
    pub algorithms: f64,
    pub system_design: f64,
    pub coding: f64,
    pub behavioral: f64,
    pub level: ReadinessLevel,
}

/// The unified score: every numeric field is bounded to [0,100] by
/// construction, and `overall` is the fixed 60/40 GitHub/LeetCode blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedScore {
    pub overall: u32,
    pub github: GitHubScore,
    pub leetcode: LeetCodeScore,
    pub breakdown: ScoreBreakdown,
    pub recommendations: Vec<Recommendation>,
    pub interview_readiness: InterviewReadiness,
}
