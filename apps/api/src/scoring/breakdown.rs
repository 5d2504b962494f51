//! Strength/weakness extraction, balance score, and the recommendation list.
//! All thresholds are fixed; the output is deterministic for a given pair of
//! platform scores.

use crate::scoring::models::{
    GitHubScore, LeetCodeScore, Priority, Recommendation, ScoreBreakdown, SkillDistribution,
};

const STRENGTH_THRESHOLD: f64 = 75.0;
const WEAKNESS_THRESHOLD: f64 = 40.0;

pub fn build(github: &GitHubScore, leetcode: &LeetCodeScore) -> ScoreBreakdown {
    let categories: [(&str, f64); 9] = [
        ("Project portfolio", github.repository),
        ("Language breadth", github.language),
        ("Open-source collaboration", github.collaboration),
        ("Project complexity", github.complexity),
        ("Contribution activity", github.activity),
        ("Problem solving", leetcode.problem_solving),
        ("Competitive programming", leetcode.contest),
        ("Practice consistency", leetcode.consistency),
        ("Hard problem coverage", leetcode.difficulty),
    ];

    let strengths = categories
        .iter()
        .filter(|(_, v)| *v > STRENGTH_THRESHOLD)
        .map(|(name, _)| name.to_string())
        .collect();
    let weaknesses = categories
        .iter()
        .filter(|(_, v)| *v < WEAKNESS_THRESHOLD)
        .map(|(name, _)| name.to_string())
        .collect();

    let gap = (github.overall as i64 - leetcode.overall as i64).unsigned_abs();
    let balance_score = 100u32.saturating_sub(gap.min(100) as u32);

    ScoreBreakdown {
        strengths,
        weaknesses,
        balance_score,
        skill_distribution: skill_distribution(github.overall, leetcode.overall),
    }
}

/// Normalized shares of the combined signal. Two zero scores split evenly.
fn skill_distribution(github: u32, leetcode: u32) -> SkillDistribution {
    let total = github + leetcode;
    if total == 0 {
        return SkillDistribution {
            practical: 50.0,
            algorithmic: 50.0,
        };
    }
    let practical = (github as f64 / total as f64 * 1000.0).round() / 10.0;
    SkillDistribution {
        practical,
        algorithmic: ((100.0 - practical) * 10.0).round() / 10.0,
    }
}

/// Recommendations for every category below its threshold, ordered by
/// priority. An all-around strong profile gets an empty list.
pub fn recommendations(github: &GitHubScore, leetcode: &LeetCodeScore) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if github.repository < 60.0 {
        out.push(rec(
            Priority::High,
            "Project portfolio",
            "Create and maintain more original repositories with clear documentation",
        ));
    }
    if leetcode.problem_solving < 60.0 {
        out.push(rec(
            Priority::High,
            "Problem solving",
            "Solve more problems, focusing on medium difficulty to build range",
        ));
    }
    if github.language < 50.0 {
        out.push(rec(
            Priority::Medium,
            "Language breadth",
            "Ship projects in a second or third language to broaden your toolkit",
        ));
    }
    if github.collaboration < 50.0 {
        out.push(rec(
            Priority::Medium,
            "Open-source collaboration",
            "Contribute to established open-source projects to grow stars and forks",
        ));
    }
    if leetcode.contest < 40.0 {
        out.push(rec(
            Priority::Medium,
            "Competitive programming",
            "Attend weekly contests regularly to build a rating under time pressure",
        ));
    }
    if leetcode.consistency < 50.0 {
        out.push(rec(
            Priority::Low,
            "Practice consistency",
            "Keep a daily practice habit; several short sessions beat one long burst",
        ));
    }

    out.sort_by_key(|r| r.priority);
    out
}

fn rec(priority: Priority, area: &str, suggestion: &str) -> Recommendation {
    Recommendation {
        priority,
        area: area.to_string(),
        suggestion: suggestion.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::models::{GitHubScoreDetails, LeetCodeScoreDetails};

    fn gh(overall: u32, all: f64) -> GitHubScore {
        GitHubScore {
            overall,
            repository: all,
            language: all,
            collaboration: all,
            complexity: all,
            activity: all,
            details: GitHubScoreDetails {
                public_repos: 0,
                active_repos: 0,
                total_stars: 0,
                followers: 0,
                languages_used: 0,
            },
        }
    }

    fn lc(overall: u32, all: f64) -> LeetCodeScore {
        LeetCodeScore {
            overall,
            problem_solving: all,
            contest: all,
            consistency: all,
            difficulty: all,
            details: LeetCodeScoreDetails {
                total_solved: 0,
                hard_solved: 0,
                contest_rating: 0.0,
                contests_attended: 0,
                recent_submissions: 0,
            },
        }
    }

    #[test]
    fn test_balance_score_penalizes_lopsided_profiles() {
        let even = build(&gh(70, 70.0), &lc(70, 70.0));
        let lopsided = build(&gh(90, 90.0), &lc(20, 20.0));
        assert_eq!(even.balance_score, 100);
        assert_eq!(lopsided.balance_score, 30);
    }

    #[test]
    fn test_strengths_and_weaknesses_thresholds() {
        let breakdown = build(&gh(80, 80.0), &lc(30, 30.0));
        assert!(breakdown
            .strengths
            .contains(&"Project portfolio".to_string()));
        assert!(breakdown.weaknesses.contains(&"Problem solving".to_string()));
        assert!(!breakdown.strengths.contains(&"Problem solving".to_string()));
    }

    #[test]
    fn test_skill_distribution_sums_to_100() {
        let d = skill_distribution(73, 41);
        assert!((d.practical + d.algorithmic - 100.0).abs() < 1e-9);
        assert!(d.practical > d.algorithmic);
    }

    #[test]
    fn test_two_zero_scores_split_evenly() {
        let d = skill_distribution(0, 0);
        assert_eq!(d.practical, 50.0);
        assert_eq!(d.algorithmic, 50.0);
    }

    #[test]
    fn test_strong_profile_gets_no_recommendations() {
        assert!(recommendations(&gh(90, 90.0), &lc(90, 90.0)).is_empty());
    }

    #[test]
    fn test_recommendations_sorted_high_first() {
        let recs = recommendations(&gh(20, 20.0), &lc(20, 20.0));
        assert!(!recs.is_empty());
        for pair in recs.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
        assert_eq!(recs[0].priority, Priority::High);
    }
}
