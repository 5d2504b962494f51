//! Experience-level bucketing from repository count and total stars, with a
//! confidence score from breadth and depth signals.

use crate::analyzer::models::{DeveloperClassification, DeveloperLevel, RepositoryCategory};

/// Fixed thresholds: a developer stays in the lowest band where either signal
/// still falls short.
pub fn classify_level(repo_count: usize, total_stars: u32) -> DeveloperLevel {
    if repo_count < 5 || total_stars < 10 {
        DeveloperLevel::Junior
    } else if repo_count < 15 || total_stars < 50 {
        DeveloperLevel::Mid
    } else if repo_count < 30 || total_stars < 200 {
        DeveloperLevel::Senior
    } else {
        DeveloperLevel::Expert
    }
}

/// Confidence: repo breadth (≤30) + star depth (≤30) + average language
/// complexity (≤25) + category spread (≤15), capped at 100.
pub fn confidence(
    repo_count: usize,
    total_stars: u32,
    avg_language_complexity: f64,
    category_count: usize,
) -> f64 {
    let repo_term = (repo_count as f64).min(30.0);
    let star_term = (total_stars as f64 * 0.1).min(30.0);
    let complexity_term = (avg_language_complexity * 0.25).min(25.0);
    let category_term = (category_count as f64 * 5.0).min(15.0);
    (repo_term + star_term + complexity_term + category_term).clamp(0.0, 100.0)
}

pub fn classify(
    repo_count: usize,
    total_stars: u32,
    avg_language_complexity: f64,
    categories: &[RepositoryCategory],
) -> DeveloperClassification {
    let real_categories = categories.iter().filter(|c| c.name != "Other");
    DeveloperClassification {
        level: classify_level(repo_count, total_stars),
        confidence: confidence(
            repo_count,
            total_stars,
            avg_language_complexity,
            real_categories.clone().count(),
        ),
        specialties: real_categories.take(3).map(|c| c.name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(classify_level(2, 100), DeveloperLevel::Junior);
        assert_eq!(classify_level(20, 5), DeveloperLevel::Junior);
        assert_eq!(classify_level(10, 40), DeveloperLevel::Mid);
        assert_eq!(classify_level(6, 60), DeveloperLevel::Mid);
        assert_eq!(classify_level(20, 150), DeveloperLevel::Senior);
        assert_eq!(classify_level(50, 1000), DeveloperLevel::Expert);
    }

    #[test]
    fn test_confidence_capped_at_100() {
        assert_eq!(confidence(500, 10_000, 100.0, 10), 100.0);
    }

    #[test]
    fn test_confidence_low_for_sparse_profile() {
        let c = confidence(1, 0, 50.0, 0);
        assert!(c < 25.0, "{c}");
    }

    #[test]
    fn test_specialties_exclude_other() {
        let categories = vec![
            RepositoryCategory {
                name: "Systems Programming".to_string(),
                count: 5,
                percentage: 50.0,
                repositories: vec![],
            },
            RepositoryCategory {
                name: "Other".to_string(),
                count: 5,
                percentage: 50.0,
                repositories: vec![],
            },
        ];
        let classification = classify(10, 100, 80.0, &categories);
        assert_eq!(classification.specialties, vec!["Systems Programming"]);
    }
}
