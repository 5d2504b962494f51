//! Language proficiency and display metadata. Proficiency is derived from
//! usage share, weighted code volume, and a fixed per-language complexity
//! weight — it is not upstream data.

use crate::analyzer::models::LanguageProfile;
use crate::platforms::github::LanguageStat;

const DEFAULT_COLOR: &str = "#8b8b8b";
const DEFAULT_COMPLEXITY: f64 = 50.0;

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("Rust", "#dea584"),
    ("C", "#555555"),
    ("C++", "#f34b7d"),
    ("C#", "#178600"),
    ("Go", "#00add8"),
    ("Java", "#b07219"),
    ("Kotlin", "#a97bff"),
    ("Swift", "#f05138"),
    ("Python", "#3572a5"),
    ("JavaScript", "#f1e05a"),
    ("TypeScript", "#3178c6"),
    ("Ruby", "#701516"),
    ("PHP", "#4f5d95"),
    ("HTML", "#e34c26"),
    ("CSS", "#563d7c"),
    ("Shell", "#89e051"),
    ("Haskell", "#5e5086"),
    ("Scala", "#c22d40"),
    ("Dart", "#00b4ab"),
    ("Solidity", "#aa6746"),
];

/// Fixed complexity weights (0–100). Higher means the language's typical use
/// signals more systems depth.
const LANGUAGE_COMPLEXITY: &[(&str, f64)] = &[
    ("Assembly", 100.0),
    ("C", 95.0),
    ("C++", 95.0),
    ("Rust", 90.0),
    ("Haskell", 90.0),
    ("Zig", 88.0),
    ("Scala", 80.0),
    ("Go", 75.0),
    ("Java", 70.0),
    ("Kotlin", 70.0),
    ("Swift", 70.0),
    ("C#", 70.0),
    ("Python", 65.0),
    ("TypeScript", 65.0),
    ("Solidity", 65.0),
    ("JavaScript", 55.0),
    ("Ruby", 55.0),
    ("PHP", 50.0),
    ("Dart", 55.0),
    ("Shell", 45.0),
    ("HTML", 20.0),
    ("CSS", 25.0),
];

pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn language_complexity(language: &str) -> f64 {
    LANGUAGE_COMPLEXITY
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_COMPLEXITY)
}

/// Proficiency: usage share (≤40) + weighted volume (≤30) + complexity bonus
/// (≤30); each term capped before summation so the result stays in [0,100].
fn proficiency(stat: &LanguageStat) -> f64 {
    let usage = (stat.percentage * 0.4).min(40.0);
    let volume = (((stat.weighted_bytes + 1) as f64).log10() * 5.0).clamp(0.0, 30.0);
    let complexity = language_complexity(&stat.language) * 0.3;
    (usage + volume + complexity).clamp(0.0, 100.0)
}

pub fn build_profiles(stats: &[LanguageStat]) -> Vec<LanguageProfile> {
    stats
        .iter()
        .map(|stat| LanguageProfile {
            language: stat.language.clone(),
            percentage: stat.percentage,
            color: language_color(&stat.language).to_string(),
            proficiency: (proficiency(stat) * 10.0).round() / 10.0,
        })
        .collect()
}

/// Mean complexity weight across a set of language names; the default weight
/// when the set is empty.
pub fn average_complexity(languages: impl Iterator<Item = impl AsRef<str>>) -> f64 {
    let weights: Vec<f64> = languages
        .map(|l| language_complexity(l.as_ref()))
        .collect();
    if weights.is_empty() {
        return DEFAULT_COMPLEXITY;
    }
    weights.iter().sum::<f64>() / weights.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(language: &str, weighted_bytes: u64, percentage: f64) -> LanguageStat {
        LanguageStat {
            language: language.to_string(),
            weighted_bytes,
            percentage,
        }
    }

    #[test]
    fn test_known_language_gets_its_color() {
        assert_eq!(language_color("Rust"), "#dea584");
        assert_eq!(language_color("rust"), "#dea584");
    }

    #[test]
    fn test_unknown_language_gets_default_color_and_weight() {
        assert_eq!(language_color("Brainfuck"), DEFAULT_COLOR);
        assert_eq!(language_complexity("Brainfuck"), DEFAULT_COMPLEXITY);
    }

    #[test]
    fn test_proficiency_bounded_0_100() {
        let heavy = stat("Rust", u64::MAX / 2, 100.0);
        let p = proficiency(&heavy);
        assert!((0.0..=100.0).contains(&p), "{p}");

        let tiny = stat("HTML", 0, 0.0);
        let p = proficiency(&tiny);
        assert!((0.0..=100.0).contains(&p), "{p}");
    }

    #[test]
    fn test_complex_language_outranks_simple_at_equal_usage() {
        let rust = proficiency(&stat("Rust", 100_000, 50.0));
        let html = proficiency(&stat("HTML", 100_000, 50.0));
        assert!(rust > html);
    }

    #[test]
    fn test_build_profiles_preserves_order_and_percentage() {
        let stats = vec![stat("Rust", 70_000, 70.0), stat("Python", 30_000, 30.0)];
        let profiles = build_profiles(&stats);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].language, "Rust");
        assert_eq!(profiles[0].percentage, 70.0);
        assert!(!profiles[0].color.is_empty());
    }
}
