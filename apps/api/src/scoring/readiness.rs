//! Interview readiness: four axes projected from the platform category
//! scores, blended into an overall figure with a coarse readiness band.

use crate::scoring::models::{GitHubScore, InterviewReadiness, LeetCodeScore, ReadinessLevel};

pub fn assess(github: &GitHubScore, leetcode: &LeetCodeScore) -> InterviewReadiness {
    let algorithms = leetcode.problem_solving * 0.6 + leetcode.difficulty * 0.4;
    let system_design = github.complexity * 0.6 + github.repository * 0.4;
    let coding =
        github.language * 0.4 + leetcode.problem_solving * 0.3 + github.repository * 0.3;
    let behavioral = github.collaboration * 0.7 + github.activity * 0.3;

    let overall = (algorithms * 0.35 + coding * 0.25 + system_design * 0.25 + behavioral * 0.15)
        .round() as u32;
    let overall = overall.min(100);

    InterviewReadiness {
        overall,
        algorithms,
        system_design,
        coding,
        behavioral,
        level: level_for(overall),
    }
}

fn level_for(overall: u32) -> ReadinessLevel {
    match overall {
        85.. => ReadinessLevel::Excellent,
        70..=84 => ReadinessLevel::Good,
        60..=69 => ReadinessLevel::Fair,
        50..=59 => ReadinessLevel::Developing,
        _ => ReadinessLevel::Beginner,
    }
}
