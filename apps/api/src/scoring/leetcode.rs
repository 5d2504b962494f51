//! LeetCode-side category scores: problem solving, contest standing,
//! submission consistency, and difficulty mix, blended with fixed weights.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::platforms::leetcode::{ContestData, LeetCodeProfile, Submission};
use crate::scoring::models::{LeetCodeScore, LeetCodeScoreDetails};

const PROBLEM_SOLVING_WEIGHT: f64 = 0.35;
const CONTEST_WEIGHT: f64 = 0.25;
const CONSISTENCY_WEIGHT: f64 = 0.20;
const DIFFICULTY_WEIGHT: f64 = 0.20;

/// Rating floor below which contest rating contributes nothing.
const BASE_RATING: f64 = 1200.0;

pub fn score(
    profile: &LeetCodeProfile,
    contest: &ContestData,
    submissions: &[Submission],
) -> LeetCodeScore {
    let problem_solving = problem_solving_score(profile);
    let contest_score = contest_score(contest);
    let consistency = consistency_score(submissions, Utc::now());
    let difficulty = difficulty_score(profile);

    let overall = (problem_solving * PROBLEM_SOLVING_WEIGHT
        + contest_score * CONTEST_WEIGHT
        + consistency * CONSISTENCY_WEIGHT
        + difficulty * DIFFICULTY_WEIGHT)
        .round() as u32;

    LeetCodeScore {
        overall: overall.min(100),
        problem_solving,
        contest: contest_score,
        consistency,
        difficulty,
        details: LeetCodeScoreDetails {
            total_solved: profile.total_solved,
            hard_solved: profile.hard_solved,
            contest_rating: contest.rating,
            contests_attended: contest.attended,
            recent_submissions: submissions.len(),
        },
    }
}

/// Solved volume (≤70) + solve rate against the full problem set (≤30).
fn problem_solving_score(profile: &LeetCodeProfile) -> f64 {
    let volume = (profile.total_solved as f64 * 0.5).min(70.0);
    let rate = if profile.total_questions > 0 {
        (profile.total_solved as f64 / profile.total_questions as f64 * 100.0 * 0.3).min(30.0)
    } else {
        0.0
    };
    (volume + rate).clamp(0.0, 100.0)
}

/// Rating above the floor (≤60) + attendance (≤25) + percentile bonus (≤15).
/// A user who never attended scores zero across the board.
fn contest_score(contest: &ContestData) -> f64 {
    if contest.attended == 0 {
        return 0.0;
    }
    let rating_term = ((contest.rating - BASE_RATING) / 8.0).clamp(0.0, 60.0);
    let attendance_term = (contest.attended as f64 * 2.0).min(25.0);
    let percentile_term = ((50.0 - contest.top_percentage).max(0.0) * 0.3).min(15.0);
    (rating_term + attendance_term + percentile_term).clamp(0.0, 100.0)
}

/// Recency (≤40, full credit for activity within the last week) + volume
/// (≤30) + distinct active days over the recent window (≤30).
fn consistency_score(submissions: &[Submission], now: DateTime<Utc>) -> f64 {
    if submissions.is_empty() {
        return 0.0;
    }
    let newest = submissions.iter().map(|s| s.timestamp).max().unwrap_or(0);
    let days_since = ((now.timestamp() - newest).max(0) / 86_400) as f64;
    let recency_term = (40.0 - days_since * 2.0).max(0.0);

    let volume_term = (submissions.len() as f64 * 0.5).min(30.0);

    let distinct_days: HashSet<i64> = submissions.iter().map(|s| s.timestamp / 86_400).collect();
    let spread_term = (distinct_days.len() as f64 * 1.5).min(30.0);

    (recency_term + volume_term + spread_term).clamp(0.0, 100.0)
}

/// Medium problems (≤40) + hard problems (≤45) + bonus for a meaningful hard
/// share (≤15). Easy-only grinding deliberately earns little here.
fn difficulty_score(profile: &LeetCodeProfile) -> f64 {
    let medium_term = (profile.medium_solved as f64 * 0.4).min(40.0);
    let hard_term = (profile.hard_solved as f64).min(45.0);
    let hard_bonus = if profile.total_solved > 0 {
        let hard_share = profile.hard_solved as f64 / profile.total_solved as f64;
        (hard_share * 100.0 * 0.5).min(15.0)
    } else {
        0.0
    };
    (medium_term + hard_term + hard_bonus).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(easy: u32, medium: u32, hard: u32) -> LeetCodeProfile {
        LeetCodeProfile {
            username: "solver".to_string(),
            real_name: None,
            avatar_url: None,
            country: None,
            ranking: 10_000,
            reputation: 0,
            total_solved: easy + medium + hard,
            easy_solved: easy,
            medium_solved: medium,
            hard_solved: hard,
            total_questions: 3000,
        }
    }

    fn submission(days_ago: i64) -> Submission {
        Submission {
            title: "Two Sum".to_string(),
            title_slug: "two-sum".to_string(),
            status: "Accepted".to_string(),
            lang: "rust".to_string(),
            timestamp: (Utc::now() - chrono::Duration::days(days_ago)).timestamp(),
        }
    }

    #[test]
    fn test_overall_bounded_0_100() {
        let contest = ContestData {
            rating: 2800.0,
            attended: 50,
            global_ranking: 100,
            top_percentage: 0.5,
            badge: None,
            history: vec![],
        };
        let subs: Vec<Submission> = (0..100).map(|i| submission(i % 7)).collect();
        let s = score(&profile(500, 400, 200), &contest, &subs);
        assert!(s.overall <= 100);
        assert!(s.difficulty <= 100.0);
    }

    #[test]
    fn test_never_attended_contest_scores_zero() {
        assert_eq!(contest_score(&ContestData::default()), 0.0);
    }

    #[test]
    fn test_rating_below_floor_earns_no_rating_term() {
        let weak = ContestData {
            rating: 1100.0,
            attended: 3,
            ..Default::default()
        };
        let at_floor = ContestData {
            rating: 1200.0,
            attended: 3,
            ..Default::default()
        };
        assert_eq!(contest_score(&weak), contest_score(&at_floor));
    }

    #[test]
    fn test_hard_problems_outweigh_easy() {
        let hard_heavy = profile(10, 20, 50);
        let easy_heavy = profile(80, 0, 0);
        assert!(difficulty_score(&hard_heavy) > difficulty_score(&easy_heavy));
    }

    #[test]
    fn test_no_submissions_means_zero_consistency() {
        assert_eq!(consistency_score(&[], Utc::now()), 0.0);
    }

    #[test]
    fn test_recent_streak_beats_stale_burst() {
        let now = Utc::now();
        let recent: Vec<Submission> = (0..10).map(submission).collect();
        let stale: Vec<Submission> = (60..70).map(submission).collect();
        assert!(consistency_score(&recent, now) > consistency_score(&stale, now));
    }

    #[test]
    fn test_zero_question_pool_does_not_divide_by_zero() {
        let mut p = profile(10, 5, 1);
        p.total_questions = 0;
        assert!(problem_solving_score(&p) > 0.0);
    }
}
