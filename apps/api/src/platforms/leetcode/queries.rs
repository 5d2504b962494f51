//! GraphQL query documents sent to the LeetCode proxy. All requests share one
//! `{ query, variables }` envelope; only the document and variables differ.

pub const USER_PROFILE: &str = r#"
query userProfile($username: String!) {
  matchedUser(username: $username) {
    username
    profile {
      realName
      userAvatar
      ranking
      countryName
      reputation
    }
    submitStatsGlobal {
      acSubmissionNum {
        difficulty
        count
      }
    }
  }
  allQuestionsCount {
    difficulty
    count
  }
}
"#;

pub const CONTEST_DATA: &str = r#"
query userContestInfo($username: String!) {
  userContestRanking(username: $username) {
    attendedContestsCount
    rating
    globalRanking
    topPercentage
    badge {
      name
    }
  }
  userContestRankingHistory(username: $username) {
    attended
    rating
    ranking
    problemsSolved
    totalProblems
    contest {
      title
      startTime
    }
  }
}
"#;

pub const RECENT_SUBMISSIONS: &str = r#"
query recentSubmissions($username: String!, $limit: Int!) {
  recentSubmissionList(username: $username, limit: $limit) {
    title
    titleSlug
    statusDisplay
    lang
    timestamp
  }
}
"#;

pub const PROBLEM_STATS: &str = r#"
query problemStats($username: String!) {
  matchedUser(username: $username) {
    tagProblemCounts {
      fundamental {
        tagName
        problemsSolved
      }
      intermediate {
        tagName
        problemsSolved
      }
      advanced {
        tagName
        problemsSolved
      }
    }
  }
}
"#;
