// src/models/analytics.rs

use serde::{Deserialize, Serialize};

/// Total correct vs incorrect answers across all considered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectIncorrectSummary {
    pub correct: u64,
    pub incorrect: u64,
}

impl CorrectIncorrectSummary {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }
}

/// Per-test statistics used for the "most taken tests" chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRanking {
    /// The test title.
    pub name: String,
    /// How many results reference this title (not how many answers).
    pub taken: u64,
    pub correct: u64,
    pub incorrect: u64,
}

/// Number of results taken in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoint {
    /// `YYYY-MM`
    pub month: String,
    pub count: u64,
}

/// Response body of the analytics endpoint. All three views are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub correct_incorrect: CorrectIncorrectSummary,
    pub top_tests: Vec<TestRanking>,
    pub activity: Vec<ActivityPoint>,
}

/// DTO for requesting analytics, optionally scoped to one user.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsRequest {
    #[serde(default)]
    pub username: Option<String>,
}

impl AnalyticsRequest {
    /// An empty username means "everyone", same as an absent one.
    pub fn username_filter(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }
}
