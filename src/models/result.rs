// src/models/result.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::lenient::{
    lenient_answers, lenient_bool, lenient_question, lenient_text, lenient_timestamp,
};

/// A flashcard question as it was shown when the test was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub answer: String,
}

/// One answered question inside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Snapshot of the question. Older or hand-edited records may lack it.
    #[serde(
        default,
        deserialize_with = "lenient_question",
        skip_serializing_if = "Option::is_none"
    )]
    pub question: Option<Question>,

    /// Read with JavaScript truthiness: missing, `null`, `0` and `""` are incorrect.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub correct: bool,
}

impl Answer {
    pub fn new(correct: bool) -> Self {
        Self {
            question: None,
            correct,
        }
    }
}

/// A single completed test, as persisted in the results store.
///
/// Field names follow the on-disk JSON layout (`testTitle`, `takenAt`).
/// Fields that are missing, `null` or of the wrong type fall back to an
/// empty value instead of failing the record. Only an entry that is not a
/// JSON object at all is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: String,

    /// Grouping key for rankings. Not unique across users.
    #[serde(default, deserialize_with = "lenient_text")]
    pub test_title: String,

    /// ISO-8601 timestamp, kept verbatim and parsed lazily by the analytics engine.
    /// Epoch milliseconds are converted to RFC 3339 on read.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub taken_at: String,

    #[serde(default, deserialize_with = "lenient_answers")]
    pub answers: Vec<Answer>,
}

impl ResultRecord {
    pub fn new(
        username: impl Into<String>,
        test_title: impl Into<String>,
        taken_at: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Self {
        Self {
            username: username.into(),
            test_title: test_title.into(),
            taken_at: taken_at.into(),
            answers,
        }
    }
}

/// DTO for saving a finished test.
///
/// All fields are optional at the serde level so that a missing field
/// produces the same 400 as an empty one.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultRequest {
    #[validate(length(max = 50, message = "Username must be at most 50 characters."))]
    pub username: Option<String>,

    #[validate(length(max = 200, message = "Test title must be at most 200 characters."))]
    pub test_title: Option<String>,

    #[validate(length(max = 64, message = "takenAt must be at most 64 characters."))]
    pub taken_at: Option<String>,

    #[validate(custom(function = validate_answers))]
    pub answers: Option<Vec<Answer>>,
}

impl SaveResultRequest {
    /// Converts the request into a record, or `None` when a required
    /// field is absent or empty.
    pub fn into_record(self) -> Option<ResultRecord> {
        let username = self.username.filter(|s| !s.is_empty())?;
        let test_title = self.test_title.filter(|s| !s.is_empty())?;
        let taken_at = self.taken_at.filter(|s| !s.is_empty())?;
        let answers = self.answers?;

        Some(ResultRecord::new(username, test_title, taken_at, answers))
    }
}

fn validate_answers(answers: &[Answer]) -> Result<(), validator::ValidationError> {
    if answers.len() > 1000 {
        return Err(validator::ValidationError::new("too_many_answers"));
    }
    if answers.iter().any(|a| a.question.is_none()) {
        return Err(validator::ValidationError::new("answer_missing_question"));
    }
    Ok(())
}

mod lenient {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Answer, Question};

    fn truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(truthy(&Value::deserialize(deserializer)?))
    }

    pub fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn lenient_timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            _ => String::new(),
        })
    }

    pub fn lenient_question<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Question>, D::Error> {
        Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
    }

    /// Anything but an array reads as no answers; non-object entries count as incorrect.
    pub fn lenient_answers<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Answer>, D::Error> {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };

        Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_else(|_| Answer::new(false)))
            .collect())
    }
}

/// DTO for listing one user's results.
#[derive(Debug, Deserialize)]
pub struct UserResultsRequest {
    pub username: Option<String>,
}
