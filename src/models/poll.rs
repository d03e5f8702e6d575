use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bson_datetime;

pub const POLL_ID_LENGTH: usize = 5;
pub const ADMIN_TOKEN_LENGTH: usize = 8;

/// A poll document as stored in the `polls` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: String,
    /// Display order. An option's key is its 1-based position.
    pub options: Vec<PollOption>,
    /// References the identity provider's user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub admin_token: String,
    #[serde(with = "bson_datetime")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub allow_multiple_votes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub votes: i64,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            votes: 0,
        }
    }
}

impl Poll {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Maps an option key ("1", "2", ...) to its index in `options`.
    ///
    /// Only the canonical rendering of a position is accepted, so "01" and
    /// "+1" are not aliases of "1".
    pub fn option_index(&self, key: &str) -> Option<usize> {
        let position: usize = key.parse().ok()?;
        if position == 0 || position > self.options.len() || position.to_string() != key {
            return None;
        }
        Some(position - 1)
    }

    /// Option keys paired with their options, in display order.
    pub fn keyed_options(&self) -> impl Iterator<Item = (String, &PollOption)> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, option)| (option_key(index), option))
    }
}

pub fn option_key(index: usize) -> String {
    (index + 1).to_string()
}

/// Fresh options with every counter at zero.
pub fn build_options<I, S>(texts: I) -> Vec<PollOption>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts.into_iter().map(PollOption::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_poll() -> Poll {
        let now = Utc::now();
        Poll {
            id: "abcde".into(),
            description: "Pizza?".into(),
            options: build_options(["Yes", "No"]),
            created_by: None,
            admin_token: "AdminTok".into(),
            expires_at: now + Duration::hours(1),
            created_at: now,
            color: None,
            allow_multiple_votes: false,
        }
    }

    #[test]
    fn option_index_accepts_only_canonical_positions() {
        let poll = sample_poll();
        assert_eq!(poll.option_index("1"), Some(0));
        assert_eq!(poll.option_index("2"), Some(1));
        assert_eq!(poll.option_index("0"), None);
        assert_eq!(poll.option_index("3"), None);
        assert_eq!(poll.option_index("01"), None);
        assert_eq!(poll.option_index("+1"), None);
        assert_eq!(poll.option_index("yes"), None);
    }

    #[test]
    fn keyed_options_are_contiguous_from_one() {
        let poll = sample_poll();
        let keys: Vec<String> = poll.keyed_options().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["1", "2"]);
        assert!(poll.options.iter().all(|option| option.votes == 0));
    }

    #[test]
    fn expiry_is_inclusive_of_deadline() {
        let poll = sample_poll();
        assert!(!poll.is_expired(poll.created_at));
        assert!(poll.is_expired(poll.expires_at));
    }
}
