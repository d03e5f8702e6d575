use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::models::poll::Poll;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16() as i32,
            message: message.into(),
            data,
            timestamp: Utc::now(),
            error: None,
        }
    }
}

/// Renders `(key, value)` pairs as a JSON object in the pairs' order, so
/// option "10" stays after option "9".
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<V>(pub Vec<(String, V)>);

impl<V: Serialize> Serialize for KeyedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPollData {
    pub poll_id: String,
    pub admin_id: String,
}

#[derive(Debug, Serialize)]
pub struct PollInfoData {
    pub poll: PollResponseDTO,
}

#[derive(Debug, Serialize)]
pub struct UserPollsData {
    pub polls: Vec<PollResponseDTO>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponseDTO {
    pub id: String,
    pub description: String,
    pub options: KeyedMap<PollOptionResponseDTO>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    /// Vote-log tallies, present only in the admin view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<KeyedMap<u64>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub allow_multiple_votes: bool,
    pub is_expired: bool,
}

#[derive(Debug, Serialize)]
pub struct PollOptionResponseDTO {
    pub text: String,
    pub votes: i64,
}

impl PollResponseDTO {
    /// What anyone holding the share link may see. No admin token, no creator.
    pub fn public(poll: &Poll, now: DateTime<Utc>) -> Self {
        let options = poll
            .keyed_options()
            .map(|(key, option)| {
                (
                    key,
                    PollOptionResponseDTO {
                        text: option.text.clone(),
                        votes: option.votes,
                    },
                )
            })
            .collect();

        Self {
            id: poll.id.clone(),
            description: poll.description.clone(),
            options: KeyedMap(options),
            created_by: None,
            admin_id: None,
            results: None,
            expires_at: poll.expires_at,
            created_at: poll.created_at,
            color: poll.color.clone(),
            allow_multiple_votes: poll.allow_multiple_votes,
            is_expired: poll.is_expired(now),
        }
    }

    /// The view for whoever proved ownership, by admin token or as creator.
    pub fn owner(poll: &Poll, now: DateTime<Utc>) -> Self {
        Self {
            created_by: poll.created_by.clone(),
            admin_id: Some(poll.admin_token.clone()),
            ..Self::public(poll, now)
        }
    }

    /// Attaches vote-log tallies for every option, zero-filled.
    pub fn with_results(mut self, poll: &Poll, counts: &HashMap<String, u64>) -> Self {
        let results = poll
            .keyed_options()
            .map(|(key, _)| {
                let count = counts.get(&key).copied().unwrap_or(0);
                (key, count)
            })
            .collect();
        self.results = Some(KeyedMap(results));
        self
    }
}
