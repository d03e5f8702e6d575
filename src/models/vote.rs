use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bson_datetime;

pub const VOTE_ID_LENGTH: usize = 16;

/// One ballot in the `votes` collection. Tallies recomputed from these are
/// independent of the counters embedded in the poll document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: String,
    /// References `_id` in the polls collection
    pub poll_id: String,
    pub option_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(with = "bson_datetime")]
    pub cast_at: DateTime<Utc>,
}
