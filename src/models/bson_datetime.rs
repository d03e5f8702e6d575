//! Stores `chrono` timestamps as native BSON dates so range queries and TTL
//! indexes work on them.

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    BsonDateTime::from_millis(date.timestamp_millis()).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = BsonDateTime::deserialize(deserializer)?.timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        D::Error::custom(format!("BSON date {millis} is outside chrono's range"))
    })
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{self, doc};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
    }

    #[test]
    fn reads_bson_date() {
        let stamped: Stamped =
            bson::from_document(doc! { "at": BsonDateTime::from_millis(1_700_000_000_000) })
                .unwrap();
        assert_eq!(stamped.at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn out_of_range_date_is_an_error() {
        let result = bson::from_document::<Stamped>(doc! { "at": BsonDateTime::MAX });
        assert!(result.is_err());
    }
}
