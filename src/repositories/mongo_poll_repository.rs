use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use tracing::{info, warn};

use super::poll_repository::PollChanges;
use crate::{
    error::StoreError,
    models::{poll::Poll, vote::Vote},
};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoPollRepository {
    client: Client,
    polls: Collection<Poll>,
    votes: Collection<Vote>,
}

impl MongoPollRepository {
    pub fn new(client: Client, db: &Database) -> Self {
        let polls = db.collection::<Poll>("polls");
        let votes = db.collection::<Vote>("votes");
        Self {
            client,
            polls,
            votes,
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.polls
            .create_index(IndexModel::builder().keys(doc! { "createdBy": 1 }).build())
            .await?;
        self.votes
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "pollId": 1, "optionKey": 1 })
                    .options(IndexOptions::builder().name("poll_option".to_string()).build())
                    .build(),
            )
            .await?;
        info!("Poll store indexes ensured");
        Ok(())
    }

    pub async fn exists(&self, poll_id: &str) -> Result<bool, StoreError> {
        let count = self
            .polls
            .count_documents(doc! { "_id": poll_id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert(&self, poll: &Poll) -> Result<(), StoreError> {
        match self.polls.insert_one(poll).await {
            Ok(result) => {
                info!("Poll saved with ID: {}", result.inserted_id);
                Ok(())
            }
            Err(e) if is_duplicate_key(&e) => {
                warn!("Poll id {} collided on insert", poll.id);
                Err(StoreError::DuplicateId(poll.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        Ok(self.polls.find_one(doc! { "_id": poll_id }).await?)
    }

    pub async fn find_by_creator(&self, creator_id: &str) -> Result<Vec<Poll>, StoreError> {
        let cursor = self
            .polls
            .find(doc! { "createdBy": creator_id })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn apply_changes(
        &self,
        poll_id: &str,
        admin_token: &str,
        changes: &PollChanges,
    ) -> Result<bool, StoreError> {
        let mut set = Document::new();
        if let Some(description) = &changes.description {
            set.insert("description", description.as_str());
        }
        if let Some(options) = &changes.options {
            set.insert("options", to_bson(options)?);
        }
        if let Some(expires_at) = changes.expires_at {
            set.insert(
                "expiresAt",
                BsonDateTime::from_millis(expires_at.timestamp_millis()),
            );
        }

        let result = self
            .polls
            .update_one(
                doc! { "_id": poll_id, "adminToken": admin_token },
                doc! { "$set": set },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete(&self, poll_id: &str, admin_token: &str) -> Result<bool, StoreError> {
        let result = self
            .polls
            .delete_one(doc! { "_id": poll_id, "adminToken": admin_token })
            .await?;
        Ok(result.deleted_count > 0)
    }

    /// Single-document `$inc`, so concurrent voters never lose an update.
    pub async fn increment_vote(
        &self,
        poll_id: &str,
        option_index: usize,
    ) -> Result<bool, StoreError> {
        let option_path = format!("options.{option_index}");
        let votes_path = format!("options.{option_index}.votes");
        let result = self
            .polls
            .update_one(
                doc! { "_id": poll_id, option_path: { "$exists": true } },
                doc! { "$inc": { votes_path: 1_i64 } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.votes.insert_one(vote).await?;
        Ok(())
    }

    pub async fn remove_vote(&self, vote_id: &str) -> Result<(), StoreError> {
        self.votes.delete_one(doc! { "_id": vote_id }).await?;
        Ok(())
    }

    pub async fn vote_counts(&self, poll_id: &str) -> Result<HashMap<String, u64>, StoreError> {
        let pipeline = vec![
            doc! { "$match": { "pollId": poll_id } },
            doc! { "$group": { "_id": "$optionKey", "count": { "$sum": 1 } } },
        ];
        let groups: Vec<Document> = self.votes.aggregate(pipeline).await?.try_collect().await?;

        let counts = groups
            .iter()
            .filter_map(|group| {
                let key = group.get_str("_id").ok()?;
                let count = match group.get("count")? {
                    Bson::Int32(n) => u64::try_from(*n).ok()?,
                    Bson::Int64(n) => u64::try_from(*n).ok()?,
                    _ => return None,
                };
                Some((key.to_string(), count))
            })
            .collect();
        Ok(counts)
    }

    pub async fn clear_votes(&self, poll_id: &str) -> Result<(), StoreError> {
        let result = self.votes.delete_many(doc! { "pollId": poll_id }).await?;
        info!(
            "Cleared {} vote records for poll {}",
            result.deleted_count, poll_id
        );
        Ok(())
    }

    pub async fn close(self) {
        self.client.shutdown().await;
        info!("MongoDB client shut down");
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        &*error.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}
