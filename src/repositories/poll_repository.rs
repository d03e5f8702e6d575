use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{
    memory_poll_repository::MemoryPollRepository, mongo_poll_repository::MongoPollRepository,
};
use crate::{
    error::StoreError,
    models::{
        poll::{Poll, PollOption},
        vote::Vote,
    },
};

/// Targeted field update applied to one poll. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct PollChanges {
    pub description: Option<String>,
    pub options: Option<Vec<PollOption>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Handle to the poll and vote collections, opened once at startup and
/// shared by every request.
#[derive(Clone)]
pub enum PollRepository {
    Mongo(MongoPollRepository),
    Memory(MemoryPollRepository),
}

impl PollRepository {
    pub async fn exists(&self, poll_id: &str) -> Result<bool, StoreError> {
        match self {
            Self::Mongo(repo) => repo.exists(poll_id).await,
            Self::Memory(repo) => repo.exists(poll_id).await,
        }
    }

    /// Fails with [`StoreError::DuplicateId`] when the id is already taken.
    pub async fn insert(&self, poll: &Poll) -> Result<(), StoreError> {
        match self {
            Self::Mongo(repo) => repo.insert(poll).await,
            Self::Memory(repo) => repo.insert(poll).await,
        }
    }

    pub async fn find_by_id(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        match self {
            Self::Mongo(repo) => repo.find_by_id(poll_id).await,
            Self::Memory(repo) => repo.find_by_id(poll_id).await,
        }
    }

    pub async fn find_by_creator(&self, creator_id: &str) -> Result<Vec<Poll>, StoreError> {
        match self {
            Self::Mongo(repo) => repo.find_by_creator(creator_id).await,
            Self::Memory(repo) => repo.find_by_creator(creator_id).await,
        }
    }

    /// Returns whether a poll with both `poll_id` and `admin_token` matched.
    pub async fn apply_changes(
        &self,
        poll_id: &str,
        admin_token: &str,
        changes: &PollChanges,
    ) -> Result<bool, StoreError> {
        match self {
            Self::Mongo(repo) => repo.apply_changes(poll_id, admin_token, changes).await,
            Self::Memory(repo) => repo.apply_changes(poll_id, admin_token, changes).await,
        }
    }

    pub async fn delete(&self, poll_id: &str, admin_token: &str) -> Result<bool, StoreError> {
        match self {
            Self::Mongo(repo) => repo.delete(poll_id, admin_token).await,
            Self::Memory(repo) => repo.delete(poll_id, admin_token).await,
        }
    }

    /// Adds one vote to the option at `option_index`. Returns false when the
    /// poll or option vanished before the write.
    pub async fn increment_vote(
        &self,
        poll_id: &str,
        option_index: usize,
    ) -> Result<bool, StoreError> {
        match self {
            Self::Mongo(repo) => repo.increment_vote(poll_id, option_index).await,
            Self::Memory(repo) => repo.increment_vote(poll_id, option_index).await,
        }
    }

    pub async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        match self {
            Self::Mongo(repo) => repo.record_vote(vote).await,
            Self::Memory(repo) => repo.record_vote(vote).await,
        }
    }

    /// Drops one vote-log record, used to undo a log write whose counter
    /// increment did not apply.
    pub async fn remove_vote(&self, vote_id: &str) -> Result<(), StoreError> {
        match self {
            Self::Mongo(repo) => repo.remove_vote(vote_id).await,
            Self::Memory(repo) => repo.remove_vote(vote_id).await,
        }
    }

    /// Vote-log tallies keyed by option key. Options nobody picked are absent.
    pub async fn vote_counts(&self, poll_id: &str) -> Result<HashMap<String, u64>, StoreError> {
        match self {
            Self::Mongo(repo) => repo.vote_counts(poll_id).await,
            Self::Memory(repo) => repo.vote_counts(poll_id).await,
        }
    }

    pub async fn clear_votes(&self, poll_id: &str) -> Result<(), StoreError> {
        match self {
            Self::Mongo(repo) => repo.clear_votes(poll_id).await,
            Self::Memory(repo) => repo.clear_votes(poll_id).await,
        }
    }

    pub async fn close(self) {
        match self {
            Self::Mongo(repo) => repo.close().await,
            Self::Memory(_) => {}
        }
    }
}
