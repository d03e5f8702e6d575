#[cfg(test)]
use std::collections::HashSet;
use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::poll_repository::PollChanges;
use crate::{
    error::StoreError,
    models::{poll::Poll, vote::Vote},
};

/// Store operations a test can force to misbehave.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `record_vote` returns an error without writing.
    RecordVote,
    /// `increment_vote` reports that no document matched.
    IncrementMisses,
    /// `clear_votes` returns an error without deleting.
    ClearVotes,
}

#[derive(Default)]
struct MemoryState {
    polls: HashMap<String, Poll>,
    votes: Vec<Vote>,
    #[cfg(test)]
    fail_points: HashSet<FailPoint>,
}

impl MemoryState {
    #[cfg(test)]
    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.fail_points.contains(&point) {
            return Err(StoreError::Unavailable(match point {
                FailPoint::RecordVote => "record_vote",
                FailPoint::IncrementMisses => "increment_vote",
                FailPoint::ClearVotes => "clear_votes",
            }));
        }
        Ok(())
    }
}

/// Process-local poll store for tests and local runs without MongoDB.
/// Every operation holds the lock for its whole read-modify-write, which
/// gives the same single-document atomicity the Mongo backend relies on.
#[derive(Clone, Default)]
pub struct MemoryPollRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryPollRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn exists(&self, poll_id: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.polls.contains_key(poll_id))
    }

    pub async fn insert(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.polls.contains_key(&poll.id) {
            return Err(StoreError::DuplicateId(poll.id.clone()));
        }
        state.polls.insert(poll.id.clone(), poll.clone());
        Ok(())
    }

    pub async fn find_by_id(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        Ok(self.state.read().await.polls.get(poll_id).cloned())
    }

    pub async fn find_by_creator(&self, creator_id: &str) -> Result<Vec<Poll>, StoreError> {
        let state = self.state.read().await;
        let mut polls: Vec<Poll> = state
            .polls
            .values()
            .filter(|poll| poll.created_by.as_deref() == Some(creator_id))
            .cloned()
            .collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    pub async fn apply_changes(
        &self,
        poll_id: &str,
        admin_token: &str,
        changes: &PollChanges,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(poll) = state
            .polls
            .get_mut(poll_id)
            .filter(|poll| poll.admin_token == admin_token)
        else {
            return Ok(false);
        };

        if let Some(description) = &changes.description {
            poll.description = description.clone();
        }
        if let Some(options) = &changes.options {
            poll.options = options.clone();
        }
        if let Some(expires_at) = changes.expires_at {
            poll.expires_at = expires_at;
        }
        Ok(true)
    }

    pub async fn delete(&self, poll_id: &str, admin_token: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let matches = state
            .polls
            .get(poll_id)
            .is_some_and(|poll| poll.admin_token == admin_token);
        if matches {
            state.polls.remove(poll_id);
        }
        Ok(matches)
    }

    pub async fn increment_vote(
        &self,
        poll_id: &str,
        option_index: usize,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        #[cfg(test)]
        if state.fail_points.contains(&FailPoint::IncrementMisses) {
            return Ok(false);
        }
        match state
            .polls
            .get_mut(poll_id)
            .and_then(|poll| poll.options.get_mut(option_index))
        {
            Some(option) => {
                option.votes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn record_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        #[cfg(test)]
        state.check(FailPoint::RecordVote)?;
        state.votes.push(vote.clone());
        Ok(())
    }

    pub async fn remove_vote(&self, vote_id: &str) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .votes
            .retain(|vote| vote.id != vote_id);
        Ok(())
    }

    pub async fn vote_counts(&self, poll_id: &str) -> Result<HashMap<String, u64>, StoreError> {
        let state = self.state.read().await;
        let counts = state
            .votes
            .iter()
            .filter(|vote| vote.poll_id == poll_id)
            .fold(HashMap::new(), |mut acc, vote| {
                *acc.entry(vote.option_key.clone()).or_insert(0) += 1;
                acc
            });
        Ok(counts)
    }

    pub async fn clear_votes(&self, poll_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        #[cfg(test)]
        state.check(FailPoint::ClearVotes)?;
        state.votes.retain(|vote| vote.poll_id != poll_id);
        Ok(())
    }

    #[cfg(test)]
    pub async fn poll_count(&self) -> usize {
        self.state.read().await.polls.len()
    }

    #[cfg(test)]
    pub async fn vote_log_len(&self) -> usize {
        self.state.read().await.votes.len()
    }

    #[cfg(test)]
    pub async fn fail_on(&self, point: FailPoint) {
        self.state.write().await.fail_points.insert(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poll::build_options;
    use chrono::{Duration, Utc};

    fn poll(id: &str, creator: Option<&str>, minutes_ago: i64) -> Poll {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        Poll {
            id: id.into(),
            description: "Lunch?".into(),
            options: build_options(["Tacos", "Ramen"]),
            created_by: creator.map(String::from),
            admin_token: "Secret12".into(),
            expires_at: created_at + Duration::hours(1),
            created_at,
            color: None,
            allow_multiple_votes: false,
        }
    }

    #[tokio::test]
    async fn insert_rejects_taken_id() {
        let repo = MemoryPollRepository::new();
        repo.insert(&poll("aaaaa", None, 0)).await.unwrap();
        let err = repo.insert(&poll("aaaaa", None, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "aaaaa"));
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let repo = MemoryPollRepository::new();
        repo.insert(&poll("bbbbb", None, 0)).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.increment_vote("bbbbb", 1).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap());
        }

        let stored = repo.find_by_id("bbbbb").await.unwrap().unwrap();
        assert_eq!(stored.options[1].votes, 50);
        assert_eq!(stored.options[0].votes, 0);
    }

    #[tokio::test]
    async fn increment_on_missing_option_matches_nothing() {
        let repo = MemoryPollRepository::new();
        repo.insert(&poll("ccccc", None, 0)).await.unwrap();
        assert!(!repo.increment_vote("ccccc", 2).await.unwrap());
        assert!(!repo.increment_vote("zzzzz", 0).await.unwrap());
    }

    #[tokio::test]
    async fn changes_and_delete_require_admin_token() {
        let repo = MemoryPollRepository::new();
        repo.insert(&poll("ddddd", None, 0)).await.unwrap();
        let changes = PollChanges {
            description: Some("Dinner?".into()),
            ..PollChanges::default()
        };

        assert!(!repo.apply_changes("ddddd", "wrong", &changes).await.unwrap());
        assert!(!repo.delete("ddddd", "wrong").await.unwrap());
        assert_eq!(
            repo.find_by_id("ddddd").await.unwrap().unwrap().description,
            "Lunch?"
        );

        assert!(repo.apply_changes("ddddd", "Secret12", &changes).await.unwrap());
        assert!(repo.delete("ddddd", "Secret12").await.unwrap());
        assert!(repo.find_by_id("ddddd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn creator_listing_is_newest_first() {
        let repo = MemoryPollRepository::new();
        repo.insert(&poll("old01", Some("u1"), 30)).await.unwrap();
        repo.insert(&poll("new01", Some("u1"), 1)).await.unwrap();
        repo.insert(&poll("other", Some("u2"), 5)).await.unwrap();

        let ids: Vec<String> = repo
            .find_by_creator("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|poll| poll.id)
            .collect();
        assert_eq!(ids, vec!["new01", "old01"]);
        assert!(repo.find_by_creator("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vote_log_counts_and_clears_per_poll() {
        let repo = MemoryPollRepository::new();
        let vote = |id: &str, poll_id: &str, key: &str, voter: Option<&str>| Vote {
            id: id.into(),
            poll_id: poll_id.into(),
            option_key: key.into(),
            voter_id: voter.map(String::from),
            cast_at: Utc::now(),
        };
        repo.record_vote(&vote("v1", "p1", "1", Some("alice"))).await.unwrap();
        repo.record_vote(&vote("v2", "p1", "1", None)).await.unwrap();
        repo.record_vote(&vote("v3", "p1", "2", None)).await.unwrap();
        repo.record_vote(&vote("v4", "p2", "1", Some("bob"))).await.unwrap();

        let counts = repo.vote_counts("p1").await.unwrap();
        assert_eq!(counts.get("1"), Some(&2));
        assert_eq!(counts.get("2"), Some(&1));

        repo.remove_vote("v2").await.unwrap();
        assert_eq!(repo.vote_counts("p1").await.unwrap().get("1"), Some(&1));

        repo.clear_votes("p1").await.unwrap();
        assert!(repo.vote_counts("p1").await.unwrap().is_empty());
        assert_eq!(repo.vote_counts("p2").await.unwrap().get("1"), Some(&1));
    }
}
