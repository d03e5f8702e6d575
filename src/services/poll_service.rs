use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::{
    dtos::responses::{CreatedPollData, PollResponseDTO},
    error::{AppError, PollsError, StoreError, ValidationError},
    models::{
        poll::{build_options, Poll, ADMIN_TOKEN_LENGTH},
        vote::{Vote, VOTE_ID_LENGTH},
    },
    repositories::poll_repository::{PollChanges, PollRepository},
    utils::id_generator::{generate_id, generate_unique_poll_id},
};

#[derive(Debug, Clone)]
pub struct NewPoll {
    pub description: String,
    pub options: Vec<String>,
    pub duration: Duration,
    pub color: Option<String>,
    pub allow_multiple_votes: bool,
}

#[derive(Debug, Clone)]
pub struct PollLookup {
    pub poll_id: String,
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PollEdit {
    pub poll_id: String,
    pub admin_token: String,
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub poll_id: String,
    pub admin_token: Option<String>,
    pub description: String,
    pub options: Vec<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct PollAccess {
    pub poll_id: String,
    pub admin_token: String,
}

#[derive(Debug, Clone)]
pub struct VoteCast {
    pub poll_id: String,
    pub option_key: String,
}

pub struct PollService {
    repository: PollRepository,
}

fn expiry_after(now: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>, ValidationError> {
    now.checked_add_signed(duration)
        .ok_or(ValidationError::InvalidDuration)
}

impl PollService {
    pub fn new(repository: PollRepository) -> Self {
        Self { repository }
    }

    async fn find(&self, poll_id: &str) -> Result<Poll, AppError> {
        self.repository
            .find_by_id(poll_id)
            .await?
            .ok_or(AppError::Poll(PollsError::PollNotFound))
    }

    pub async fn create(
        &self,
        new_poll: NewPoll,
        creator_id: Option<String>,
    ) -> Result<CreatedPollData, AppError> {
        let now = Utc::now();
        let mut poll = Poll {
            id: String::new(),
            description: new_poll.description,
            options: build_options(new_poll.options),
            created_by: creator_id,
            admin_token: generate_id(ADMIN_TOKEN_LENGTH),
            expires_at: expiry_after(now, new_poll.duration)?,
            created_at: now,
            color: new_poll.color,
            allow_multiple_votes: new_poll.allow_multiple_votes,
        };

        loop {
            poll.id = generate_unique_poll_id(&self.repository).await?;
            match self.repository.insert(&poll).await {
                Ok(()) => break,
                Err(StoreError::DuplicateId(taken)) => {
                    warn!("Poll id {} was claimed concurrently, drawing another", taken);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Poll {} created with {} options, expires at {}",
            poll.id,
            poll.options.len(),
            poll.expires_at
        );
        Ok(CreatedPollData {
            poll_id: poll.id,
            admin_id: poll.admin_token,
        })
    }

    pub async fn read(&self, lookup: PollLookup) -> Result<PollResponseDTO, AppError> {
        let poll = self.find(&lookup.poll_id).await?;
        let now = Utc::now();

        match lookup.admin_token {
            None => Ok(PollResponseDTO::public(&poll, now)),
            Some(token) if token == poll.admin_token => {
                let counts = self.repository.vote_counts(&poll.id).await?;
                Ok(PollResponseDTO::owner(&poll, now).with_results(&poll, &counts))
            }
            Some(_) => {
                warn!("Admin token mismatch reading poll {}", poll.id);
                Err(PollsError::UnauthorizedAccess.into())
            }
        }
    }

    /// Replaces description and/or options. Replacing options resets every
    /// counter and drops the poll's vote log.
    pub async fn edit(&self, edit: PollEdit) -> Result<(), AppError> {
        let poll = self.find(&edit.poll_id).await?;
        if poll.admin_token != edit.admin_token {
            warn!("Admin token mismatch editing poll {}", poll.id);
            return Err(PollsError::UnauthorizedAccess.into());
        }

        let replaces_options = edit.options.is_some();
        let changes = PollChanges {
            description: edit.description,
            options: edit.options.map(build_options),
            expires_at: None,
        };

        if !self
            .repository
            .apply_changes(&poll.id, &edit.admin_token, &changes)
            .await?
        {
            return Err(PollsError::UpdateFailed(format!("poll {} was not modified", poll.id)).into());
        }
        if replaces_options {
            self.drop_vote_log(&poll.id).await;
        }

        info!("Poll {} edited", poll.id);
        Ok(())
    }

    /// Rewrites the whole poll and restarts its clock. Allowed with the admin
    /// token or for the identified creator.
    pub async fn update(
        &self,
        update: PollUpdate,
        caller_id: Option<&str>,
    ) -> Result<PollResponseDTO, AppError> {
        if caller_id.is_none() && update.admin_token.is_none() {
            return Err(AppError::AuthenticationRequired);
        }

        let poll = self.find(&update.poll_id).await?;
        let holds_token = update.admin_token.as_deref() == Some(poll.admin_token.as_str());
        let is_creator = caller_id.is_some() && poll.created_by.as_deref() == caller_id;
        if !holds_token && !is_creator {
            warn!("Unauthorized update attempt on poll {}", poll.id);
            return Err(PollsError::UnauthorizedAccess.into());
        }

        let now = Utc::now();
        let changes = PollChanges {
            description: Some(update.description),
            options: Some(build_options(update.options)),
            expires_at: Some(expiry_after(now, update.duration)?),
        };

        if !self
            .repository
            .apply_changes(&poll.id, &poll.admin_token, &changes)
            .await?
        {
            return Err(PollsError::PollNotFound.into());
        }
        self.drop_vote_log(&poll.id).await;

        let updated = self.find(&poll.id).await?;
        info!("Poll {} updated, now expires at {}", updated.id, updated.expires_at);
        Ok(PollResponseDTO::owner(&updated, now))
    }

    /// A wrong token and a missing poll look the same to the caller.
    pub async fn delete(&self, access: PollAccess) -> Result<(), AppError> {
        if !self
            .repository
            .delete(&access.poll_id, &access.admin_token)
            .await?
        {
            return Err(PollsError::PollNotFoundOrUnauthorized.into());
        }
        self.drop_vote_log(&access.poll_id).await;

        info!("Poll {} deleted", access.poll_id);
        Ok(())
    }

    pub async fn vote(&self, cast: VoteCast, voter_id: Option<&str>) -> Result<(), AppError> {
        let poll = self.find(&cast.poll_id).await?;
        let option_index = poll
            .option_index(&cast.option_key)
            .ok_or_else(|| PollsError::InvalidPollOption(cast.option_key.clone()))?;

        let now = Utc::now();
        if poll.is_expired(now) {
            return Err(PollsError::PollEnded.into());
        }

        // Log record before counter; it is removed again if the increment fails.
        let vote = Vote {
            id: generate_id(VOTE_ID_LENGTH),
            poll_id: poll.id,
            option_key: cast.option_key,
            voter_id: voter_id.map(String::from),
            cast_at: now,
        };
        self.repository.record_vote(&vote).await?;

        let error: AppError = match self
            .repository
            .increment_vote(&vote.poll_id, option_index)
            .await
        {
            Ok(true) => return Ok(()),
            Ok(false) => PollsError::UpdateFailed(format!(
                "vote on poll {} was not recorded",
                vote.poll_id
            ))
            .into(),
            Err(e) => e.into(),
        };
        if let Err(e) = self.repository.remove_vote(&vote.id).await {
            warn!("Failed to roll back vote record {}: {}", vote.id, e);
        }
        Err(error)
    }

    /// The poll write already succeeded, so a failure here only leaves stale
    /// log records behind.
    async fn drop_vote_log(&self, poll_id: &str) {
        if let Err(e) = self.repository.clear_votes(poll_id).await {
            warn!("Failed to clear vote records for poll {}: {}", poll_id, e);
        }
    }

    pub async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<PollResponseDTO>, AppError> {
        let now = Utc::now();
        let polls = self.repository.find_by_creator(creator_id).await?;
        Ok(polls
            .iter()
            .map(|poll| PollResponseDTO::owner(poll, now))
            .collect())
    }
}
