use axum::extract::FromRequest;
use chrono::Duration;
use serde::Deserialize;

use crate::{
    error::{AppError, ValidationError},
    services::poll_service::{NewPoll, PollAccess, PollEdit, PollLookup, PollUpdate, VoteCast},
};

/// `axum::Json` with body rejections reported through [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollDTO {
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
    /// Milliseconds until the poll closes
    pub duration: Option<i64>,
    pub color: Option<String>,
    pub can_vote_more_than_once: Option<bool>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct PollInfoDTO {
    pub pollID: Option<String>,
    pub adminID: Option<String>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EditPollDTO {
    pub pollID: Option<String>,
    pub adminID: Option<String>,
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdatePollDTO {
    pub pollID: Option<String>,
    pub adminID: Option<String>,
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
    pub duration: Option<i64>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct DeletePollDTO {
    pub pollID: Option<String>,
    pub adminID: Option<String>,
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct VoteDTO {
    pub pollID: Option<String>,
    pub optionID: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(value: Option<String>, missing: ValidationError) -> Result<String, ValidationError> {
    non_blank(value).ok_or(missing)
}

fn validate_options(options: Vec<String>) -> Result<Vec<String>, ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::MissingOptions);
    }
    options
        .into_iter()
        .enumerate()
        .map(|(index, text)| non_blank(Some(text)).ok_or(ValidationError::BlankOption(index + 1)))
        .collect()
}

fn validate_duration(duration: Option<i64>) -> Result<Duration, ValidationError> {
    match duration {
        Some(millis) if millis > 0 => Ok(Duration::milliseconds(millis)),
        _ => Err(ValidationError::InvalidDuration),
    }
}

impl CreatePollDTO {
    pub fn validate(self) -> Result<NewPoll, ValidationError> {
        let description = require(self.description, ValidationError::MissingDescription)?;
        let options = validate_options(self.options.unwrap_or_default())?;
        let duration = validate_duration(self.duration)?;
        Ok(NewPoll {
            description,
            options,
            duration,
            color: non_blank(self.color),
            allow_multiple_votes: self.can_vote_more_than_once.unwrap_or(false),
        })
    }
}

impl PollInfoDTO {
    pub fn validate(self) -> Result<PollLookup, ValidationError> {
        Ok(PollLookup {
            poll_id: require(self.pollID, ValidationError::MissingPollId)?,
            admin_token: non_blank(self.adminID),
        })
    }
}

impl EditPollDTO {
    pub fn validate(self) -> Result<PollEdit, ValidationError> {
        let poll_id = require(self.pollID, ValidationError::MissingPollId)?;
        let admin_token = require(self.adminID, ValidationError::MissingAdminToken)?;
        let description = match self.description {
            Some(text) => Some(require(Some(text), ValidationError::MissingDescription)?),
            None => None,
        };
        let options = self.options.map(validate_options).transpose()?;
        if description.is_none() && options.is_none() {
            return Err(ValidationError::NothingToEdit);
        }
        Ok(PollEdit {
            poll_id,
            admin_token,
            description,
            options,
        })
    }
}

impl UpdatePollDTO {
    pub fn has_admin_token(&self) -> bool {
        self.adminID
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    pub fn validate(self) -> Result<PollUpdate, ValidationError> {
        Ok(PollUpdate {
            poll_id: require(self.pollID, ValidationError::MissingPollId)?,
            admin_token: non_blank(self.adminID),
            description: require(self.description, ValidationError::MissingDescription)?,
            options: validate_options(self.options.unwrap_or_default())?,
            duration: validate_duration(self.duration)?,
        })
    }
}

impl DeletePollDTO {
    pub fn validate(self) -> Result<PollAccess, ValidationError> {
        Ok(PollAccess {
            poll_id: require(self.pollID, ValidationError::MissingPollId)?,
            admin_token: require(self.adminID, ValidationError::MissingAdminToken)?,
        })
    }
}

impl VoteDTO {
    pub fn validate(self) -> Result<VoteCast, ValidationError> {
        Ok(VoteCast {
            poll_id: require(self.pollID, ValidationError::MissingPollId)?,
            option_key: require(self.optionID, ValidationError::MissingOptionId)?,
        })
    }
}
