use rand::{distributions::Alphanumeric, Rng};

use crate::{
    error::StoreError, models::poll::POLL_ID_LENGTH, repositories::poll_repository::PollRepository,
};

/// Random string drawn uniformly from `[A-Za-z0-9]`. Not meant for secrets
/// that must resist a determined attacker.
pub fn generate_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Draws poll ids until one is free in the store.
pub async fn generate_unique_poll_id(repository: &PollRepository) -> Result<String, StoreError> {
    loop {
        let candidate = generate_id(POLL_ID_LENGTH);
        if !repository.exists(&candidate).await? {
            return Ok(candidate);
        }
    }
}
