use std::sync::Arc;

use super::settings::AppConfig;
use crate::{repositories::poll_repository::PollRepository, utils::jwt::TokenVerifier};

/// Shared by every handler through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub repository: PollRepository,
    pub config: Arc<AppConfig>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(repository: PollRepository, config: AppConfig) -> Self {
        let verifier = TokenVerifier::new(config.jwt_secret.as_bytes());
        Self {
            repository,
            config: Arc::new(config),
            verifier: Arc::new(verifier),
        }
    }
}
