use mongodb::Client;
use tracing::info;

use super::settings::{AppConfig, StoreBackend};
use crate::{
    error::StoreError,
    repositories::{
        memory_poll_repository::MemoryPollRepository, mongo_poll_repository::MongoPollRepository,
        poll_repository::PollRepository,
    },
};

pub async fn init_database(config: &AppConfig) -> Result<PollRepository, StoreError> {
    match &config.store {
        StoreBackend::Mongo { uri, database } => {
            let client = Client::with_uri_str(uri).await?;
            let db = client.database(database);
            let repository = MongoPollRepository::new(client, &db);
            repository.ensure_indexes().await?;
            info!("Connected to MongoDB database {}", database);
            Ok(PollRepository::Mongo(repository))
        }
        StoreBackend::Memory => {
            info!("Using in-memory poll store, data will not survive a restart");
            Ok(PollRepository::Memory(MemoryPollRepository::new()))
        }
    }
}
