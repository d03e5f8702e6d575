pub mod memory_poll_repository;
pub mod mongo_poll_repository;
pub mod poll_repository;
