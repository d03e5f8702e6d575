pub mod cors;
pub mod db;
pub mod logger;
pub mod settings;
pub mod startup;
