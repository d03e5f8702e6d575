pub mod bson_datetime;
pub mod poll;
pub mod vote;
