pub mod client;
pub mod error;
pub mod queries;
pub mod types;
