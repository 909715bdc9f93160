pub mod api;
pub mod config;
pub mod ingest;
pub mod parser;
pub mod runtime;
pub mod search;
pub mod store;
pub mod types;
