pub mod fetcher;
pub mod logging;
