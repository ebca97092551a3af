pub mod config;
pub mod fetch;
pub mod humanize;
pub mod ingest;
pub mod license;
pub mod observability;
pub mod providers;
pub mod window;
