pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub(crate) mod lenient;
pub mod policy;
pub mod policy_db;
pub mod report;
pub mod reporter;
pub mod requests;
pub mod scoring;
pub mod telemetry;
pub mod violation;
