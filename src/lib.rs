pub mod client;
pub mod config;
pub mod harvest;

pub use client::GitHubClient;
pub use config::Config;
pub use harvest::{HarvestReport, fetch_issues, fetch_repositories, harvest, run};

type Result<T> = anyhow::Result<T>;
