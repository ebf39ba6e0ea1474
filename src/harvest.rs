use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;

use crate::{Result, client::GitHubClient, config::Config};

pub const ORG_REPOS_FILE: &str = "orgrepos.json";

#[derive(Deserialize)]
struct RepoInfo {
    name: String,
}

/// Outcome of one run. Repositories appear in the order they were enumerated.
#[derive(Debug)]
pub struct HarvestReport {
    pub output_dir: PathBuf,
    pub harvested: Vec<String>,
    pub failed: Vec<String>,
}

pub fn issues_file_name(repo: &str) -> String {
    format!("{repo}.issues.json")
}

/// Writes records as a pretty-printed JSON array, replacing any existing file.
fn write_snapshot(path: &Path, records: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn repo_names(repos: &[Value]) -> Result<Vec<String>> {
    repos
        .iter()
        .enumerate()
        .map(|(idx, repo)| {
            RepoInfo::deserialize(repo)
                .map(|info| info.name)
                .with_context(|| format!("repository record {idx} has no name"))
        })
        .collect()
}

/// Lists the organization's repositories, stores the raw list as
/// `orgrepos.json` and returns the names in API order.
pub async fn fetch_repositories(
    client: &GitHubClient,
    org: &str,
    output_dir: &Path,
) -> Result<Vec<String>> {
    log::info!("Fetching repositories for organization {org}...");
    let repos = client
        .list_org_repos(org)
        .await
        .with_context(|| format!("Error fetching repositories for organization {org}"))?;
    let names = repo_names(&repos)?;
    write_snapshot(&output_dir.join(ORG_REPOS_FILE), &repos)?;
    log::debug!("{org} has {} repositories", names.len());
    Ok(names)
}

/// Stores every issue of `org/repo`, open or closed, as `<repo>.issues.json`.
/// Returns the number of issues written.
pub async fn fetch_issues(
    client: &GitHubClient,
    org: &str,
    repo: &str,
    output_dir: &Path,
) -> Result<usize> {
    log::info!("Fetching issues for repository {repo}...");
    let issues = client.list_repo_issues(org, repo).await?;
    write_snapshot(&output_dir.join(issues_file_name(repo)), &issues)?;
    Ok(issues.len())
}

/// Enumerates once, then harvests each repository in turn. Only the
/// enumeration can fail the whole run; per-repository errors are logged and
/// recorded in the report.
pub async fn harvest(client: &GitHubClient, org: &str, output_dir: &Path) -> Result<HarvestReport> {
    let names = fetch_repositories(client, org, output_dir).await?;

    let mut harvested = Vec::new();
    let mut failed = Vec::new();
    for name in names {
        match fetch_issues(client, org, &name, output_dir).await {
            Ok(count) => {
                log::debug!("{name}: {count} issues");
                harvested.push(name);
            }
            Err(e) => {
                log::error!("Error fetching issues for repository {name}: {e:#}");
                failed.push(name);
            }
        }
    }

    Ok(HarvestReport {
        output_dir: output_dir.to_path_buf(),
        harvested,
        failed,
    })
}

pub async fn run(config: &Config) -> Result<HarvestReport> {
    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let client = GitHubClient::new(config)?;
    let report = harvest(&client, &config.organization, &output_dir).await?;

    if !report.failed.is_empty() {
        log::warn!(
            "no issues file for {} of {} repositories: {}",
            report.failed.len(),
            report.failed.len() + report.harvested.len(),
            report.failed.iter().join(", ")
        );
    }
    log::info!(
        "Data fetching completed. All data is stored in the {} directory.",
        output_dir.display()
    );
    Ok(report)
}
