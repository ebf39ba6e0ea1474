use anyhow::Context;
use octocrab::{Octocrab, Page, service::middleware::retry::RetryConfig};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde_json::Value;

use crate::{Result, config::Config};

const PER_PAGE: u8 = 100;

// Unreserved characters stay as-is; anything else in an org or repo name is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Serialize)]
struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
    per_page: u8,
}

/// GitHub REST access through octocrab. Authentication and pagination are
/// octocrab's; the harvest stages only ever see complete lists of raw records.
pub struct GitHubClient {
    crab: Octocrab,
}

fn segment(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

/// Turns an octocrab error into a message carrying GitHub's own explanation.
fn describe(err: octocrab::Error) -> anyhow::Error {
    if let octocrab::Error::GitHub { source, .. } = &err {
        return anyhow::anyhow!(
            "GitHub API error: {} (HTTP {})",
            source.message,
            source.status_code.as_u16()
        );
    }
    anyhow::Error::new(err)
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        log::debug!("authenticating against {}", config.api_url);
        let crab = Octocrab::builder()
            .personal_token(config.access_token.clone())
            .base_uri(config.api_url.as_str())
            .with_context(|| format!("invalid GitHub API url {}", config.api_url))?
            .add_retry_config(RetryConfig::None)
            .build()
            .context("failed to build GitHub client")?;
        Ok(GitHubClient { crab })
    }

    /// Every repository of `org` visible to the token, in API order.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Value>> {
        let route = format!("/orgs/{}/repos", segment(org));
        self.get_all(&route, ListParams { state: None, per_page: PER_PAGE })
            .await
    }

    /// Every issue of `org/repo` in any state, in API order.
    pub async fn list_repo_issues(&self, org: &str, repo: &str) -> Result<Vec<Value>> {
        let route = format!("/repos/{}/{}/issues", segment(org), segment(repo));
        let params = ListParams {
            state: Some("all"),
            per_page: PER_PAGE,
        };
        self.get_all(&route, params).await
    }

    // octocrab walks the `Link` header one page at a time.
    async fn get_all(&self, route: &str, params: ListParams) -> Result<Vec<Value>> {
        let first: Page<Value> = self
            .crab
            .get(route, Some(&params))
            .await
            .map_err(describe)
            .with_context(|| format!("GET {route} failed"))?;
        let records = self
            .crab
            .all_pages(first)
            .await
            .map_err(describe)
            .with_context(|| format!("fetching further pages of {route} failed"))?;
        log::debug!("{route} returned {} records", records.len());
        Ok(records)
    }
}
