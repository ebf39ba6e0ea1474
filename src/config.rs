use std::{env, fmt, path::PathBuf};

use itertools::Itertools;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OUTPUT_ROOT: &str = "data";

/// Settings read once at startup and handed to each stage.
#[derive(Clone)]
pub struct Config {
    pub access_token: String,
    pub organization: String,
    pub api_url: String,
    pub output_root: PathBuf,
}

// Keeps the token out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("organization", &self.organization)
            .field("api_url", &self.api_url)
            .field("output_root", &self.output_root)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `ACCESS_TOKEN` falls back to
    /// `GITHUB_ACCESS_TOKEN`; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = non_empty(lookup("ACCESS_TOKEN"))
            .or_else(|| non_empty(lookup("GITHUB_ACCESS_TOKEN")));
        let organization = non_empty(lookup("ORGANIZATION"));

        let (access_token, organization) = match (access_token, organization) {
            (Some(token), Some(org)) => (token, org),
            (token, org) => {
                let missing = [
                    token.is_none().then_some("ACCESS_TOKEN"),
                    org.is_none().then_some("ORGANIZATION"),
                ]
                .into_iter()
                .flatten()
                .join(", ");
                anyhow::bail!(
                    "ACCESS_TOKEN and ORGANIZATION must be set (environment or .env file); missing: {missing}"
                );
            }
        };

        let api_url = non_empty(lookup("GITHUB_API_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let output_root = non_empty(lookup("OUTPUT_ROOT"))
            .unwrap_or_else(|| DEFAULT_OUTPUT_ROOT.to_string())
            .into();

        Ok(Config {
            access_token,
            organization,
            api_url,
            output_root,
        })
    }

    /// `<output_root>/<organization>`
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.organization)
    }
}
