//! Release polling and version comparison.
//!
//! Polls the GitHub latest-release endpoint for the configured repository
//! and compares the published tag against the running version. Every way the
//! check can fail collapses into a tagged [`UpdateStatus`] variant; nothing
//! here returns an error to the caller.

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT_VALUE: &str = concat!("parlance/", env!("CARGO_PKG_VERSION"));
const ACCEPT_VALUE: &str = "application/vnd.github.v3+json";

/// Asset name suffixes considered direct downloads.
const DOWNLOAD_SUFFIXES: &[&str] = &[".apk", ".zip", ".tar.gz"];

/// Details of an available release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    /// Release tag, e.g. "v1.4.0"
    pub version: String,
    pub release_notes: String,
    /// Release page URL
    pub release_url: String,
    /// Direct download URL; falls back to the release page when the release
    /// has no recognizable binary asset
    pub download_url: String,
    /// Publication date (YYYY-MM-DD)
    pub published_at: String,
}

/// Outcome of one update check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    UpdateAvailable(UpdateInfo),
    UpToDate,
    Timeout,
    NetworkError,
    ServerError { code: u16 },
    ParseError,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    tag_name: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    browser_download_url: String,
}

/// Polls a GitHub repository's latest release.
pub struct UpdateChecker {
    owner: String,
    repo: String,
    client: reqwest::Client,
}

impl UpdateChecker {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()?;
        Ok(Self {
            owner: owner.into(),
            repo: repo.into(),
            client,
        })
    }

    /// Check whether a release newer than `current_version` is published.
    pub async fn check(&self, current_version: &str) -> UpdateStatus {
        info!("update check: current version {current_version}");
        let url = format!(
            "https://api.github.com/repos/{}/{}/releases/latest",
            self.owner, self.repo
        );

        let response = match self
            .client
            .get(&url)
            .header(header::ACCEPT, ACCEPT_VALUE)
            .header(header::USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("update check: timed out: {e}");
                return UpdateStatus::Timeout;
            }
            Err(e) => {
                warn!("update check: network error: {e}");
                return UpdateStatus::NetworkError;
            }
        };

        let status = response.status();
        debug!("update check: response status {status}");
        if !status.is_success() {
            warn!("update check: server responded {status}");
            return UpdateStatus::ServerError {
                code: status.as_u16(),
            };
        }

        let release: Release = match response.json().await {
            Ok(release) => release,
            Err(e) => {
                warn!("update check: failed to parse release response: {e}");
                return UpdateStatus::ParseError;
            }
        };

        let Some(update) = self.release_info(release) else {
            return UpdateStatus::ParseError;
        };

        if is_version_newer(&update.version, current_version) {
            info!("update check: new version available: {}", update.version);
            UpdateStatus::UpdateAvailable(update)
        } else {
            info!("update check: already up to date");
            UpdateStatus::UpToDate
        }
    }

    fn release_info(&self, release: Release) -> Option<UpdateInfo> {
        if release.tag_name.is_empty() {
            warn!("update check: release has no tag name");
            return None;
        }

        let download_url = release
            .assets
            .iter()
            .find(|asset| {
                let name = asset.name.to_lowercase();
                DOWNLOAD_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
                    && !asset.browser_download_url.is_empty()
            })
            .map(|asset| asset.browser_download_url.clone())
            .unwrap_or_else(|| {
                format!(
                    "https://github.com/{}/{}/releases/tag/{}",
                    self.owner, self.repo, release.tag_name
                )
            });

        Some(UpdateInfo {
            version: release.tag_name,
            release_notes: release.body,
            release_url: release.html_url,
            download_url,
            published_at: format_date(&release.published_at),
        })
    }
}

/// Keep the date part of an ISO-8601 timestamp.
fn format_date(iso_date: &str) -> String {
    match iso_date.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => iso_date.to_string(),
    }
}

/// Dotted-numeric version precedence.
///
/// A leading `v`/`V` is stripped; components are compared numerically left
/// to right; missing or non-numeric components count as zero.
pub fn is_version_newer(latest: &str, current: &str) -> bool {
    let latest = version_components(latest);
    let current = version_components(current);

    let len = latest.len().max(current.len());
    for i in 0..len {
        let l = latest.get(i).copied().unwrap_or(0);
        let c = current.get(i).copied().unwrap_or(0);
        if l != c {
            return l > c;
        }
    }
    false
}

fn version_components(version: &str) -> Vec<u64> {
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);
    version
        .split('.')
        .map(|part| part.parse::<u64>().unwrap_or(0))
        .collect()
}
