//! GitHub REST implementation of the stale pull request classifier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{PullRequestSummary, RepoResult, Res, StaleReport},
};

use super::{GenericStaleClassifier, StaleClient};

/// Page size used when listing pull requests (GitHub's maximum).
const PAGE_SIZE: usize = 100;

// Extra methods on `StaleClient` applied by the GitHub implementation.

impl StaleClient {
    /// Creates a new GitHub-backed classifier authenticated with `token`.
    pub fn github(config: &Config, token: &str) -> Res<Self> {
        let client = GithubStaleClassifier::new(&config.github_api_url, token)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Partial GitHub API response for a pull request.
#[derive(Debug, Deserialize)]
struct GithubPullRequest {
    title: String,
    html_url: String,
    updated_at: DateTime<Utc>,
    user: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

/// GitHub classifier implementation.
struct GithubStaleClassifier {
    api_url: String,
    token: String,
    client: reqwest::Client,
}

impl GithubStaleClassifier {
    fn new(api_url: &str, token: &str) -> Res<Self> {
        let client = reqwest::Client::builder().user_agent(concat!("stale-pr-bot/", env!("CARGO_PKG_VERSION"))).build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    /// Lists every open pull request of `repo`, following pagination.
    #[instrument(skip(self))]
    async fn list_open_pull_requests(&self, repo: &str) -> Res<Vec<GithubPullRequest>> {
        let mut pulls = Vec::new();

        for page in 1.. {
            let url = format!("{}/repos/{}/pulls", self.api_url, repo);
            let per_page = PAGE_SIZE.to_string();
            let page = page.to_string();

            let response = self
                .client
                .get(&url)
                .query(&[("state", "open"), ("per_page", per_page.as_str()), ("page", page.as_str())])
                .bearer_auth(&self.token)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list pull requests of `{}`: {}", repo, e))?;

            if !response.status().is_success() {
                return Err(anyhow::anyhow!("GitHub API returned {} for `{}`.", response.status(), repo));
            }

            let batch: Vec<GithubPullRequest> = response.json().await?;
            let done = batch.len() < PAGE_SIZE;

            debug!("Fetched {} pull requests from page {}.", batch.len(), page);
            pulls.extend(batch);

            if done {
                break;
            }
        }

        Ok(pulls)
    }
}

#[async_trait]
impl GenericStaleClassifier for GithubStaleClassifier {
    #[instrument(skip(self))]
    async fn retrieve(&self, repos: &[String], stale_hours: u64) -> Res<StaleReport> {
        let cutoff = stale_cutoff(Utc::now(), stale_hours);
        let mut report = Vec::with_capacity(repos.len());

        for repo in repos {
            let pulls = self.list_open_pull_requests(repo).await?;
            let prs = select_stale(pulls, cutoff);

            info!("Found {} stale pull requests in {}.", prs.len(), repo);

            report.push(RepoResult { repo: repo.clone(), prs });
        }

        Ok(report)
    }
}

// Helpers.

/// The instant before which a pull request's last update makes it stale.
fn stale_cutoff(now: DateTime<Utc>, stale_hours: u64) -> DateTime<Utc> {
    let hours = i64::try_from(stale_hours).unwrap_or(i64::MAX);
    Duration::try_hours(hours).and_then(|d| now.checked_sub_signed(d)).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Keeps the pull requests last updated at or before `cutoff`, preserving order.
fn select_stale(pulls: Vec<GithubPullRequest>, cutoff: DateTime<Utc>) -> Vec<PullRequestSummary> {
    pulls
        .into_iter()
        .filter(|pr| pr.updated_at <= cutoff)
        .map(|pr| PullRequestSummary {
            title: pr.title,
            user: pr.user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string()),
            html_url: pr.html_url,
        })
        .collect()
}

// Tests.

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn pulls() -> Vec<GithubPullRequest> {
        serde_json::from_value(serde_json::json!([
            {
                "number": 1,
                "title": "Fix bug",
                "html_url": "https://github.com/org/a/pull/1",
                "updated_at": "2026-10-17T09:00:00Z",
                "user": { "login": "alice", "id": 1 }
            },
            {
                "number": 2,
                "title": "Add feature",
                "html_url": "https://github.com/org/a/pull/2",
                "updated_at": "2026-10-19T08:00:00Z",
                "user": { "login": "bob", "id": 2 }
            },
            {
                "number": 3,
                "title": "Old docs",
                "html_url": "https://github.com/org/a/pull/3",
                "updated_at": "2026-10-01T00:00:00Z",
                "user": null
            }
        ]))
        .unwrap()
    }

    #[test]
    fn cutoff_subtracts_hours() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        assert_eq!(stale_cutoff(now, 24), Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap());
    }

    #[test]
    fn cutoff_saturates_for_huge_thresholds() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        assert_eq!(stale_cutoff(now, u64::MAX), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn only_old_pull_requests_are_selected_in_order() {
        let cutoff = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        let stale = select_stale(pulls(), cutoff);

        assert_eq!(
            stale,
            vec![
                PullRequestSummary {
                    title: "Fix bug".to_string(),
                    user: "alice".to_string(),
                    html_url: "https://github.com/org/a/pull/1".to_string(),
                },
                PullRequestSummary {
                    title: "Old docs".to_string(),
                    user: "ghost".to_string(),
                    html_url: "https://github.com/org/a/pull/3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn api_url_trailing_slash_is_trimmed() {
        let classifier = GithubStaleClassifier::new("https://github.example.com/api/v3/", "token").unwrap();

        assert_eq!(classifier.api_url, "https://github.example.com/api/v3");
    }
}
