use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A single stale pull request, as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// The pull request title.
    pub title: String,
    /// The login of the pull request author.
    pub user: String,
    /// The canonical (browser) URL of the pull request.
    pub html_url: String,
}

/// The stale pull requests of a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoResult {
    /// The `owner/name` identifier of the repository.
    pub repo: String,
    /// Stale pull requests, in the order the classifier returned them.
    pub prs: Vec<PullRequestSummary>,
}

/// An ordered list of per-repository results.
pub type StaleReport = Vec<RepoResult>;
