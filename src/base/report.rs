//! Rendering of stale pull request reports into chat messages.

use super::types::{PullRequestSummary, StaleReport};

/// Options that control how a report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Omit the header of repositories that have no stale pull requests.
    pub skip_empty_repos: bool,
}

/// Renders a report as a multi-line message.
///
/// Each repository contributes a `"\n<repo>:\n"` header followed by one line per pull request,
/// and all items are joined with newlines. Ordering is preserved as given.
pub fn format_report(report: &StaleReport, options: FormatOptions) -> String {
    let mut output = Vec::new();

    for result in report {
        if options.skip_empty_repos && result.prs.is_empty() {
            continue;
        }

        output.push(format!("\n{}:\n", result.repo));
        output.extend(result.prs.iter().map(format_pull_request));
    }

    output.join("\n")
}

fn format_pull_request(pr: &PullRequestSummary) -> String {
    format!("{} ({}) {}", pr.title, pr.user, pr.html_url)
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::RepoResult;

    fn pr(title: &str, user: &str, url: &str) -> PullRequestSummary {
        PullRequestSummary {
            title: title.to_string(),
            user: user.to_string(),
            html_url: url.to_string(),
        }
    }

    #[test]
    fn single_repo_single_pr() {
        let report = vec![RepoResult {
            repo: "org/a".to_string(),
            prs: vec![pr("Fix bug", "alice", "http://x/1")],
        }];

        assert_eq!(format_report(&report, FormatOptions::default()), "\norg/a:\n\nFix bug (alice) http://x/1");
    }

    #[test]
    fn empty_report_is_empty_string() {
        assert_eq!(format_report(&Vec::new(), FormatOptions::default()), "");
    }

    #[test]
    fn repos_keep_order_and_empty_headers() {
        let report = vec![
            RepoResult {
                repo: "org/a".to_string(),
                prs: vec![pr("One", "alice", "http://x/1"), pr("Two", "bob", "http://x/2")],
            },
            RepoResult {
                repo: "org/b".to_string(),
                prs: vec![],
            },
        ];

        assert_eq!(
            format_report(&report, FormatOptions::default()),
            "\norg/a:\n\nOne (alice) http://x/1\nTwo (bob) http://x/2\n\norg/b:\n"
        );
    }

    #[test]
    fn skip_empty_repos_drops_headers() {
        let report = vec![
            RepoResult {
                repo: "org/a".to_string(),
                prs: vec![],
            },
            RepoResult {
                repo: "org/b".to_string(),
                prs: vec![pr("Docs", "carol", "http://x/3")],
            },
        ];

        let options = FormatOptions { skip_empty_repos: true };

        assert_eq!(format_report(&report, options), "\norg/b:\n\nDocs (carol) http://x/3");
    }

    #[test]
    fn formatting_is_deterministic() {
        let report = vec![RepoResult {
            repo: "org/a".to_string(),
            prs: vec![pr("Fix bug", "alice", "http://x/1")],
        }];

        assert_eq!(format_report(&report, FormatOptions::default()), format_report(&report.clone(), FormatOptions::default()));
    }
}
