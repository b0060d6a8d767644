use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::diff::FileChange;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;
/// GitHub stops listing PR files at 3000 entries; commits at 250.
const MAX_PAGES: usize = 30;

/// The pull request fields descbot reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Empty when the PR has no description.
    pub body: String,
    pub head_ref: String,
    pub base_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
}

impl Commit {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// Where pull requests live. The orchestrator only talks to this trait.
pub trait PullRequestHost {
    fn pull_request(&self) -> Result<PullRequest>;
    fn files(&self) -> Result<Vec<FileChange>>;
    fn commits(&self) -> Result<Vec<Commit>>;
    fn update_body(&self, body: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    body: Option<String>,
    head: BranchRef,
    base: BranchRef,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    body: &'a str,
}

impl From<PullResponse> for PullRequest {
    fn from(p: PullResponse) -> Self {
        PullRequest {
            number: p.number,
            title: p.title,
            body: p.body.unwrap_or_default(),
            head_ref: p.head.name,
            base_ref: p.base.name,
        }
    }
}

/// GitHub REST client bound to one pull request.
pub struct GitHubClient {
    client: Client,
    token: String,
    api_url: String,
    repo: String,
    number: u64,
}

impl GitHubClient {
    pub fn new(token: String, api_url: &str, repo: String, number: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(concat!("descbot/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(GitHubClient {
            client,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            repo,
            number,
        })
    }

    fn pull_url(&self) -> String {
        format!("{}/repos/{}/pulls/{}", self.api_url, self.repo, self.number)
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("failed to send GitHub request for {what}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "GitHub API error for {what}: HTTP {} - {}",
                status.as_u16(),
                text
            ));
        }
        Ok(resp)
    }

    /// Walk `?per_page=100&page=N` until a short page comes back.
    fn paginate<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/{path}?per_page={PER_PAGE}&page={page}",
                self.pull_url()
            );
            let items: Vec<T> = self
                .send(self.client.get(url), what)?
                .json()
                .with_context(|| format!("failed to parse GitHub {what} page {page}"))?;

            let len = items.len();
            out.extend(items);
            if len < PER_PAGE {
                break;
            }
        }
        Ok(out)
    }
}

impl PullRequestHost for GitHubClient {
    fn pull_request(&self) -> Result<PullRequest> {
        log::info!("Fetching {}#{}", self.repo, self.number);
        let pr: PullResponse = self
            .send(self.client.get(self.pull_url()), "pull request")?
            .json()
            .context("failed to parse GitHub pull request")?;
        Ok(pr.into())
    }

    fn files(&self) -> Result<Vec<FileChange>> {
        let files: Vec<FileChange> = self.paginate("files", "changed files")?;
        log::info!("Fetched {} changed file(s)", files.len());
        Ok(files)
    }

    fn commits(&self) -> Result<Vec<Commit>> {
        let commits: Vec<CommitResponse> = self.paginate("commits", "commits")?;
        log::info!("Fetched {} commit(s)", commits.len());
        Ok(commits
            .into_iter()
            .map(|c| Commit {
                sha: c.sha,
                message: c.commit.message,
            })
            .collect())
    }

    fn update_body(&self, body: &str) -> Result<()> {
        log::info!("Updating description of {}#{}", self.repo, self.number);
        self.send(
            self.client.patch(self.pull_url()).json(&UpdateBody { body }),
            "description update",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_response_maps_null_body_to_empty() {
        let json = r#"{
            "number": 42,
            "title": "Add retries",
            "body": null,
            "head": {"ref": "feature/retry", "sha": "abc"},
            "base": {"ref": "main", "sha": "def"},
            "state": "open"
        }"#;
        let pr: PullRequest = serde_json::from_str::<PullResponse>(json).unwrap().into();
        assert_eq!(
            pr,
            PullRequest {
                number: 42,
                title: "Add retries".into(),
                body: String::new(),
                head_ref: "feature/retry".into(),
                base_ref: "main".into(),
            }
        );
    }

    #[test]
    fn commit_helpers() {
        let c = Commit {
            sha: "0123456789".into(),
            message: "Fix the thing\n\nDetails here".into(),
        };
        assert_eq!(c.short_sha(), "0123456");
        assert_eq!(c.subject(), "Fix the thing");

        let short = Commit {
            sha: "abc".into(),
            message: String::new(),
        };
        assert_eq!(short.short_sha(), "abc");
        assert_eq!(short.subject(), "");
    }

    #[test]
    fn pull_url_is_built_from_repo_and_number() {
        let client = GitHubClient::new("t".into(), "https://ghe.example.com/api/v3/", "o/r".into(), 9).unwrap();
        assert_eq!(client.pull_url(), "https://ghe.example.com/api/v3/repos/o/r/pulls/9");
    }
}
