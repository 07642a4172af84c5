// src/client.rs

use crate::error::ClientError;
use crate::model::*;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Repositories requested per listing; the server truncates beyond this
pub const PAGE_SIZE: usize = 100;

const USER_AGENT: &str = concat!("code-dna/", env!("CARGO_PKG_VERSION"));

/// The three remote lookups a query needs
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn user(&self, username: &str) -> Result<User, ClientError>;

    /// Most recently updated first, at most [`PAGE_SIZE`] entries
    async fn repos(&self, username: &str) -> Result<Vec<Repository>, ClientError>;

    async fn languages(&self, owner: &str, repo: &str) -> Result<ByteMap, ClientError>;
}

/// Fetches every repository's byte map concurrently.
///
/// A failing repository is logged and mapped to an empty byte map, so one
/// broken repository never voids the rest of the batch.
pub async fn fetch_all_languages<S>(source: &S, owner: &str, repos: &[Repository]) -> LanguagesByRepo
where
    S: ProfileSource + ?Sized,
{
    let requests = repos.iter().map(|repo| async move {
        let bytes = match source.languages(owner, &repo.name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(repo = %repo.name, error = %e, "language fetch failed, using empty map");
                ByteMap::new()
            }
        };
        (repo.name.clone(), bytes)
    });

    join_all(requests).await.into_iter().collect()
}

/// REST client for the public GitHub API
pub struct GitHubClient {
    http: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|source| ClientError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::OpaqueBaseUrl(base_url.to_string()));
        }
        let http = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so user input can never add path components or a query.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::OpaqueBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: &Url) -> Result<Response, ClientError> {
        debug!(%url, "GET");
        Ok(self.http.get(url.clone()).header("Accept", "application/vnd.github+json").send().await?)
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown status").to_string()
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl ProfileSource for GitHubClient {
    async fn user(&self, username: &str) -> Result<User, ClientError> {
        let url = self.url(&["users", username])?;
        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UserFetch {
                status: status.as_u16(),
                message: reason(status),
            });
        }
        decode(url.as_str(), response).await
    }

    async fn repos(&self, username: &str) -> Result<Vec<Repository>, ClientError> {
        let mut url = self.url(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string())
            .append_pair("sort", "updated");
        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RepoListFetch {
                status: status.as_u16(),
                message: reason(status),
            });
        }
        let repos: Vec<Repository> = decode(url.as_str(), response).await?;
        info!(count = repos.len(), "listed repositories");
        Ok(repos)
    }

    async fn languages(&self, owner: &str, repo: &str) -> Result<ByteMap, ClientError> {
        let url = self.url(&["repos", owner, repo, "languages"])?;
        let response = self.get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::LanguageFetch {
                repo: repo.to_string(),
                status: status.as_u16(),
            });
        }
        decode(url.as_str(), response).await
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;
    use crate::model::fixtures::repo;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    #[tokio::test]
    async fn failed_language_fetch_degrades_to_empty_map() {
        let mut source = FakeSource::default();
        source.languages.insert("a".into(), [("Rust".to_string(), 10)].into_iter().collect());
        let repos = vec![repo(1, "a", 0, Some("Rust")), repo(2, "b", 0, None)];

        let by_repo = fetch_all_languages(&source, "octocat", &repos).await;
        assert_eq!(by_repo.len(), 2);
        assert_eq!(by_repo["a"]["Rust"], 10);
        assert!(by_repo["b"].is_empty());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn language_fetches_run_concurrently() {
        let repos: Vec<_> = (0..4).map(|i| repo(i, &format!("r{i}"), 0, None)).collect();
        let mut source = FakeSource::default();
        source.gate = Some(Arc::new(Barrier::new(repos.len())));
        for r in &repos {
            source.languages.insert(r.name.clone(), [("Go".to_string(), 1)].into_iter().collect());
        }

        // Sequential fetching would park on the first call forever
        let by_repo = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_all_languages(&source, "octocat", &repos),
        )
        .await
        .expect("language fetches did not overlap");
        assert_eq!(by_repo.len(), 4);
        assert!(by_repo.values().all(|bytes| bytes["Go"] == 1));
    }

    #[test]
    fn base_url_is_normalized() {
        for base in ["https://example.test", "https://example.test/"] {
            let client = GitHubClient::new(base, Duration::from_secs(1)).unwrap();
            let url = client.url(&["users", "x"]).unwrap();
            assert_eq!(url.as_str(), "https://example.test/users/x");
        }
        let enterprise = GitHubClient::new("https://ghe.test/api/v3/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            enterprise.url(&["users", "x"]).unwrap().as_str(),
            "https://ghe.test/api/v3/users/x"
        );
    }

    #[test]
    fn usernames_cannot_escape_their_path_segment() {
        let client = GitHubClient::new("https://example.test", Duration::from_secs(1)).unwrap();
        let url = client.url(&["users", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "https://example.test/users/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.path_segments().map(|s| s.count()), Some(2));
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            GitHubClient::new("not a url", Duration::from_secs(1)),
            Err(ClientError::BaseUrl { .. })
        ));
        assert!(matches!(
            GitHubClient::new("mailto:someone@example.test", Duration::from_secs(1)),
            Err(ClientError::OpaqueBaseUrl(_))
        ));
    }
}
