use log::debug;

use crate::{feature::pulls::LabelFetcher, libs::error::BoxError};

#[derive(Debug, thiserror::Error)]
pub enum GitHubError
{
    #[error("failed to start the GitHub client runtime")]
    Runtime(#[source] std::io::Error),

    #[error("failed to create the GitHub client")]
    Client(#[source] octocrab::Error),

    #[error("repository {0:?} is not in the form owner/repo")]
    Repository(String),
}

/// Splits `owner/repo`, the form GitHub Actions uses for `GITHUB_REPOSITORY`.
pub fn split_repository(repository: &str) -> Result<(String, String), GitHubError>
{
    match repository.split_once('/')
    {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner.to_string(), repo.trim_end_matches(".git").to_string()))
        }
        _ => Err(GitHubError::Repository(repository.to_string())),
    }
}

/// Reads pull request labels through the GitHub REST API.
///
/// Requests are made one at a time on a runtime owned by the fetcher, so the
/// fetcher can be used from plain synchronous code.
pub struct GitHubLabelFetcher
{
    client: octocrab::Octocrab,
    owner: String,
    repo: String,
    runtime: tokio::runtime::Runtime,
}

impl GitHubLabelFetcher
{
    // Ctor
    pub fn new(owner: String, repo: String, token: Option<String>, base_uri: Option<&str>) -> Result<GitHubLabelFetcher, GitHubError>
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(GitHubError::Runtime)?;

        // The client's HTTP stack has to be created inside a runtime.
        let client = {
            let _guard = runtime.enter();

            let mut builder = octocrab::Octocrab::builder();
            if let Some(token) = token
            {
                builder = builder.personal_token(token);
            }
            if let Some(base_uri) = base_uri
            {
                debug!("GitHub API: {}", base_uri);
                builder = builder.base_uri(base_uri).map_err(GitHubError::Client)?;
            }
            builder.build().map_err(GitHubError::Client)?
        };

        Ok(GitHubLabelFetcher { client, owner, repo, runtime })
    }
}

impl LabelFetcher for GitHubLabelFetcher
{
    fn fetch_labels(&self, id: u64) -> Result<Vec<String>, BoxError>
    {
        let labels = self.runtime.block_on(async {
            let page = self.client
                .issues(self.owner.as_str(), self.repo.as_str())
                .list_labels_for_issue(id)
                .per_page(100u8)
                .send()
                .await?;
            self.client.all_pages(page).await
        })?;

        debug!("Retrieved {} labels for {}/{}#{}", labels.len(), self.owner, self.repo, id);
        Ok(labels.into_iter().map(|label| label.name).collect())
    }
}

#[cfg(test)]
fn label(id: u64, name: &str) -> serde_json::Value
{
    serde_json::json!({
        "id": id,
        "node_id": format!("LA_{}", id),
        "url": format!("https://api.github.com/repos/foo/bar/labels/{}", name.replace(' ', "%20")),
        "name": name,
        "description": null,
        "color": "ededed",
        "default": false
    })
}

#[cfg(test)]
fn mock_server(status: u16, body: serde_json::Value) -> (tokio::runtime::Runtime, wiremock::MockServer)
{
    use wiremock::{matchers::{method, path}, Mock, MockServer, ResponseTemplate};

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/foo/bar/issues/12/labels"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    });
    (runtime, server)
}

#[test]
fn test_fetch_labels()
{
    let (_runtime, server) = mock_server(200, serde_json::json!([
        label(1, "label 1"),
        label(2, "label 2"),
        label(3, "label 3"),
    ]));

    let fetcher = GitHubLabelFetcher::new("foo".to_string(), "bar".to_string(), None, Some(server.uri().as_str())).unwrap();
    let labels = fetcher.fetch_labels(12).unwrap();
    assert_eq!(labels, vec!["label 1", "label 2", "label 3"]);
}

#[test]
fn test_fetch_no_labels()
{
    let (_runtime, server) = mock_server(200, serde_json::json!([]));

    let fetcher = GitHubLabelFetcher::new("foo".to_string(), "bar".to_string(), Some("token".to_string()), Some(server.uri().as_str())).unwrap();
    assert!(fetcher.fetch_labels(12).unwrap().is_empty());
}

#[test]
fn test_fetch_not_found()
{
    let (_runtime, server) = mock_server(404, serde_json::json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }));

    let fetcher = GitHubLabelFetcher::new("foo".to_string(), "bar".to_string(), None, Some(server.uri().as_str())).unwrap();
    assert!(fetcher.fetch_labels(12).is_err());
}

#[test]
fn test_split_repository()
{
    let (owner, repo) = split_repository("foo/bar").unwrap();
    assert_eq!(owner, "foo");
    assert_eq!(repo, "bar");

    assert_eq!(split_repository("foo/bar.git").unwrap().1, "bar");
    assert!(split_repository("foo").is_err());
    assert!(split_repository("/bar").is_err());
    assert!(split_repository("foo/").is_err());
    assert!(split_repository("foo/bar/baz").is_err());
}
