//! Dora GitHub Client
//!
//! A small, typed client for the handful of GitHub GraphQL operations the
//! DORA team simulator needs: reading deployments, opening and merging pull
//! requests, and reading status check rollups.
//!
//! # Example
//!
//! ```no_run
//! use dora_client::{GitHubClient, RepositoryRef};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repo = RepositoryRef::new("liatrio", "dora-lambda-tf-module-demo");
//!     let client = GitHubClient::new("https://api.github.com/graphql", "ghp_token", repo);
//!
//!     match client.last_deployment().await? {
//!         Some(deployment) => println!("Last deployed at {}", deployment.created_at),
//!         None => println!("Never deployed"),
//!     }
//!     Ok(())
//! }
//! ```

mod commits;
mod deployments;
pub mod error;
mod pull_requests;
mod queries;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt;
use tracing::debug;

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// GraphQL client bound to a single repository
///
/// Methods are grouped by resource:
/// - Deployments (latest deployment record)
/// - Pull requests (repository id, create, merge, status check rollup)
/// - Commits (check runs attached to a commit)
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// GraphQL endpoint (e.g., "https://api.github.com/graphql")
    graphql_url: String,
    /// Personal access token sent as a bearer token
    token: String,
    /// Repository every query targets
    repo: RepositoryRef,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// # Arguments
    /// * `graphql_url` - The GraphQL endpoint
    /// * `token` - A personal access token
    /// * `repo` - The repository to query
    pub fn new(graphql_url: impl Into<String>, token: impl Into<String>, repo: RepositoryRef) -> Self {
        Self::with_client(graphql_url, token, repo, Client::new())
    }

    /// Create a new GitHub client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        graphql_url: impl Into<String>,
        token: impl Into<String>,
        repo: RepositoryRef,
        client: Client,
    ) -> Self {
        Self {
            graphql_url: graphql_url.into(),
            token: token.into(),
            repo,
            client,
        }
    }

    /// Get the GraphQL endpoint
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Get the repository this client targets
    pub fn repository(&self) -> &RepositoryRef {
        &self.repo
    }

    // =============================================================================
    // Request Execution
    // =============================================================================

    /// Execute a GraphQL document and decode its `data` member
    ///
    /// Non-2xx statuses, an `errors` array and a missing `data` member each
    /// map to their own [`ClientError`] variant.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        debug!("GraphQL {} against {}", operation, self.repo);

        let response = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, "dora-the-explorer")
            .json(&json!({
                "query": query,
                "operationName": operation,
                "variables": variables,
            }))
            .send()
            .await?;

        let body: GraphQlResponse<T> = self.handle_response(response).await?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| ClientError::ParseError(format!("{} returned no data", operation)))
    }

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    fn repository_variables(&self) -> serde_json::Value {
        json!({
            "owner": self.repo.owner,
            "name": self.repo.name,
        })
    }

    fn repository_not_found(&self) -> ClientError {
        ClientError::NotFound(format!("repository {}", self.repo))
    }
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// GraphQL connection holding a page of nodes
///
/// GitHub allows null entries in `nodes`; they are skipped.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Connection<T> {
    #[serde(default)]
    nodes: Vec<Option<T>>,

    /// Only present when the query selects `pageInfo`
    #[serde(default, rename = "pageInfo")]
    page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    /// Cursor of the following page, if there is one
    fn next_cursor(&self) -> Option<String> {
        self.page_info
            .as_ref()
            .filter(|page| page.has_next_page)
            .and_then(|page| page.end_cursor.clone())
    }

    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_repository_display() {
        let repo = RepositoryRef::new("liatrio", "demo");
        assert_eq!(repo.to_string(), "liatrio/demo");
    }

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(
            "https://api.github.com/graphql",
            "token",
            RepositoryRef::new("org", "repo"),
        );
        assert_eq!(client.graphql_url(), "https://api.github.com/graphql");
        assert_eq!(client.repository().name, "repo");
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "repository": { "id": "R_1" } } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = testing::client_for(&server);
        assert_eq!(client.repository_id().await.unwrap(), "R_1");
    }

    #[tokio::test]
    async fn test_execute_maps_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = testing::client_for(&server);
        let err = client.repository_id().await.unwrap_err();
        assert!(err.is_server_error());
        assert!(matches!(err, ClientError::ApiError { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_execute_maps_graphql_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [
                    { "message": "Bad credentials" },
                    { "message": "Try again" }
                ]
            })))
            .mount(&server)
            .await;

        let client = testing::client_for(&server);
        match client.repository_id().await.unwrap_err() {
            ClientError::GraphQl(message) => assert_eq!(message, "Bad credentials; Try again"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = testing::client_for(&server);
        let err = client.repository_id().await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
