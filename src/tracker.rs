//! Issue Export
//!
//! Pushes an idea and its notes to the external issue tracker (Linear).
//! Without an API key the exporter is disabled and every call fails fast
//! with a configuration error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TrackerConfig;
use crate::domain::{DomainError, DomainResult};

pub const NOT_CONFIGURED: &str =
    "Linear API key is not configured. Please set LINEAR_API_KEY in the environment or config file.";
pub const NO_TEAMS: &str = "No teams found in Linear. Please create a team first.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// External tracker operations used by the exporter
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Teams visible to the authenticated user, in tracker order
    async fn teams(&self) -> DomainResult<Vec<Team>>;

    async fn create_issue(&self, team_id: &str, title: &str, description: &str) -> DomainResult<CreatedIssue>;
}

/// Issue export gateway
#[derive(Clone, Default)]
pub struct IssueExporter {
    tracker: Option<Arc<dyn IssueTracker>>,
}

impl IssueExporter {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker: Some(tracker) }
    }

    pub fn disabled() -> Self {
        Self { tracker: None }
    }

    /// Linear-backed exporter when a key is configured, disabled otherwise
    pub fn from_config(config: &TrackerConfig) -> DomainResult<Self> {
        match config.api_key.as_deref() {
            Some(key) => {
                let tracker = LinearTracker::new(key, &config.api_url)?;
                Ok(Self::new(Arc::new(tracker)))
            }
            None => {
                log::info!("Issue export disabled: no Linear API key");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.tracker.is_some()
    }

    /// Create one issue in the first team the tracker returns
    pub async fn create_issue(&self, title: &str, description: &str) -> DomainResult<CreatedIssue> {
        let tracker = self
            .tracker
            .as_ref()
            .ok_or_else(|| DomainError::Config(NOT_CONFIGURED.to_string()))?;

        let result = async {
            let team = tracker
                .teams()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| DomainError::Setup(NO_TEAMS.to_string()))?;
            tracker.create_issue(&team.id, title, description).await
        }
        .await;

        match &result {
            Ok(issue) => log::info!("Created Linear issue {}", issue.identifier),
            Err(e) => log::error!("Failed to create Linear issue: {}", e),
        }
        result
    }
}

/// Linear GraphQL client
pub struct LinearTracker {
    client: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct ViewerTeams {
    viewer: ViewerTeamsInner,
}

#[derive(Deserialize)]
struct ViewerTeamsInner {
    teams: Nodes<Team>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: IssueCreatePayload,
}

#[derive(Deserialize)]
struct IssueCreatePayload {
    success: bool,
    issue: Option<CreatedIssue>,
}

const TEAMS_QUERY: &str = "query Teams { viewer { teams { nodes { id name } } } }";
const ISSUE_CREATE_MUTATION: &str = "mutation IssueCreate($input: IssueCreateInput!) { \
     issueCreate(input: $input) { success issue { id identifier title url } } }";

impl LinearTracker {
    pub fn new(api_key: &str, api_url: &str) -> DomainResult<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(api_key)
            .map_err(|_| DomainError::Config("Linear API key contains invalid characters".to_string()))?;
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> DomainResult<T> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::remote_status(status.as_u16(), body));
        }

        let body: GraphQlResponse<T> = response.json().await?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(DomainError::remote(messages.join("; ")));
        }
        body.data
            .ok_or_else(|| DomainError::remote("Linear returned no data"))
    }
}

#[async_trait]
impl IssueTracker for LinearTracker {
    async fn teams(&self) -> DomainResult<Vec<Team>> {
        let data: ViewerTeams = self.graphql(TEAMS_QUERY, json!({})).await?;
        Ok(data.viewer.teams.nodes)
    }

    async fn create_issue(&self, team_id: &str, title: &str, description: &str) -> DomainResult<CreatedIssue> {
        let variables = json!({
            "input": { "teamId": team_id, "title": title, "description": description }
        });
        let data: IssueCreateData = self.graphql(ISSUE_CREATE_MUTATION, variables).await?;

        match data.issue_create.issue {
            Some(issue) if data.issue_create.success => Ok(issue),
            _ => Err(DomainError::remote("Failed to retrieve created issue data.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{body_string_contains, header as header_eq, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records calls instead of talking to a tracker
    #[derive(Default)]
    struct FakeTracker {
        teams: Vec<Team>,
        created: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn teams(&self) -> DomainResult<Vec<Team>> {
            Ok(self.teams.clone())
        }

        async fn create_issue(&self, team_id: &str, title: &str, _description: &str) -> DomainResult<CreatedIssue> {
            self.created.lock().unwrap().push((team_id.to_string(), title.to_string()));
            Ok(CreatedIssue {
                id: "i1".to_string(),
                identifier: "RIA-1".to_string(),
                title: title.to_string(),
                url: None,
            })
        }
    }

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_disabled_exporter_fails_with_config_error() {
        let exporter = IssueExporter::from_config(&TrackerConfig::default()).unwrap();
        assert!(!exporter.is_configured());

        let err = exporter.create_issue("t", "d").await.unwrap_err();
        assert_eq!(err, DomainError::Config(NOT_CONFIGURED.to_string()));
    }

    #[tokio::test]
    async fn test_first_team_is_used() {
        let fake = Arc::new(FakeTracker {
            teams: vec![team("ops"), team("growth")],
            ..Default::default()
        });
        let exporter = IssueExporter::new(fake.clone());

        let issue = exporter.create_issue("Portal", "desc").await.unwrap();

        assert_eq!(issue.identifier, "RIA-1");
        assert_eq!(*fake.created.lock().unwrap(), vec![("ops".to_string(), "Portal".to_string())]);
    }

    #[tokio::test]
    async fn test_no_teams_is_setup_error() {
        let exporter = IssueExporter::new(Arc::new(FakeTracker::default()));
        let err = exporter.create_issue("t", "d").await.unwrap_err();
        assert_eq!(err, DomainError::Setup(NO_TEAMS.to_string()));
    }

    #[tokio::test]
    async fn test_linear_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_eq("authorization", "lin_api_test"))
            .and(body_string_contains("viewer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "viewer": { "teams": { "nodes": [{ "id": "team-1", "name": "Advisory" }] } } }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("issueCreate"))
            .and(body_string_contains("team-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issueCreate": { "success": true, "issue": {
                    "id": "abc", "identifier": "ADV-7", "title": "Portal", "url": "https://linear.app/x/ADV-7"
                } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = TrackerConfig {
            api_key: Some("lin_api_test".to_string()),
            api_url: format!("{}/graphql", server.uri()),
        };
        let exporter = IssueExporter::from_config(&config).unwrap();
        let issue = exporter.create_issue("Portal", "body").await.unwrap();

        assert_eq!(issue.identifier, "ADV-7");
        assert_eq!(issue.url.as_deref(), Some("https://linear.app/x/ADV-7"));
    }

    #[tokio::test]
    async fn test_graphql_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Authentication required" }]
            })))
            .mount(&server)
            .await;

        let tracker = LinearTracker::new("bad", &server.uri()).unwrap();
        let err = tracker.teams().await.unwrap_err();
        assert_eq!(err, DomainError::remote("Authentication required"));
    }
}
