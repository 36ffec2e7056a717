use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::{Deserialize, Serialize};

use crate::domain::pull_request::PullRequestRef;
use crate::error::{AppError, AppResult};
use crate::services::CodeHostService;

pub struct GithubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_url,
            token,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("GitHub token not configured".to_string()))
    }

    fn issue_labels_endpoint(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.api_url.trim_end_matches('/'),
            pr.owner,
            pr.repo,
            pr.number
        )
    }

    fn pull_endpoint(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url.trim_end_matches('/'),
            pr.owner,
            pr.repo,
            pr.number
        )
    }

    async fn check_status(response: reqwest::Response, context: &str) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(AppError::CodeHost(format!(
            "{context}: GitHub responded with {status}: {body}"
        )))
    }
}

#[async_trait]
impl CodeHostService for GithubClient {
    async fn add_labels(&self, pr: &PullRequestRef, labels: &[String]) -> AppResult<()> {
        let token = self.token()?;
        let response = self
            .http
            .post(self.issue_labels_endpoint(pr))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "prjira")
            .json(&AddLabelsRequest {
                labels: labels.to_vec(),
            })
            .send()
            .await
            .map_err(|err| {
                AppError::CodeHost(format!(
                    "failed to add labels {labels:?} to {pr}: {err}"
                ))
            })?;

        Self::check_status(response, &format!("adding labels {labels:?} to {pr}")).await?;
        Ok(())
    }

    async fn latest_description(&self, pr: &PullRequestRef) -> AppResult<String> {
        let token = self.token()?;
        let response = self
            .http
            .get(self.pull_endpoint(pr))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "prjira")
            .send()
            .await
            .map_err(|err| {
                AppError::CodeHost(format!("failed to fetch description of {pr}: {err}"))
            })?;

        let response =
            Self::check_status(response, &format!("fetching description of {pr}")).await?;
        let payload: PullResponse = response.json().await.map_err(|err| {
            AppError::CodeHost(format!("failed to parse pull request {pr}: {err}"))
        })?;
        Ok(payload.body.unwrap_or_default())
    }

    async fn update_description(&self, pr: &PullRequestRef, body: &str) -> AppResult<()> {
        let token = self.token()?;
        let response = self
            .http
            .patch(self.pull_endpoint(pr))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "prjira")
            .json(&UpdatePullRequest {
                body: body.to_string(),
            })
            .send()
            .await
            .map_err(|err| {
                AppError::CodeHost(format!("failed to update description of {pr}: {err}"))
            })?;

        Self::check_status(response, &format!("updating description of {pr}")).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct AddLabelsRequest {
    labels: Vec<String>,
}

#[derive(Serialize)]
struct UpdatePullRequest {
    body: String,
}

#[derive(Deserialize)]
struct PullResponse {
    body: Option<String>,
}
