use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::dto::{CodeSubmission, Submission};
use crate::{
    api::{endpoints, ApiClient, ApiRequest, ApiResponse},
    auth::SessionStore,
    problems::Language,
};

/// Fixed-interval re-fetch settings for [`SubmissionsService::poll`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Latest response received.
    pub response: ApiResponse<Submission>,
    pub attempts: u32,
    /// Whether the submission left `pending`.
    pub settled: bool,
    pub fetched_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct SubmissionsService {
    client: ApiClient,
    session: SessionStore,
}

impl SubmissionsService {
    pub fn new(client: ApiClient, session: SessionStore) -> Self {
        Self { client, session }
    }

    fn authorized(&self, request: ApiRequest) -> ApiRequest {
        let token = self.session.access_token();
        request.bearer(token.as_deref())
    }

    #[instrument(skip(self, submission), fields(problem_id = %submission.problem_id, language = %submission.language))]
    pub async fn create(&self, submission: &CodeSubmission) -> ApiResponse<Value> {
        let response = self
            .client
            .request(self.authorized(ApiRequest::post(endpoints::submissions::ALL).json(submission)))
            .await;
        if response.success {
            info!("code submitted");
        } else {
            warn!(status = response.status, message = %response.message, "failed to submit code");
        }
        response
    }

    /// Submits on behalf of the signed-in user.
    pub async fn create_for_session(
        &self,
        problem_id: &str,
        language: Language,
        code: &str,
    ) -> ApiResponse<Value> {
        let Some(user_id) = self.session.snapshot().user_id() else {
            warn!(%problem_id, "submission attempted without a signed-in user");
            return ApiResponse::rejected(StatusCode::UNAUTHORIZED, "Authentication required");
        };
        self.create(&CodeSubmission {
            problem_id: problem_id.to_string(),
            user_id,
            language,
            code: code.to_string(),
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResponse<Vec<Submission>> {
        self.client
            .request(self.authorized(ApiRequest::get(endpoints::submissions::ALL)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, submission_id: &str) -> ApiResponse<Submission> {
        self.client
            .request(self.authorized(ApiRequest::get(endpoints::submissions::id(submission_id))))
            .await
    }

    /// Feedback text for a settled submission.
    #[instrument(skip(self))]
    pub async fn ai_feedback(&self, submission_id: &str) -> ApiResponse<String> {
        let response = self
            .client
            .request(self.authorized(ApiRequest::get(endpoints::submissions::ai(submission_id))))
            .await;
        if !response.success {
            warn!(status = response.status, message = %response.message, "failed to retrieve feedback");
        }
        response
    }

    /// Re-fetches until the submission settles, a request fails, or
    /// `max_attempts` fetches have been made. At least one fetch is made.
    #[instrument(skip(self, config), fields(interval_ms = config.interval.as_millis() as u64, max_attempts = config.max_attempts))]
    pub async fn poll(&self, submission_id: &str, config: PollConfig) -> PollOutcome {
        let max_attempts = config.max_attempts.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let response = self.get(submission_id).await;
            let fetched_at = OffsetDateTime::now_utc();
            let settled = response.data.as_ref().is_some_and(Submission::is_settled);

            if !response.success || settled || attempts >= max_attempts {
                if settled {
                    debug!(attempts, "submission settled");
                } else if response.success {
                    warn!(attempts, "submission still pending after last attempt");
                }
                return PollOutcome {
                    response,
                    attempts,
                    settled,
                    fetched_at,
                };
            }
            tokio::time::sleep(config.interval).await;
        }
    }
}
