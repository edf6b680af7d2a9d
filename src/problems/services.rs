use tracing::{instrument, warn};

use super::dto::Problem;
use crate::{
    api::{endpoints, ApiClient, ApiRequest, ApiResponse},
    auth::SessionStore,
};

#[derive(Debug, Clone)]
pub struct ProblemsService {
    client: ApiClient,
    session: SessionStore,
}

impl ProblemsService {
    pub fn new(client: ApiClient, session: SessionStore) -> Self {
        Self { client, session }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResponse<Vec<Problem>> {
        let token = self.session.access_token();
        let response = self
            .client
            .request(ApiRequest::get(endpoints::problems::ALL).bearer(token.as_deref()))
            .await;
        if !response.success {
            warn!(status = response.status, message = %response.message, "failed to list problems");
        }
        response
    }

    #[instrument(skip(self))]
    pub async fn get(&self, problem_id: &str) -> ApiResponse<Problem> {
        let token = self.session.access_token();
        let response = self
            .client
            .request(ApiRequest::get(endpoints::problems::id(problem_id)).bearer(token.as_deref()))
            .await;
        if !response.success {
            warn!(%problem_id, status = response.status, "problem not found or access denied");
        }
        response
    }
}
