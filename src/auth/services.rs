use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{
        ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
        TokenResponse, User, UserUpdate,
    },
    session::SessionStore,
};
use crate::api::{endpoints, ApiClient, ApiRequest, ApiResponse};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_email<T>() -> ApiResponse<T> {
    ApiResponse::rejected(StatusCode::BAD_REQUEST, "Invalid email")
}

/// Named session operations. Each returns the envelope of the underlying
/// call and updates the session only on success.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    session: SessionStore,
}

impl AuthService {
    pub fn new(client: ApiClient, session: SessionStore) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Caches the access token. The profile is not fetched; call
    /// [`AuthService::get_profile`] when the view needs it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<TokenResponse> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            warn!(%email, "invalid email");
            return invalid_email();
        }

        let response: ApiResponse<TokenResponse> = self
            .client
            .request(ApiRequest::post(endpoints::auth::LOGIN).json(&LoginRequest {
                email: email.clone(),
                password: password.to_string(),
            }))
            .await;

        match response.data.as_ref().and_then(|d| d.access_token.clone()) {
            Some(token) => {
                self.session.set_token(token);
                info!(%email, "user logged in");
            }
            None if response.success => warn!(%email, "login succeeded without an access token"),
            None => warn!(%email, status = response.status, message = %response.message, "login failed"),
        }
        response
    }

    /// Creates an account. Accounts normally need email verification first,
    /// so the session only changes if the gateway hands back a token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> ApiResponse<TokenResponse> {
        request.email = normalize_email(&request.email);
        if !is_valid_email(&request.email) {
            warn!("invalid email");
            return invalid_email();
        }

        let response: ApiResponse<TokenResponse> = self
            .client
            .request(ApiRequest::post(endpoints::auth::REGISTER).json(&request))
            .await;

        if let Some(token) = response.data.as_ref().and_then(|d| d.access_token.clone()) {
            self.session.set_token(token);
            info!("user registered and signed in");
        } else if response.success {
            info!("user registered; awaiting verification");
        } else {
            warn!(status = response.status, message = %response.message, "registration failed");
        }
        response
    }

    /// Best-effort server logout; the local session is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ApiResponse<Value> {
        let token = self.session.access_token();
        let response = self
            .client
            .request(ApiRequest::post(endpoints::auth::LOGOUT).bearer(token.as_deref()))
            .await;

        if !response.success {
            warn!(status = response.status, message = %response.message, "server logout failed; clearing local session anyway");
        }
        self.session.clear();
        info!("user logged out");
        response
    }

    /// Trades the refresh cookie for a new access token.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ApiResponse<TokenResponse> {
        let response: ApiResponse<TokenResponse> = self
            .client
            .request(ApiRequest::post(endpoints::auth::REFRESH))
            .await;

        if let Some(token) = response.data.as_ref().and_then(|d| d.access_token.clone()) {
            self.session.set_token(token);
            debug!("access token refreshed");
        } else {
            debug!(status = response.status, "refresh rejected");
        }
        response
    }

    /// Resolves the initial `Loading` state with a silent refresh.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> ApiResponse<TokenResponse> {
        let response = self.refresh().await;
        self.session.finish_loading();
        response
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> ApiResponse<User> {
        let token = self.session.access_token();
        let response: ApiResponse<User> = self
            .client
            .request(ApiRequest::get(endpoints::auth::PROFILE).bearer(token.as_deref()))
            .await;

        if let Some(user) = &response.data {
            debug!(user_id = %user.id, "profile loaded");
            self.session.set_user(user.clone());
        }
        response
    }

    /// Sends a partial update and merges it into the cached user on success.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, update: UserUpdate) -> ApiResponse<Value> {
        if update.is_empty() {
            return ApiResponse::rejected(StatusCode::BAD_REQUEST, "No fields to update");
        }
        let token = self.session.access_token();
        let response = self
            .client
            .request(
                ApiRequest::post(endpoints::auth::PROFILE)
                    .bearer(token.as_deref())
                    .json(&update),
            )
            .await;

        if response.success {
            self.session.merge_user(&update);
            info!("profile updated");
        }
        response
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self) -> ApiResponse<Value> {
        let token = self.session.access_token();
        let response = self
            .client
            .request(ApiRequest::delete(endpoints::auth::PROFILE).bearer(token.as_deref()))
            .await;

        if response.success {
            self.session.clear();
            info!("account deleted");
        }
        response
    }

    /// The auth service reads the verification token from the query string.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> ApiResponse<Value> {
        self.client
            .request(ApiRequest::post(endpoints::auth::VERIFY_EMAIL).query("token", token))
            .await
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> ApiResponse<Value> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return invalid_email();
        }
        self.client
            .request(
                ApiRequest::post(endpoints::auth::FORGOT_PASSWORD)
                    .json(&ForgotPasswordRequest { email }),
            )
            .await
    }

    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> ApiResponse<Value> {
        self.client
            .request(
                ApiRequest::post(endpoints::auth::RESET_PASSWORD).json(&ResetPasswordRequest {
                    token: token.to_string(),
                    password: password.to_string(),
                }),
            )
            .await
    }
}
