use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};

use super::session::SessionStore;
use crate::{
    api::{ResponseContext, ResponseHook},
    navigation::{Navigator, Notice, LOGIN_ROUTE},
};

/// Global reaction to an expired session: a 401 on a call that carried a
/// bearer token clears the session and sends the user to the login view.
/// 401s on anonymous calls (a failed login, a refresh without cookie) are
/// left to the caller, as are 401s for a token that has since been replaced.
pub struct SessionExpiryHook {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionExpiryHook {
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ResponseHook for SessionExpiryHook {
    fn on_response(&self, ctx: &ResponseContext<'_>) {
        if ctx.status != StatusCode::UNAUTHORIZED {
            return;
        }
        let Some(sent) = ctx.bearer else {
            return;
        };
        if self.session.access_token().as_deref() != Some(sent) {
            debug!(endpoint = %ctx.endpoint, "401 for a superseded token; session kept");
            return;
        }
        warn!(endpoint = %ctx.endpoint, method = %ctx.method, "access token rejected; ending session");
        self.session.clear();
        self.navigator
            .navigate(LOGIN_ROUTE, Some(Notice::session_expired()));
    }
}
