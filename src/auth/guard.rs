use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info};

use super::{
    services::AuthService,
    session::{Session, SessionStatus},
};
use crate::{
    config::GuardConfig,
    navigation::{Navigator, Notice, LOGIN_ROUTE},
};

/// What a protected view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; show a spinner and nothing protected.
    Placeholder,
    Redirect { to: String, notice: Notice },
    Render,
}

fn decide(session: &Session) -> GuardDecision {
    match session.status() {
        SessionStatus::Loading => GuardDecision::Placeholder,
        SessionStatus::Authenticated => GuardDecision::Render,
        SessionStatus::Unauthenticated => GuardDecision::Redirect {
            to: LOGIN_ROUTE.to_string(),
            notice: Notice::authentication_required(),
        },
    }
}

/// Gate in front of every authenticated view.
#[derive(Clone)]
pub struct RouteGuard {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>, config: GuardConfig) -> Self {
        Self {
            auth,
            navigator,
            config,
        }
    }

    /// Decision for the current session, without waiting or side effects.
    pub fn evaluate(&self) -> GuardDecision {
        decide(&self.auth.session().snapshot())
    }

    /// Waits out `Loading` (restoring the session itself if nothing else
    /// resolves it within `loading_wait`), tries one silent refresh if the
    /// session is unauthenticated, then decides. A redirect is also handed
    /// to the navigator, exactly once per call.
    pub async fn enter(&self, path: &str) -> GuardDecision {
        let session = self.auth.session();
        let mut rx = session.subscribe();
        let resolved = timeout(self.config.loading_wait, rx.wait_for(|s| !s.is_loading))
            .await
            .is_ok_and(|r| r.is_ok());

        let mut refreshed = false;
        if !resolved {
            debug!(%path, "session still loading; restoring");
            self.auth.restore().await;
            refreshed = true;
        }

        if self.config.silent_refresh
            && !refreshed
            && session.status() == SessionStatus::Unauthenticated
        {
            debug!(%path, "attempting silent refresh");
            if self.auth.refresh().await.success {
                // Give observers a moment to see the refreshed state.
                let _ = timeout(
                    self.config.refresh_grace,
                    rx.wait_for(|s| s.is_authenticated),
                )
                .await;
            }
        }

        let decision = self.evaluate();
        if let GuardDecision::Redirect { to, notice } = &decision {
            info!(%path, "unauthenticated; redirecting to login");
            self.navigator.navigate(to, Some(notice.clone()));
        }
        decision
    }
}
