use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use super::{
    claims::decode_unverified,
    dto::{User, UserUpdate},
};

/// Client-held authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            access_token: None,
            is_loading: true,
            is_authenticated: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        if self.is_loading {
            SessionStatus::Loading
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    /// The signed-in user's id, from the cached profile or else the token subject.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id).or_else(|| {
            self.access_token
                .as_deref()
                .and_then(|t| decode_unverified(t).ok())
                .and_then(|claims| claims.user_id())
        })
    }
}

/// Shared, observable session. Clones point at the same state; views
/// subscribe to re-render on change. Mutation goes through the auth
/// operations only.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.tx.borrow().status()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().access_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub(crate) fn set_token(&self, token: String) {
        self.tx.send_modify(|s| {
            s.access_token = Some(token);
            s.is_authenticated = true;
            s.is_loading = false;
        });
    }

    pub(crate) fn set_user(&self, user: User) {
        self.tx.send_modify(|s| s.user = Some(user));
    }

    /// Merges into the cached user; a no-op when nothing is cached.
    pub(crate) fn merge_user(&self, update: &UserUpdate) {
        self.tx.send_if_modified(|s| match s.user.as_mut() {
            Some(user) => {
                user.merge(update);
                true
            }
            None => false,
        });
    }

    pub(crate) fn finish_loading(&self) {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(Session {
            user: None,
            access_token: None,
            is_loading: false,
            is_authenticated: false,
        });
    }
}
