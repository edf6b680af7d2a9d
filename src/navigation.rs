use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

pub const LOGIN_ROUTE: &str = "/login";

/// Transient message the view layer shows after a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn authentication_required() -> Self {
        Self::new("Authentication Required", "Please sign in to access this page")
    }

    pub fn session_expired() -> Self {
        Self::new("Session Expired", "Please sign in again")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub notice: Option<Notice>,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, notice: Option<Notice>);
}

/// Current location as a watch channel; the view layer follows it.
#[derive(Debug, Clone)]
pub struct History {
    tx: Arc<watch::Sender<Location>>,
}

impl History {
    pub fn new(initial: &str) -> Self {
        let (tx, _rx) = watch::channel(Location {
            path: initial.to_string(),
            notice: None,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Location {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.tx.subscribe()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str, notice: Option<Notice>) {
        info!(%path, notice = ?notice.as_ref().map(|n| n.title.as_str()), "navigate");
        self.tx.send_replace(Location {
            path: path.to_string(),
            notice,
        });
    }
}
