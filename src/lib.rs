//! OpenJudge web client: the gateway contract layer used by the SPA views
//! and the static host that serves the built bundle.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod navigation;
pub mod problems;
pub mod state;
pub mod submissions;

#[cfg(test)]
pub(crate) mod test_support;
