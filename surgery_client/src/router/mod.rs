//! Route table, navigation guard and the handle the API client uses to force
//! a navigation.

mod guard;
mod routes;

pub use guard::{before_each, document_title, GuardDecision};
pub use routes::{normalize_path, resolve, ResolvedRoute, Route, RouteMeta, View, NOT_FOUND, ROUTES};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::api::AuthApi;
use crate::config::APP_NAME;
use crate::store::AuthPartition;

pub const LOGIN_PATH: &str = "/login";

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("navigation to {path} redirected more than {hops} times")]
    RedirectLoop { path: String, hops: usize },
}

/// Cloneable handle that queues navigation requests for a [`Router`].
#[derive(Clone, Debug)]
pub struct Navigator {
    tx: UnboundedSender<String>,
}

impl Navigator {
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn push(&self, path: &str) {
        if self.tx.send(path.to_string()).is_err() {
            tracing::debug!(path, "router dropped, navigation request ignored");
        }
    }
}

#[derive(Debug)]
pub struct Router {
    current: Option<ResolvedRoute>,
    title: String,
    navigator: Navigator,
    forced: UnboundedReceiver<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let (navigator, forced) = Navigator::channel();
        Self {
            current: None,
            title: APP_NAME.to_string(),
            navigator,
            forced,
        }
    }

    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    pub fn current(&self) -> Option<&ResolvedRoute> {
        self.current.as_ref()
    }

    pub fn document_title(&self) -> &str {
        &self.title
    }

    /// Runs the guard for `path` and follows its redirects until a route is
    /// entered.
    pub async fn navigate<A: AuthApi + ?Sized>(
        &mut self,
        path: &str,
        auth: &mut AuthPartition,
        api: &A,
    ) -> Result<ResolvedRoute, NavigationError> {
        let mut target = resolve(path);

        for _ in 0..=MAX_REDIRECTS {
            self.title = document_title(&target.meta);

            match before_each(&target, auth, api).await {
                GuardDecision::Proceed => {
                    tracing::debug!(path = %target.path, view = ?target.view, "entered route");
                    self.current = Some(target.clone());
                    return Ok(target);
                }
                GuardDecision::Redirect(next) => {
                    tracing::debug!(from = %target.path, to = next, "redirected");
                    target = resolve(next);
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: path.to_string(),
            hops: MAX_REDIRECTS,
        })
    }

    /// Performs the most recent navigation queued through the [`Navigator`].
    /// Returns `None` when nothing was queued.
    pub async fn apply_forced_navigation<A: AuthApi + ?Sized>(
        &mut self,
        auth: &mut AuthPartition,
        api: &A,
    ) -> Result<Option<ResolvedRoute>, NavigationError> {
        let mut latest = None;
        loop {
            match self.forced.try_recv() {
                Ok(path) => latest = Some(path),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let Some(path) = latest else {
            return Ok(None);
        };
        auth.drop_if_expired();
        self.navigate(&path, auth, api).await.map(Some)
    }
}
