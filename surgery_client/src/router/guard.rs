use crate::api::AuthApi;
use crate::config::APP_NAME;
use crate::store::AuthPartition;

use super::routes::{ResolvedRoute, RouteMeta};
use super::LOGIN_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

pub fn document_title(meta: &RouteMeta) -> String {
    match meta.title {
        Some(title) => format!("{title} - {APP_NAME}"),
        None => APP_NAME.to_string(),
    }
}

/// Decides whether `to` may be entered with the current session.
///
/// Public routes always proceed. Protected ones need a stored token; a missing
/// user is restored from storage when possible and fetched otherwise. Role
/// mismatches and the bare root send the user to their landing page.
pub async fn before_each<A: AuthApi + ?Sized>(
    to: &ResolvedRoute,
    auth: &mut AuthPartition,
    api: &A,
) -> GuardDecision {
    auth.drop_if_expired();

    if !to.meta.requires_auth {
        return GuardDecision::Proceed;
    }

    if auth.session().token().is_none() {
        tracing::debug!(path = %to.path, "no stored token, redirecting to login");
        return GuardDecision::Redirect(LOGIN_PATH);
    }

    if auth.user().is_none()
        && !auth.hydrate_from_storage()
        && !auth.fetch_current_user(api).await.is_success()
    {
        return GuardDecision::Redirect(LOGIN_PATH);
    }

    let Some(role) = auth.role() else {
        return GuardDecision::Proceed;
    };

    if !to.meta.admits(role) {
        tracing::debug!(path = %to.path, %role, "role not admitted");
        return GuardDecision::Redirect(role.landing_path());
    }

    if to.path == "/" {
        return GuardDecision::Redirect(role.landing_path());
    }

    GuardDecision::Proceed
}
