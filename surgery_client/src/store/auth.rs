use crate::api::AuthApi;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, Role, User,
};
use crate::storage::SessionStorage;

use super::ActionResult;

/// Session state. Mutations write through to [`SessionStorage`] so the token
/// and user survive a restart.
#[derive(Debug)]
pub struct AuthPartition {
    token: Option<String>,
    user: Option<User>,
    is_authenticated: bool,
    session: SessionStorage,
}

impl AuthPartition {
    pub fn from_storage(session: SessionStorage) -> Self {
        let token = session.token();
        Self {
            is_authenticated: token.is_some(),
            user: session.user(),
            token,
            session,
        }
    }

    pub fn session(&self) -> &SessionStorage {
        &self.session
    }

    // getters

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn is_patient(&self) -> bool {
        self.has_role(Role::Patient)
    }

    pub fn is_doctor(&self) -> bool {
        self.has_role(Role::Doctor)
    }

    pub fn is_nurse(&self) -> bool {
        self.has_role(Role::Nurse)
    }

    pub fn is_anesthesiologist(&self) -> bool {
        self.has_role(Role::Anesthesiologist)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    // mutations

    pub fn set_token(&mut self, token: Option<String>) {
        if let Err(err) = self.session.set_token(token.as_deref()) {
            tracing::warn!(error = %err, "failed to persist token");
        }
        self.is_authenticated = token.is_some();
        self.token = token;
    }

    pub fn set_user(&mut self, user: Option<User>) {
        if let Err(err) = self.session.set_user(user.as_ref()) {
            tracing::warn!(error = %err, "failed to persist user record");
        }
        self.user = user;
    }

    pub fn clear_auth(&mut self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
    }

    /// Loads the persisted user and token into memory without a network call.
    /// Returns false when storage does not hold both.
    pub fn hydrate_from_storage(&mut self) -> bool {
        match (self.session.user(), self.session.token()) {
            (Some(user), Some(token)) => {
                self.set_user(Some(user));
                self.set_token(Some(token));
                true
            }
            _ => false,
        }
    }

    /// Forgets the in-memory session once storage lost its token, which is
    /// what the API client does on a 401.
    pub fn drop_if_expired(&mut self) -> bool {
        if self.token.is_none() || self.session.token().is_some() {
            return false;
        }
        tracing::debug!("stored token is gone, dropping in-memory session");
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
        true
    }

    // actions

    pub async fn login<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        credentials: &LoginRequest,
    ) -> ActionResult<LoginResponse> {
        match api.login(credentials).await {
            Ok(response) => {
                self.commit_login(&response);
                ActionResult::ok(response)
            }
            Err(err) => ActionResult::from_error("auth/login", &err, "Login failed"),
        }
    }

    pub async fn admin_login<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        credentials: &LoginRequest,
    ) -> ActionResult<LoginResponse> {
        match api.admin_login(credentials).await {
            Ok(response) => {
                self.commit_login(&response);
                ActionResult::ok(response)
            }
            Err(err) => ActionResult::from_error("auth/adminLogin", &err, "Administrator login failed"),
        }
    }

    fn commit_login(&mut self, response: &LoginResponse) {
        self.set_token(Some(response.token.clone()));
        self.set_user(Some(response.user.clone()));
        tracing::info!(username = %response.user.username, role = %response.user.role, "logged in");
    }

    pub async fn register<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        user: &RegisterRequest,
    ) -> ActionResult<RegisterResponse> {
        match api.register(user).await {
            Ok(response) => ActionResult::ok(response),
            Err(err) => ActionResult::from_error("auth/register", &err, "Registration failed"),
        }
    }

    /// Refreshes the user from the backend. Any failure drops the session and
    /// yields a failure without a message.
    pub async fn fetch_current_user<A: AuthApi + ?Sized>(&mut self, api: &A) -> ActionResult<User> {
        match api.current_user().await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                ActionResult::ok(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load current user");
                self.clear_auth();
                ActionResult {
                    success: false,
                    data: None,
                    message: None,
                }
            }
        }
    }

    /// Notifies the backend, then drops the local session whatever it answered.
    pub async fn logout<A: AuthApi + ?Sized>(&mut self, api: &A) -> ActionResult<()> {
        if let Err(err) = api.logout().await {
            tracing::warn!(error = %err, "logout call failed, clearing session anyway");
        }
        self.clear_auth();
        ActionResult::done()
    }

    pub async fn change_password<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        passwords: &ChangePasswordRequest,
    ) -> ActionResult<MessageResponse> {
        match api.change_password(passwords).await {
            Ok(response) => ActionResult::ok(response),
            Err(err) => {
                ActionResult::from_error("auth/changePassword", &err, "Failed to change password")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_user, StubAuth};

    fn credentials() -> LoginRequest {
        LoginRequest {
            username: "doc".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn rejected_login_leaves_session_untouched() {
        let session = SessionStorage::in_memory();
        let previous = sample_user(1, Role::Nurse);
        session.set_token(Some("old-token")).unwrap();
        session.set_user(Some(&previous)).unwrap();

        let mut auth = AuthPartition::from_storage(session.clone());
        let api = StubAuth::rejecting("Invalid username or password");

        let result = auth.login(&api, &credentials()).await;

        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Invalid username or password"));
        assert!(result.data.is_none());
        assert_eq!(session.token().as_deref(), Some("old-token"));
        assert_eq!(session.user(), Some(previous.clone()));
        assert_eq!(auth.user(), Some(&previous));
    }

    #[tokio::test]
    async fn rejected_login_without_backend_message_uses_fallback() {
        let mut auth = AuthPartition::from_storage(SessionStorage::in_memory());
        let api = StubAuth::default();

        let result = auth.login(&api, &credentials()).await;
        assert_eq!(result.message.as_deref(), Some("Login failed"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn successful_login_persists_token_and_user() {
        let session = SessionStorage::in_memory();
        let mut auth = AuthPartition::from_storage(session.clone());
        let doctor = sample_user(5, Role::Doctor);
        let api = StubAuth::accepting(doctor.clone());

        let result = auth.login(&api, &credentials()).await;

        assert!(result.success);
        assert_eq!(api.last_login.lock().unwrap().as_deref(), Some("doc"));
        assert!(auth.is_authenticated());
        assert!(auth.is_doctor());
        assert!(!auth.is_patient());
        assert_eq!(session.token().as_deref(), Some("token-for-user5"));
        assert_eq!(session.user(), Some(doctor));
    }

    #[tokio::test]
    async fn failed_user_refresh_clears_session() {
        let session = SessionStorage::in_memory();
        session.set_token(Some("stale")).unwrap();
        let mut auth = AuthPartition::from_storage(session.clone());

        let result = auth.fetch_current_user(&StubAuth::default()).await;

        assert!(!result.success);
        assert!(result.message.is_none());
        assert!(!auth.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let session = SessionStorage::in_memory();
        let mut auth = AuthPartition::from_storage(session.clone());
        auth.set_token(Some("t".into()));
        auth.set_user(Some(sample_user(2, Role::Admin)));

        let api = StubAuth {
            logout_fails: true,
            ..StubAuth::default()
        };
        let result = auth.logout(&api).await;

        assert!(result.success);
        assert_eq!(api.calls(), 1);
        assert!(auth.user().is_none());
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
    }

    #[tokio::test]
    async fn register_does_not_log_in() {
        let mut auth = AuthPartition::from_storage(SessionStorage::in_memory());
        let request = RegisterRequest {
            username: "newbie".into(),
            password: "pw".into(),
            email: "newbie@hospital.test".into(),
            real_name: "New Bie".into(),
            ..RegisterRequest::default()
        };

        let result = auth.register(&StubAuth::default(), &request).await;

        assert!(result.success);
        assert_eq!(result.data.map(|r| r.user.username), Some("newbie".to_string()));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn hydration_needs_both_keys() {
        let session = SessionStorage::in_memory();
        session.set_user(Some(&sample_user(4, Role::Patient))).unwrap();

        let mut auth = AuthPartition::from_storage(session.clone());
        auth.user = None;
        assert!(!auth.hydrate_from_storage());

        session.set_token(Some("tok")).unwrap();
        assert!(auth.hydrate_from_storage());
        assert!(auth.is_patient());
        assert_eq!(auth.token(), Some("tok"));
    }

    #[test]
    fn expired_storage_drops_memory_state() {
        let session = SessionStorage::in_memory();
        let mut auth = AuthPartition::from_storage(session.clone());
        auth.set_token(Some("t".into()));
        auth.set_user(Some(sample_user(3, Role::Nurse)));
        assert!(!auth.drop_if_expired());

        session.clear().unwrap();
        assert!(auth.drop_if_expired());
        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
    }
}
