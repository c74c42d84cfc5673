use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

use crate::models::auth::requests::{LinkAccountRequest, LoginRequest, RegisterRequest};
use crate::models::auth::responses::{LoginResponse, TokenClaims};
use crate::models::user::{UserProfile, ADMIN_ROLE};
use crate::repositories::api_client::UnauthorizedHandler;
use crate::repositories::auth_repository::AuthRepository;
use crate::repositories::errors::api_client_errors::ApiClientError;
use crate::repositories::linking_repository::LinkingRepository;
use crate::repositories::profile_repository::ProfileRepository;
use crate::repositories::storage::TokenStore;
use crate::services::context::ContextRefresh;
use crate::services::errors::session_service_errors::SessionError;
use crate::services::navigation::{is_admin_route, is_public_route, Navigator, Route};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub claims: Option<TokenClaims>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Reads the claims of a backend token.
///
/// The client has no access to the signing key, so only the structure is
/// checked here; expiry is left to [`is_expired`].
pub fn decode_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            debug!("Token could not be decoded: {}", e);
            SessionError::InvalidToken
        })
}

pub fn is_expired(claims: &TokenClaims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}

pub fn is_authenticated(state: &SessionState) -> bool {
    let token_valid = state
        .claims
        .as_ref()
        .map_or(false, |claims| !is_expired(claims, Utc::now()));
    state.token.is_some() && token_valid && state.profile.is_some()
}

pub fn is_admin(state: &SessionState) -> bool {
    if !is_authenticated(state) {
        return false;
    }
    let profile_admin = state.profile.as_ref().map_or(false, UserProfile::is_admin);
    let claim_admin = state
        .claims
        .as_ref()
        .and_then(|claims| claims.role.as_deref())
        .map_or(false, |role| role.eq_ignore_ascii_case(ADMIN_ROLE));
    profile_admin || claim_admin
}

pub fn is_linked(state: &SessionState) -> bool {
    state
        .profile
        .as_ref()
        .map_or(false, |profile| profile.household_members.len() > 1)
}

/// A token without a household claim is scoped to the personal household.
pub fn is_personal_dashboard(state: &SessionState) -> bool {
    let Some(profile) = state.profile.as_ref() else {
        return false;
    };
    match state
        .claims
        .as_ref()
        .and_then(|claims| claims.household_id.as_deref())
    {
        Some(household_id) => household_id == profile.personal_household_id,
        None => true,
    }
}

pub fn can_toggle_dashboard(state: &SessionState) -> bool {
    is_linked(state)
        && state
            .profile
            .as_ref()
            .map_or(false, |profile| profile.shared_household_id.is_some())
}

fn login_error_message(err: &ApiClientError) -> String {
    match err {
        ApiClientError::Unauthorized => "Invalid email or password.".to_string(),
        ApiClientError::Transport(_) => {
            "Could not reach the server. Please try again.".to_string()
        }
        ApiClientError::Status { status, .. } if *status == 400 || *status == 404 => {
            "Invalid email or password.".to_string()
        }
        other => other.user_message(),
    }
}

/// Owns the authentication token and the profile of the signed-in user.
pub struct SessionManager {
    auth_repository: Arc<dyn AuthRepository>,
    profile_repository: Arc<dyn ProfileRepository>,
    linking_repository: Arc<dyn LinkingRepository>,
    token_store: TokenStore,
    navigator: Arc<dyn Navigator>,
    dependents: RwLock<Vec<Arc<dyn ContextRefresh>>>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(
        auth_repository: Arc<dyn AuthRepository>,
        profile_repository: Arc<dyn ProfileRepository>,
        linking_repository: Arc<dyn LinkingRepository>,
        token_store: TokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        SessionManager {
            auth_repository,
            profile_repository,
            linking_repository,
            token_store,
            navigator,
            dependents: RwLock::new(Vec::new()),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Registers a store that must follow household context changes.
    pub fn register_dependent(&self, dependent: Arc<dyn ContextRefresh>) {
        self.dependents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dependent);
    }

    pub fn state(&self) -> SessionState {
        self.with_state(|state| state.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn set_error(&self, message: String) {
        self.with_state(|state| {
            state.loading = false;
            state.error = Some(message);
        });
    }

    fn dependents(&self) -> Vec<Arc<dyn ContextRefresh>> {
        self.dependents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_state(|state| is_authenticated(state))
    }

    pub fn is_admin(&self) -> bool {
        self.with_state(|state| is_admin(state))
    }

    pub fn is_linked(&self) -> bool {
        self.with_state(|state| is_linked(state))
    }

    pub fn is_personal_dashboard(&self) -> bool {
        self.with_state(|state| is_personal_dashboard(state))
    }

    pub fn can_toggle_dashboard(&self) -> bool {
        self.with_state(|state| can_toggle_dashboard(state))
    }

    /// Restores the persisted session, if it is still valid.
    pub async fn initialize(&self) {
        let skip = self.with_state(|state| is_authenticated(state) || state.loading);
        if skip {
            return;
        }

        let token = match self.token_store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.with_state(|state| *state = SessionState::default());
                return;
            }
            Err(e) => {
                warn!("Could not read persisted token: {}", e);
                self.discard_session();
                return;
            }
        };

        let claims = match decode_claims(&token) {
            Ok(claims) if !is_expired(&claims, Utc::now()) => claims,
            Ok(_) => {
                info!("Persisted token has expired, discarding session");
                self.discard_session();
                return;
            }
            Err(_) => {
                warn!("Persisted token is not a valid JWT, discarding session");
                self.discard_session();
                return;
            }
        };

        self.with_state(|state| {
            state.token = Some(token);
            state.claims = Some(claims);
            state.loading = true;
            state.error = None;
        });

        match self.profile_repository.get_profile().await {
            Ok(profile) => {
                debug!("Restored session for user {}", profile.id);
                self.with_state(|state| {
                    state.profile = Some(profile);
                    state.loading = false;
                });
            }
            Err(e) => {
                error!("Failed to load profile for persisted session: {}", e);
                // a 401 has already gone through on_unauthorized
                if self.has_open_session() {
                    self.logout();
                }
            }
        }
    }

    /// Never fails to the caller; the reason is left in the state's `error`.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        if email.trim().is_empty() || password.is_empty() {
            self.set_error("Email or password cannot be empty".to_string());
            return false;
        }

        self.with_state(|state| {
            state.loading = true;
            state.error = None;
        });

        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = match self.auth_repository.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                error!("Login failed for {}: {}", credentials.email, e);
                self.set_error(login_error_message(&e));
                return false;
            }
        };

        match self.establish(response.token).await {
            Ok(()) => {
                info!("User {} logged in", credentials.email);
                self.navigator.navigate(Route::Dashboard);
                true
            }
            Err(e) => {
                error!("Could not establish session for {}: {}", credentials.email, e);
                if self.has_open_session() {
                    self.discard_session();
                }
                self.set_error(format!("Login failed: {}", e));
                false
            }
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> bool {
        self.with_state(|state| {
            state.loading = true;
            state.error = None;
        });

        let data = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.auth_repository.register(&data).await {
            Ok(()) => {
                info!("Registered user {}", data.email);
                self.with_state(|state| state.loading = false);
                self.navigator.navigate(Route::Login);
                true
            }
            Err(e) => {
                error!("Registration failed for {}: {}", data.email, e);
                let message = match &e {
                    ApiClientError::Status { message, .. } => message.clone(),
                    ApiClientError::Validation { .. } => e.user_message(),
                    _ => "Failed to register user.".to_string(),
                };
                self.set_error(message);
                false
            }
        }
    }

    pub fn logout(&self) {
        self.discard_session();
        info!("Session closed");
        self.navigator.navigate(Route::Login);
    }

    fn has_open_session(&self) -> bool {
        self.with_state(|state| state.token.is_some())
    }

    /// Drops token, claims and profile together so no partial session remains.
    fn discard_session(&self) {
        if let Err(e) = self.token_store.clear() {
            warn!("Failed to clear persisted token: {}", e);
        }
        self.with_state(|state| *state = SessionState::default());
        for dependent in self.dependents() {
            dependent.reset();
        }
    }

    /// Persists the token and loads the profile it belongs to.
    async fn establish(&self, token: String) -> Result<(), SessionError> {
        let claims = decode_claims(&token)?;
        if is_expired(&claims, Utc::now()) {
            return Err(SessionError::ExpiredToken);
        }

        // the gateway reads the bearer token from storage
        self.token_store.save(&token)?;
        self.with_state(|state| {
            state.token = Some(token);
            state.claims = Some(claims);
            state.loading = true;
        });

        let profile = self.profile_repository.get_profile().await?;
        self.with_state(|state| {
            state.profile = Some(profile);
            state.loading = false;
            state.error = None;
        });
        Ok(())
    }

    pub async fn link_account(&self, code: &str) -> Result<(), SessionError> {
        if code.trim().is_empty() {
            return Err(SessionError::ValidationError(
                "Invite code cannot be empty".to_string(),
            ));
        }
        let request = LinkAccountRequest {
            invite_code: code.trim().to_string(),
        };
        self.ensure_authenticated()?;
        let result = self.linking_repository.link_account(&request).await;
        self.apply_context_change("link account", result).await
    }

    pub async fn unlink_account(&self) -> Result<(), SessionError> {
        self.ensure_authenticated()?;
        let result = self.linking_repository.unlink_account().await;
        self.apply_context_change("unlink account", result).await
    }

    pub async fn toggle_dashboard_context(&self) -> Result<(), SessionError> {
        self.ensure_authenticated()?;
        let result = self.linking_repository.toggle_dashboard().await;
        self.apply_context_change("toggle dashboard", result).await
    }

    fn ensure_authenticated(&self) -> Result<(), SessionError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    async fn apply_context_change(
        &self,
        action: &str,
        result: Result<LoginResponse, ApiClientError>,
    ) -> Result<(), SessionError> {
        let response = result.map_err(|e| {
            error!("Failed to {}: {}", action, e);
            self.set_error(e.user_message());
            SessionError::from(e)
        })?;

        if let Err(e) = self.establish(response.token).await {
            error!("Failed to apply new session after {}: {}", action, e);
            self.set_error(e.to_string());
            return Err(e);
        }

        // cached ledgers still hold the previous household's data
        for dependent in self.dependents() {
            dependent.refresh_context().await;
        }
        info!("Household context updated after {}", action);
        Ok(())
    }

    /// Decides where a navigation to `path` must be redirected, if anywhere.
    pub async fn guard_route(&self, path: &str) -> Option<Route> {
        self.initialize().await;

        let state = self.state();
        let authenticated = is_authenticated(&state);

        if !authenticated && !is_public_route(path) {
            return Some(Route::Login);
        }
        if authenticated && !is_admin(&state) && is_admin_route(path) {
            return Some(Route::Dashboard);
        }
        if authenticated && is_public_route(path) {
            return Some(Route::Dashboard);
        }
        None
    }
}

impl UnauthorizedHandler for SessionManager {
    fn on_unauthorized(&self) {
        self.logout();
    }
}
