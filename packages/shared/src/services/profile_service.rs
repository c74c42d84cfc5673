use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

use crate::models::user::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};
use crate::repositories::errors::api_client_errors::ApiClientError;
use crate::repositories::profile_repository::ProfileRepository;
use crate::services::errors::profile_service_errors::ProfileError;

const PROFILE_UPDATED: &str = "Profile updated successfully";
const PASSWORD_CHANGED: &str = "Password changed successfully";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub profile: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
}

/// Account page store: own profile, username and password changes.
pub struct ProfileStore {
    profile_repository: Arc<dyn ProfileRepository>,
    state: Mutex<ProfileState>,
}

impl ProfileStore {
    pub fn new(profile_repository: Arc<dyn ProfileRepository>) -> Self {
        ProfileStore {
            profile_repository,
            state: Mutex::new(ProfileState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProfileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ProfileState {
        self.lock().clone()
    }

    pub fn success_message(&self) -> Option<String> {
        self.lock().success_message.clone()
    }

    pub fn clear_messages(&self) {
        let mut state = self.lock();
        state.error = None;
        state.success_message = None;
    }

    fn begin(&self) {
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
        state.success_message = None;
    }

    fn fail(&self, message: String, err: &ApiClientError) {
        error!("{}: {}", message, err);
        let mut state = self.lock();
        state.loading = false;
        state.error = Some(message);
    }

    pub async fn fetch_profile(&self) {
        self.begin();
        match self.profile_repository.get_profile().await {
            Ok(profile) => {
                let mut state = self.lock();
                state.loading = false;
                state.profile = Some(profile);
            }
            Err(e) => self.fail("Failed to load profile".to_string(), &e),
        }
    }

    pub async fn update_profile(&self, username: &str) -> Result<(), ProfileError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        self.begin();
        let request = UpdateProfileRequest {
            username: username.to_string(),
        };
        if let Err(e) = self.profile_repository.update_profile(&request).await {
            self.fail("Failed to update profile".to_string(), &e);
            return Err(ProfileError::from(e));
        }

        info!("Username changed to {}", username);
        let mut state = self.lock();
        state.loading = false;
        if let Some(profile) = state.profile.as_mut() {
            profile.username = request.username;
        }
        state.success_message = Some(PROFILE_UPDATED.to_string());
        Ok(())
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ProfileError> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(ProfileError::ValidationError(
                "Current and new password are required".to_string(),
            ));
        }

        self.begin();
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        match self.profile_repository.change_password(&request).await {
            Ok(response) => {
                info!("Password changed");
                let mut state = self.lock();
                state.loading = false;
                state.success_message = Some(
                    response
                        .message
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| PASSWORD_CHANGED.to_string()),
                );
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    ApiClientError::Status { message, .. } => message.clone(),
                    ApiClientError::Validation { .. } => e.user_message(),
                    _ => "Failed to change password".to_string(),
                };
                self.fail(message, &e);
                Err(ProfileError::from(e))
            }
        }
    }
}
