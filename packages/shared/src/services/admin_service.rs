use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

use crate::models::user::{AdminUser, LinkingPermissionRequest};
use crate::repositories::admin_repository::AdminRepository;
use crate::repositories::errors::api_client_errors::ApiClientError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub users: Vec<AdminUser>,
    pub loading: bool,
    pub error: Option<String>,
}

/// User administration. Failures are recorded on the state and reported
/// as `false`, never raised.
pub struct AdminStore {
    admin_repository: Arc<dyn AdminRepository>,
    state: Mutex<AdminState>,
}

impl AdminStore {
    pub fn new(admin_repository: Arc<dyn AdminRepository>) -> Self {
        AdminStore {
            admin_repository,
            state: Mutex::new(AdminState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AdminState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> AdminState {
        self.lock().clone()
    }

    fn fail(&self, fallback: &str, err: &ApiClientError) -> bool {
        let message = match err {
            ApiClientError::Status { message, .. } => message.clone(),
            _ => fallback.to_string(),
        };
        error!("{}: {}", fallback, err);
        let mut state = self.lock();
        state.loading = false;
        state.error = Some(message);
        false
    }

    fn patch_user(&self, user_id: i64, patch: impl FnOnce(&mut AdminUser)) {
        let mut state = self.lock();
        match state.users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => patch(user),
            None => warn!("User {} is not cached", user_id),
        }
    }

    pub async fn fetch_all_users(&self) -> bool {
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }
        match self.admin_repository.list_users().await {
            Ok(users) => {
                info!("Loaded {} users", users.len());
                let mut state = self.lock();
                state.loading = false;
                state.users = users;
                true
            }
            Err(e) => self.fail("Failed to fetch users", &e),
        }
    }

    pub async fn set_user_active_status(&self, user_id: i64, active: bool) -> bool {
        self.lock().error = None;
        let result = if active {
            self.admin_repository.activate_user(user_id).await
        } else {
            self.admin_repository.deactivate_user(user_id).await
        };
        if let Err(e) = result {
            return self.fail("Failed to update status", &e);
        }

        info!("User {} active: {}", user_id, active);
        self.patch_user(user_id, |user| user.is_active = active);
        true
    }

    pub async fn set_user_linking_status(&self, user_id: i64, can_link: bool) -> bool {
        self.lock().error = None;
        let request = LinkingPermissionRequest { can_link };
        if let Err(e) = self
            .admin_repository
            .set_linking_permission(user_id, &request)
            .await
        {
            return self.fail("Failed to update linking permission", &e);
        }

        info!("User {} can link accounts: {}", user_id, can_link);
        self.patch_user(user_id, |user| user.can_link_accounts = can_link);
        true
    }

    pub async fn delete_user(&self, user_id: i64) -> bool {
        self.lock().error = None;
        if let Err(e) = self.admin_repository.delete_user(user_id).await {
            return self.fail("Failed to delete user", &e);
        }

        info!("Deleted user {}", user_id);
        self.lock().users.retain(|user| user.id != user_id);
        true
    }
}
