use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::debug;

use shared::config::ClientConfig;
use shared::repositories::api_client::{HttpApiClient, UnauthorizedHandler};
use shared::repositories::storage::{ClientStorage, FileStorage, TokenStore};
use shared::services::admin_service::AdminStore;
use shared::services::category_service::CategoryCatalog;
use shared::services::expense_service::ExpenseLedger;
use shared::services::navigation::Route;
use shared::services::preferences_service::Preferences;
use shared::services::profile_service::ProfileStore;
use shared::services::session_service::SessionManager;

use crate::navigator::CliNavigator;

/// Every store the front end talks to, wired to one gateway and one storage.
pub struct AppContext {
    pub session: Arc<SessionManager>,
    pub ledger: Arc<ExpenseLedger>,
    pub catalog: Arc<CategoryCatalog>,
    pub profile: ProfileStore,
    pub admin: AdminStore,
    pub preferences: Preferences,
    pub navigator: Arc<CliNavigator>,
}

impl AppContext {
    pub fn build(config: &ClientConfig) -> Result<Self> {
        let storage: Arc<dyn ClientStorage> = Arc::new(
            FileStorage::open(&config.storage_path).with_context(|| {
                format!(
                    "failed to open client storage at {}",
                    config.storage_path.display()
                )
            })?,
        );
        let token_store = TokenStore::new(storage.clone());

        let client = Arc::new(
            HttpApiClient::new(config, Arc::new(token_store.clone()))
                .context("failed to build HTTP client")?,
        );
        debug!("Using API at {}", client.base_url());

        let navigator = Arc::new(CliNavigator::default());
        let session = Arc::new(SessionManager::new(
            client.clone(),
            client.clone(),
            client.clone(),
            token_store,
            navigator.clone(),
        ));
        let handler: Arc<dyn UnauthorizedHandler> = session.clone();
        client.set_unauthorized_handler(Arc::downgrade(&handler));

        let ledger = Arc::new(ExpenseLedger::new(client.clone(), client.clone()));
        let catalog = Arc::new(CategoryCatalog::new(client.clone()));
        session.register_dependent(ledger.clone());
        session.register_dependent(catalog.clone());

        Ok(AppContext {
            session,
            ledger,
            catalog,
            profile: ProfileStore::new(client.clone()),
            admin: AdminStore::new(client),
            preferences: Preferences::new(storage),
            navigator,
        })
    }

    /// Restores the stored session and fails unless it grants access to `path`.
    pub async fn require(&self, path: &str) -> Result<()> {
        match self.session.guard_route(path).await {
            None => Ok(()),
            Some(Route::Login) => bail!("Not signed in. Run `finance login` first."),
            Some(_) => bail!("Your account cannot access {}", path),
        }
    }
}
