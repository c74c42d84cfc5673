use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::models::category::{Category, CategoryPayload, CategoryPercentageUpdate};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::errors::api_client_errors::ApiClientError;
use crate::services::context::ContextRefresh;
use crate::services::errors::category_service_errors::CategoryError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub categories: Vec<Category>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

pub fn category_by_id<'a>(state: &'a CatalogState, category_id: &str) -> Option<&'a Category> {
    state
        .categories
        .iter()
        .find(|category| category.id == category_id)
}

/// Case-insensitive lookup by name.
pub fn category_by_name<'a>(state: &'a CatalogState, name: &str) -> Option<&'a Category> {
    let wanted = name.trim().to_uppercase();
    state
        .categories
        .iter()
        .find(|category| category.name.to_uppercase() == wanted)
}

struct CatalogInner {
    state: CatalogState,
    generation: u64,
}

/// Category definitions and their ideal share of the monthly budget.
pub struct CategoryCatalog {
    category_repository: Arc<dyn CategoryRepository>,
    inner: Mutex<CatalogInner>,
}

impl CategoryCatalog {
    pub fn new(category_repository: Arc<dyn CategoryRepository>) -> Self {
        CategoryCatalog {
            category_repository,
            inner: Mutex::new(CatalogInner {
                state: CatalogState::default(),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CatalogState {
        self.lock().state.clone()
    }

    pub fn category_by_id(&self, category_id: &str) -> Option<Category> {
        category_by_id(&self.lock().state, category_id).cloned()
    }

    pub fn category_by_name(&self, name: &str) -> Option<Category> {
        category_by_name(&self.lock().state, name).cloned()
    }

    fn record_failure(&self, context: &str, err: &ApiClientError) {
        let message = format!("{}: {}", context, err.user_message());
        error!("{}", message);
        self.lock().state.error = Some(message);
    }

    pub async fn fetch_all_categories(&self) {
        self.load(false).await
    }

    async fn load(&self, force: bool) {
        let generation = {
            let mut inner = self.lock();
            if !force && (inner.state.loading || inner.state.loaded) {
                debug!("Skipping category fetch, already cached or in flight");
                return;
            }
            if force {
                inner.generation += 1;
            }
            inner.state.loading = true;
            inner.state.error = None;
            inner.generation
        };

        let result = self.category_repository.list_categories().await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Discarding superseded category fetch");
            return;
        }
        inner.state.loading = false;
        match result {
            Ok(categories) => {
                debug!("Loaded {} categories", categories.len());
                inner.state.categories = categories.into_iter().map(Category::normalized).collect();
                inner.state.loaded = true;
            }
            Err(e) => {
                let message = format!("Failed to fetch categories: {}", e.user_message());
                error!("{}", message);
                inner.state.error = Some(message);
            }
        }
    }

    pub async fn create_category(&self, name: &str, icon: &str) -> Result<Category, CategoryError> {
        let payload = CategoryPayload::new(name, icon);
        if payload.name.is_empty() {
            return Err(CategoryError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        self.lock().state.error = None;
        match self.category_repository.create_category(&payload).await {
            Ok(category) => {
                let category = category.normalized();
                info!("Created category {} ({})", category.name, category.id);
                self.lock().state.categories.push(category.clone());
                Ok(category)
            }
            Err(e) => {
                self.record_failure("Failed to create category", &e);
                Err(CategoryError::from(e))
            }
        }
    }

    pub async fn update_category(
        &self,
        category_id: &str,
        name: &str,
        icon: &str,
    ) -> Result<(), CategoryError> {
        let payload = CategoryPayload::new(name, icon);
        if payload.name.is_empty() {
            return Err(CategoryError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        self.lock().state.error = None;
        if let Err(e) = self
            .category_repository
            .update_category(category_id, &payload)
            .await
        {
            self.record_failure("Failed to update category", &e);
            return Err(CategoryError::from(e));
        }

        let mut inner = self.lock();
        match inner
            .state
            .categories
            .iter_mut()
            .find(|category| category.id == category_id)
        {
            Some(category) => {
                category.name = payload.name;
                category.icon = payload.icon;
            }
            None => warn!("Updated category {} is not cached", category_id),
        }
        Ok(())
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<(), CategoryError> {
        self.lock().state.error = None;
        if let Err(e) = self.category_repository.delete_category(category_id).await {
            self.record_failure("Failed to delete category", &e);
            return Err(CategoryError::from(e));
        }

        self.lock()
            .state
            .categories
            .retain(|category| category.id != category_id);
        info!("Deleted category {}", category_id);
        Ok(())
    }

    /// Submits ideal percentages keyed by category name. Names that match no
    /// cached category are skipped; if none match, nothing is sent.
    pub async fn save_distribution_rules(
        &self,
        rules: &BTreeMap<String, Decimal>,
    ) -> Result<(), CategoryError> {
        let updates: Vec<CategoryPercentageUpdate> = {
            let inner = self.lock();
            // names that resolve to the same category collapse, the later rule winning
            let mut by_id: BTreeMap<String, Decimal> = BTreeMap::new();
            for (name, percentage) in rules {
                match category_by_name(&inner.state, name) {
                    Some(category) => {
                        by_id.insert(category.id.clone(), *percentage);
                    }
                    None => warn!("Skipping rule for unknown category {}", name),
                }
            }
            by_id
                .into_iter()
                .map(|(category_id, ideal_percentage)| CategoryPercentageUpdate {
                    category_id,
                    ideal_percentage,
                })
                .collect()
        };

        if updates.is_empty() {
            debug!("No distribution rules matched a known category");
            return Ok(());
        }

        self.lock().state.error = None;
        match self
            .category_repository
            .batch_update_percentages(&updates)
            .await
        {
            Ok(()) => {
                let mut inner = self.lock();
                for update in &updates {
                    if let Some(category) = inner
                        .state
                        .categories
                        .iter_mut()
                        .find(|category| category.id == update.category_id)
                    {
                        category.ideal_percentage = Some(update.ideal_percentage);
                    }
                }
                info!("Saved {} distribution rules", updates.len());
                Ok(())
            }
            Err(e) => match e.first_field_message().map(str::to_string) {
                Some(message) => {
                    warn!("Distribution rules rejected: {}", message);
                    self.lock().state.error = Some(message.clone());
                    Err(CategoryError::ValidationError(message))
                }
                None => {
                    self.record_failure("Failed to save distribution rules", &e);
                    Err(CategoryError::from(e))
                }
            },
        }
    }
}

#[async_trait]
impl ContextRefresh for CategoryCatalog {
    async fn refresh_context(&self) {
        self.load(true).await
    }

    fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CatalogState::default();
        inner.generation += 1;
    }
}
