use crate::application_port::CatalogError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CategoryRepo: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, CatalogError>;
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, CatalogError>;
    /// Fails with `Conflict` when the name is taken.
    async fn insert(&self, category: &Category) -> Result<(), CatalogError>;
    /// Returns `false` when no row matched.
    async fn update(&self, category: &Category) -> Result<bool, CatalogError>;
    /// Returns `false` when no row matched. Fails with `Conflict` while books reference it.
    async fn delete(&self, id: CategoryId) -> Result<bool, CatalogError>;
}
