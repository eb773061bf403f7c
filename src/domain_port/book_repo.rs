use crate::application_port::CatalogError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait BookRepo: Send + Sync {
    /// All books ordered by title.
    async fn list(&self) -> Result<Vec<Book>, CatalogError>;
    async fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, CatalogError>;
    async fn get(&self, id: BookId) -> Result<Option<Book>, CatalogError>;
    /// Fails with `InvalidInput` when the category does not exist.
    async fn insert(&self, book: &Book) -> Result<(), CatalogError>;
    async fn update(&self, book: &Book) -> Result<bool, CatalogError>;
    async fn delete(&self, id: BookId) -> Result<bool, CatalogError>;
}
