use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub category_id: CategoryId,
    pub description: String,
    pub image_url: String,
    pub release_year: i32,
    pub price: f64,
    pub total_page: i32,
}

#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub release_year: Option<i32>,
    pub price: Option<f64>,
    pub total_page: Option<i32>,
}

#[async_trait::async_trait]
pub trait CategoryService: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, CatalogError>;
    async fn get(&self, id: CategoryId) -> Result<Category, CatalogError>;
    async fn create(&self, actor: UserId, name: &str) -> Result<Category, CatalogError>;
    async fn rename(&self, actor: UserId, id: CategoryId, name: &str)
    -> Result<Category, CatalogError>;
    async fn delete(&self, id: CategoryId) -> Result<(), CatalogError>;
    async fn list_books(&self, id: CategoryId) -> Result<Vec<Book>, CatalogError>;
}

#[async_trait::async_trait]
pub trait BookService: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, CatalogError>;
    async fn get(&self, id: BookId) -> Result<Book, CatalogError>;
    async fn create(&self, actor: UserId, input: NewBook) -> Result<Book, CatalogError>;
    async fn update(&self, actor: UserId, id: BookId, patch: BookPatch)
    -> Result<Book, CatalogError>;
    async fn delete(&self, id: BookId) -> Result<(), CatalogError>;
}
