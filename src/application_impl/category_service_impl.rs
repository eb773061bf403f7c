use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealCategoryService {
    category_repo: Arc<dyn CategoryRepo>,
    book_repo: Arc<dyn BookRepo>,
}

impl RealCategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepo>, book_repo: Arc<dyn BookRepo>) -> Self {
        Self {
            category_repo,
            book_repo,
        }
    }

    fn validate_name(name: &str) -> Result<String, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidInput("name is required".to_string()));
        }
        if name.chars().count() > CATEGORY_NAME_MAX_LEN {
            return Err(CatalogError::InvalidInput(format!(
                "name must be at most {CATEGORY_NAME_MAX_LEN} characters"
            )));
        }
        Ok(name.to_string())
    }
}

#[async_trait::async_trait]
impl CategoryService for RealCategoryService {
    async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        self.category_repo.list().await
    }

    async fn get(&self, id: CategoryId) -> Result<Category, CatalogError> {
        self.category_repo
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    async fn create(&self, actor: UserId, name: &str) -> Result<Category, CatalogError> {
        let name = Self::validate_name(name)?;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(),
            name,
            created_at: now,
            created_by: Some(actor),
            modified_at: now,
            modified_by: Some(actor),
        };
        self.category_repo.insert(&category).await?;
        Ok(category)
    }

    async fn rename(
        &self,
        actor: UserId,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, CatalogError> {
        let name = Self::validate_name(name)?;
        let mut category = self.get(id).await?;
        category.name = name;
        category.modified_at = Utc::now();
        category.modified_by = Some(actor);

        if !self.category_repo.update(&category).await? {
            return Err(CatalogError::NotFound);
        }
        Ok(category)
    }

    async fn delete(&self, id: CategoryId) -> Result<(), CatalogError> {
        if !self.category_repo.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn list_books(&self, id: CategoryId) -> Result<Vec<Book>, CatalogError> {
        self.get(id).await?;
        self.book_repo.list_by_category(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealBookService;
    use crate::infra_memory::MemoryCatalogRepo;

    fn services() -> (RealCategoryService, RealBookService) {
        let repo = Arc::new(MemoryCatalogRepo::new());
        (
            RealCategoryService::new(repo.clone(), repo.clone()),
            RealBookService::new(repo),
        )
    }

    fn new_book(category_id: CategoryId, title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            category_id,
            description: String::new(),
            image_url: String::new(),
            release_year: 2015,
            price: 20.0,
            total_page: 120,
        }
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(
            RealCategoryService::validate_name("  Fiction ").unwrap(),
            "Fiction"
        );
        assert!(RealCategoryService::validate_name("   ").is_err());
        assert!(RealCategoryService::validate_name(&"x".repeat(100)).is_ok());
        assert!(RealCategoryService::validate_name(&"x".repeat(101)).is_err());
    }

    #[tokio::test]
    async fn create_records_actor_and_rejects_duplicates() {
        let (categories, _) = services();
        let actor = UserId::new();

        let created = categories.create(actor, " Fiction ").await.unwrap();
        assert_eq!(created.name, "Fiction");
        assert_eq!(created.created_by, Some(actor));
        assert_eq!(created.modified_by, Some(actor));

        let dup = categories.create(actor, "Fiction").await;
        assert!(matches!(dup, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn rename_updates_modifier_only() {
        let (categories, _) = services();
        let creator = UserId::new();
        let editor = UserId::new();
        let created = categories.create(creator, "Poetry").await.unwrap();

        let renamed = categories.rename(editor, created.id, "Verse").await.unwrap();
        assert_eq!(renamed.name, "Verse");
        assert_eq!(renamed.created_by, Some(creator));
        assert_eq!(renamed.modified_by, Some(editor));

        let missing = categories.rename(editor, CategoryId::new(), "Other").await;
        assert!(matches!(missing, Err(CatalogError::NotFound)));
    }

    #[tokio::test]
    async fn category_with_books_cannot_be_deleted() {
        let (categories, books) = services();
        let actor = UserId::new();
        let category = categories.create(actor, "Science").await.unwrap();
        let book = books
            .create(actor, new_book(category.id, "Cosmos"))
            .await
            .unwrap();

        let listed = categories.list_books(category.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, book.id);

        let blocked = categories.delete(category.id).await;
        assert!(matches!(blocked, Err(CatalogError::Conflict(_))));

        books.delete(book.id).await.unwrap();
        categories.delete(category.id).await.unwrap();
        assert!(matches!(
            categories.get(category.id).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn books_of_unknown_category_is_not_found() {
        let (categories, _) = services();
        let result = categories.list_books(CategoryId::new()).await;
        assert!(matches!(result, Err(CatalogError::NotFound)));
    }
}
