use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Categories and books held together so references can be checked.
#[derive(Default)]
pub struct MemoryCatalogRepo {
    categories: DashMap<CategoryId, Category>,
    books: DashMap<BookId, Book>,
}

impl MemoryCatalogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_books(&self, filter: impl Fn(&Book) -> bool) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter(|b| filter(b.value()))
            .map(|b| b.value().clone())
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        books
    }

    fn name_taken(&self, name: &str, except: CategoryId) -> bool {
        self.categories
            .iter()
            .any(|c| c.name == name && c.id != except)
    }
}

#[async_trait::async_trait]
impl CategoryRepo for MemoryCatalogRepo {
    async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        let mut categories: Vec<Category> =
            self.categories.iter().map(|c| c.value().clone()).collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>, CatalogError> {
        Ok(self.categories.get(&id).map(|c| c.value().clone()))
    }

    async fn insert(&self, category: &Category) -> Result<(), CatalogError> {
        if self.name_taken(&category.name, category.id) {
            return Err(CatalogError::Conflict(
                "category name already exists".to_string(),
            ));
        }
        self.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<bool, CatalogError> {
        if self.name_taken(&category.name, category.id) {
            return Err(CatalogError::Conflict(
                "category name already exists".to_string(),
            ));
        }
        match self.categories.get_mut(&category.id) {
            Some(mut existing) => {
                *existing = category.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CatalogError> {
        if self.books.iter().any(|b| b.category_id == id) {
            return Err(CatalogError::Conflict("category still has books".to_string()));
        }
        Ok(self.categories.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl BookRepo for MemoryCatalogRepo {
    async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.sorted_books(|_| true))
    }

    async fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, CatalogError> {
        Ok(self.sorted_books(|b| b.category_id == category_id))
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, CatalogError> {
        Ok(self.books.get(&id).map(|b| b.value().clone()))
    }

    async fn insert(&self, book: &Book) -> Result<(), CatalogError> {
        if !self.categories.contains_key(&book.category_id) {
            return Err(CatalogError::InvalidInput(
                "category does not exist".to_string(),
            ));
        }
        self.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn update(&self, book: &Book) -> Result<bool, CatalogError> {
        if !self.categories.contains_key(&book.category_id) {
            return Err(CatalogError::InvalidInput(
                "category does not exist".to_string(),
            ));
        }
        match self.books.get_mut(&book.id) {
            Some(mut existing) => {
                *existing = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: BookId) -> Result<bool, CatalogError> {
        Ok(self.books.remove(&id).is_some())
    }
}
