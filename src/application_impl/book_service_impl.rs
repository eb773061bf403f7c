use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealBookService {
    book_repo: Arc<dyn BookRepo>,
}

impl RealBookService {
    pub fn new(book_repo: Arc<dyn BookRepo>) -> Self {
        Self { book_repo }
    }
}

fn invalid(message: impl Into<String>) -> CatalogError {
    CatalogError::InvalidInput(message.into())
}

fn validate_title(title: &str) -> Result<(), CatalogError> {
    if title.trim().is_empty() {
        return Err(invalid("title is required"));
    }
    if title.chars().count() > BOOK_TITLE_MAX_LEN {
        return Err(invalid(format!(
            "title must be at most {BOOK_TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_release_year(year: i32) -> Result<(), CatalogError> {
    if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
        return Err(invalid(format!(
            "release_year must be between {MIN_RELEASE_YEAR} and {MAX_RELEASE_YEAR}"
        )));
    }
    Ok(())
}

fn validate_counts(price: f64, total_page: i32) -> Result<(), CatalogError> {
    if !price.is_finite() || price < 0.0 {
        return Err(invalid("price must be a non-negative number"));
    }
    if total_page <= 0 {
        return Err(invalid("total_page must be positive"));
    }
    Ok(())
}

fn validate(book: &Book) -> Result<(), CatalogError> {
    validate_title(&book.title)?;
    validate_release_year(book.release_year)?;
    validate_counts(book.price, book.total_page)
}

/// Apply a partial update. Thickness follows `total_page`.
fn apply_patch(book: &mut Book, patch: BookPatch) {
    let BookPatch {
        title,
        category_id,
        description,
        image_url,
        release_year,
        price,
        total_page,
    } = patch;

    if let Some(title) = title {
        book.title = title;
    }
    if let Some(category_id) = category_id {
        book.category_id = category_id;
    }
    if let Some(description) = description {
        book.description = description;
    }
    if let Some(image_url) = image_url {
        book.image_url = image_url;
    }
    if let Some(release_year) = release_year {
        book.release_year = release_year;
    }
    if let Some(price) = price {
        book.price = price;
    }
    if let Some(total_page) = total_page {
        book.total_page = total_page;
        book.thickness = Thickness::for_pages(total_page);
    }
}

#[async_trait::async_trait]
impl BookService for RealBookService {
    async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        self.book_repo.list().await
    }

    async fn get(&self, id: BookId) -> Result<Book, CatalogError> {
        self.book_repo.get(id).await?.ok_or(CatalogError::NotFound)
    }

    async fn create(&self, actor: UserId, input: NewBook) -> Result<Book, CatalogError> {
        let now = Utc::now();
        let book = Book {
            id: BookId::new(),
            title: input.title,
            category_id: input.category_id,
            description: input.description,
            image_url: input.image_url,
            release_year: input.release_year,
            price: input.price,
            total_page: input.total_page,
            thickness: Thickness::for_pages(input.total_page),
            created_at: now,
            created_by: Some(actor),
            modified_at: now,
            modified_by: Some(actor),
        };
        validate(&book)?;
        self.book_repo.insert(&book).await?;
        Ok(book)
    }

    async fn update(
        &self,
        actor: UserId,
        id: BookId,
        patch: BookPatch,
    ) -> Result<Book, CatalogError> {
        let mut book = self.get(id).await?;
        apply_patch(&mut book, patch);
        validate(&book)?;
        book.modified_at = Utc::now();
        book.modified_by = Some(actor);

        if !self.book_repo.update(&book).await? {
            return Err(CatalogError::NotFound);
        }
        Ok(book)
    }

    async fn delete(&self, id: BookId) -> Result<(), CatalogError> {
        if !self.book_repo.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        let now = Utc::now();
        Book {
            id: BookId::new(),
            title: "The Rust Programming Language".to_string(),
            category_id: CategoryId::new(),
            description: String::new(),
            image_url: String::new(),
            release_year: 2018,
            price: 39.5,
            total_page: 80,
            thickness: Thickness::Thin,
            created_at: now,
            created_by: None,
            modified_at: now,
            modified_by: None,
        }
    }

    #[test]
    fn release_year_range_is_inclusive() {
        assert!(validate_release_year(1980).is_ok());
        assert!(validate_release_year(2024).is_ok());
        assert!(validate_release_year(1979).is_err());
        assert!(validate_release_year(2025).is_err());
    }

    #[test]
    fn title_limits() {
        assert!(validate_title("").is_err());
        assert!(validate_title(&"t".repeat(200)).is_ok());
        assert!(validate_title(&"t".repeat(201)).is_err());
    }

    #[test]
    fn patch_recomputes_thickness() {
        let mut book = sample();
        apply_patch(
            &mut book,
            BookPatch {
                total_page: Some(350),
                ..Default::default()
            },
        );
        assert_eq!(book.thickness, Thickness::Thick);
        assert_eq!(book.total_page, 350);
        assert_eq!(book.title, "The Rust Programming Language");
    }

    #[test]
    fn patch_leaves_unset_fields() {
        let mut book = sample();
        apply_patch(
            &mut book,
            BookPatch {
                price: Some(12.0),
                release_year: Some(1975),
                ..Default::default()
            },
        );
        assert_eq!(book.price, 12.0);
        assert_eq!(book.thickness, Thickness::Thin);
        assert!(validate(&book).is_err());
    }

    #[tokio::test]
    async fn create_derives_thickness_and_checks_category() {
        let repo = Arc::new(crate::infra_memory::MemoryCatalogRepo::new());
        let books = RealBookService::new(repo.clone());
        let actor = UserId::new();

        let orphan = NewBook {
            title: "Dune".to_string(),
            category_id: CategoryId::new(),
            description: String::new(),
            image_url: String::new(),
            release_year: 1990,
            price: 10.0,
            total_page: 412,
        };
        let result = books.create(actor, orphan).await;
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));

        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(),
            name: "Sci-Fi".to_string(),
            created_at: now,
            created_by: Some(actor),
            modified_at: now,
            modified_by: Some(actor),
        };
        CategoryRepo::insert(repo.as_ref(), &category).await.unwrap();

        let book = books
            .create(
                actor,
                NewBook {
                    title: "Dune".to_string(),
                    category_id: category.id,
                    description: String::new(),
                    image_url: String::new(),
                    release_year: 1990,
                    price: 10.0,
                    total_page: 412,
                },
            )
            .await
            .unwrap();
        assert_eq!(book.thickness, Thickness::Thick);
        assert_eq!(book.created_by, Some(actor));

        let editor = UserId::new();
        let updated = books
            .update(
                editor,
                book.id,
                BookPatch {
                    total_page: Some(90),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.thickness, Thickness::Thin);
        assert_eq!(updated.modified_by, Some(editor));
        assert_eq!(updated.created_by, Some(actor));
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let books = RealBookService::new(Arc::new(crate::infra_memory::MemoryCatalogRepo::new()));
        assert!(matches!(books.get(BookId::new()).await, Err(CatalogError::NotFound)));
        assert!(matches!(books.delete(BookId::new()).await, Err(CatalogError::NotFound)));
    }
}
