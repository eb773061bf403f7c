use super::util::is_fk_violation;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const BOOK_COLUMNS: &str = "id, title, category_id, description, image_url, release_year, \
     price, total_page, thickness, created_at, created_by, modified_at, modified_by";

pub struct PgBookRepo {
    pool: PgPool,
}

impl PgBookRepo {
    pub fn new(pool: PgPool) -> Self {
        PgBookRepo { pool }
    }

    fn row_to_book(row: PgRow) -> Result<Book, CatalogError> {
        let store = |e: sqlx::Error| CatalogError::Store(e.to_string());
        let thickness: String = row.try_get("thickness").map_err(store)?;
        Ok(Book {
            id: row.try_get("id").map_err(store)?,
            title: row.try_get("title").map_err(store)?,
            category_id: row.try_get("category_id").map_err(store)?,
            description: row.try_get("description").map_err(store)?,
            image_url: row.try_get("image_url").map_err(store)?,
            release_year: row.try_get("release_year").map_err(store)?,
            price: row.try_get("price").map_err(store)?,
            total_page: row.try_get("total_page").map_err(store)?,
            thickness: thickness.parse().map_err(CatalogError::Store)?,
            created_at: row.try_get("created_at").map_err(store)?,
            created_by: row.try_get("created_by").map_err(store)?,
            modified_at: row.try_get("modified_at").map_err(store)?,
            modified_by: row.try_get("modified_by").map_err(store)?,
        })
    }

    fn write_error(e: sqlx::Error) -> CatalogError {
        if is_fk_violation(&e) {
            CatalogError::InvalidInput("category does not exist".to_string())
        } else {
            CatalogError::Store(e.to_string())
        }
    }

    async fn fetch_books(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Book>, CatalogError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        rows.into_iter().map(Self::row_to_book).collect()
    }
}

#[async_trait::async_trait]
impl BookRepo for PgBookRepo {
    async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title ASC");
        self.fetch_books(sqlx::query(&sql)).await
    }

    async fn list_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, CatalogError> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE category_id = $1 ORDER BY title ASC"
        );
        self.fetch_books(sqlx::query(&sql).bind(category_id)).await
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, CatalogError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row_opt = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_book).transpose()
    }

    async fn insert(&self, book: &Book) -> Result<(), CatalogError> {
        let sql = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        );
        sqlx::query(&sql)
            .bind(book.id)
            .bind(&book.title)
            .bind(book.category_id)
            .bind(&book.description)
            .bind(&book.image_url)
            .bind(book.release_year)
            .bind(book.price)
            .bind(book.total_page)
            .bind(book.thickness.as_str())
            .bind(book.created_at)
            .bind(book.created_by)
            .bind(book.modified_at)
            .bind(book.modified_by)
            .execute(&self.pool)
            .await
            .map_err(Self::write_error)?;

        Ok(())
    }

    async fn update(&self, book: &Book) -> Result<bool, CatalogError> {
        let result = sqlx::query(
            r#"
UPDATE books
SET title = $2, category_id = $3, description = $4, image_url = $5, release_year = $6,
    price = $7, total_page = $8, thickness = $9, modified_at = $10, modified_by = $11
WHERE id = $1
"#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.category_id)
        .bind(&book.description)
        .bind(&book.image_url)
        .bind(book.release_year)
        .bind(book.price)
        .bind(book.total_page)
        .bind(book.thickness.as_str())
        .bind(book.modified_at)
        .bind(book.modified_by)
        .execute(&self.pool)
        .await
        .map_err(Self::write_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: BookId) -> Result<bool, CatalogError> {
        let result = sqlx::query(r#"DELETE FROM books WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
