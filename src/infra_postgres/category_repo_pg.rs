use super::util::{is_fk_violation, is_unique_violation};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgCategoryRepo {
    pool: PgPool,
}

impl PgCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        PgCategoryRepo { pool }
    }

    fn row_to_category(row: PgRow) -> Result<Category, CatalogError> {
        let store = |e: sqlx::Error| CatalogError::Store(e.to_string());
        Ok(Category {
            id: row.try_get("id").map_err(store)?,
            name: row.try_get("name").map_err(store)?,
            created_at: row.try_get("created_at").map_err(store)?,
            created_by: row.try_get("created_by").map_err(store)?,
            modified_at: row.try_get("modified_at").map_err(store)?,
            modified_by: row.try_get("modified_by").map_err(store)?,
        })
    }

    fn write_error(e: sqlx::Error) -> CatalogError {
        if is_unique_violation(&e) {
            CatalogError::Conflict("category name already exists".to_string())
        } else {
            CatalogError::Store(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl CategoryRepo for PgCategoryRepo {
    async fn list(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = sqlx::query(
            r#"
SELECT id, name, created_at, created_by, modified_at, modified_by
FROM categories
ORDER BY name ASC
"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>, CatalogError> {
        let row_opt = sqlx::query(
            r#"
SELECT id, name, created_at, created_by, modified_at, modified_by
FROM categories
WHERE id = $1
"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_category).transpose()
    }

    async fn insert(&self, category: &Category) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
INSERT INTO categories (id, name, created_at, created_by, modified_at, modified_by)
VALUES ($1, $2, $3, $4, $5, $6)
"#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .bind(category.created_by)
        .bind(category.modified_at)
        .bind(category.modified_by)
        .execute(&self.pool)
        .await
        .map_err(Self::write_error)?;

        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<bool, CatalogError> {
        let result = sqlx::query(
            r#"
UPDATE categories
SET name = $2, modified_at = $3, modified_by = $4
WHERE id = $1
"#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.modified_at)
        .bind(category.modified_by)
        .execute(&self.pool)
        .await
        .map_err(Self::write_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CatalogError> {
        let result = sqlx::query(r#"DELETE FROM categories WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_fk_violation(&e) {
                    CatalogError::Conflict("category still has books".to_string())
                } else {
                    CatalogError::Store(e.to_string())
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}
