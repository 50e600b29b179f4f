// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{ApplianceCategory, Brand, DataImport, ImportType, Product},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  BRANDS AND CATEGORIES
    // =========================================================================

    /// Get-or-create by unique name. The no-op DO UPDATE makes RETURNING work
    /// on the conflict path as well.
    pub async fn upsert_brand<'e, E>(&self, executor: E, name: &str) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(brand)
    }

    pub async fn upsert_category<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<ApplianceCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, ApplianceCategory>(
            r#"
            INSERT INTO appliance_categories (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(category)
    }

    // =========================================================================
    //  PRODUCTS
    // =========================================================================

    /// Upserts one product keyed by model code. A later sighting of the same
    /// code fills in whichever tier prices it carries without clobbering the
    /// ones already stored, and `base_price` keeps the minimum price seen
    /// across all sightings (Postgres LEAST skips NULLs).
    pub async fn upsert_product<'e, E>(
        &self,
        executor: E,
        brand_id: Uuid,
        category_id: Uuid,
        model_code: &str,
        name: &str,
        series: Option<&str>,
        price_low: Option<Decimal>,
        price_mid: Option<Decimal>,
        price_high: Option<Decimal>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let base_price = [price_low, price_mid, price_high]
            .into_iter()
            .flatten()
            .min();

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (brand_id, category_id, model_code, name, series,
                 price_low, price_mid, price_high, base_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (model_code) DO UPDATE SET
                brand_id = EXCLUDED.brand_id,
                category_id = EXCLUDED.category_id,
                name = EXCLUDED.name,
                series = COALESCE(EXCLUDED.series, products.series),
                price_low = COALESCE(EXCLUDED.price_low, products.price_low),
                price_mid = COALESCE(EXCLUDED.price_mid, products.price_mid),
                price_high = COALESCE(EXCLUDED.price_high, products.price_high),
                base_price = LEAST(products.base_price, EXCLUDED.base_price),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(brand_id)
        .bind(category_id)
        .bind(model_code)
        .bind(name)
        .bind(series)
        .bind(price_low)
        .bind(price_mid)
        .bind(price_high)
        .bind(base_price)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    // =========================================================================
    //  IMPORT RUNS
    // =========================================================================

    pub async fn insert_import(
        &self,
        filename: &str,
        import_type: ImportType,
        created_by: Uuid,
    ) -> Result<DataImport, AppError> {
        let import = sqlx::query_as::<_, DataImport>(
            r#"
            INSERT INTO data_imports (filename, import_type, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(filename)
        .bind(import_type)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(import)
    }

    pub async fn find_import(&self, id: Uuid) -> Result<Option<DataImport>, AppError> {
        let import = sqlx::query_as::<_, DataImport>("SELECT * FROM data_imports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(import)
    }

    pub async fn bump_processed<'e, E>(
        &self,
        executor: E,
        import_id: Uuid,
        count: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE data_imports SET records_processed = records_processed + $1 WHERE id = $2")
            .bind(count)
            .bind(import_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Appends one structured row failure and bumps the failure counter.
    /// Runs on the pool, outside the (rolled-back) row transaction.
    pub async fn record_row_failure(
        &self,
        import_id: Uuid,
        row: usize,
        message: &str,
    ) -> Result<(), AppError> {
        let entry = json!([{ "row": row, "message": message }]);

        sqlx::query(
            r#"
            UPDATE data_imports
            SET records_failed = records_failed + 1,
                row_errors = row_errors || $1
            WHERE id = $2
            "#,
        )
        .bind(entry)
        .bind(import_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Terminal transition; a no-op if the run already finished.
    pub async fn mark_completed(&self, import_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE data_imports
            SET status = 'completed', completed_at = NOW()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(import_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Terminal transition for fatal, non-row-scoped errors.
    pub async fn mark_failed(&self, import_id: Uuid, fatal_error: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE data_imports
            SET status = 'failed', fatal_error = $1, completed_at = NOW()
            WHERE id = $2 AND status = 'processing'
            "#,
        )
        .bind(fatal_error)
        .bind(import_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
