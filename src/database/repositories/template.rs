//! Template repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::template::{Template, TemplateKind};
use crate::utils::errors::LottoBotError;

const TEMPLATE_COLUMNS: &str = "id, kind, owner_telegram_id, body, updated_at";

#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Template override for a specific owner
    pub async fn find_for_owner(
        &self,
        kind: TemplateKind,
        owner_telegram_id: i64,
    ) -> Result<Option<Template>, LottoBotError> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE kind = $1 AND owner_telegram_id = $2"
        ))
        .bind(kind.as_str())
        .bind(owner_telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Global override (NULL owner)
    pub async fn find_global(&self, kind: TemplateKind) -> Result<Option<Template>, LottoBotError> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE kind = $1 AND owner_telegram_id IS NULL"
        ))
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    /// Insert or replace a template body for (kind, owner). A NULL owner
    /// writes the global override. Done as check-then-write because the
    /// uniqueness is enforced by partial indexes.
    pub async fn upsert(
        &self,
        kind: TemplateKind,
        owner_telegram_id: Option<i64>,
        body: &str,
    ) -> Result<Template, LottoBotError> {
        let existing = match owner_telegram_id {
            Some(owner) => self.find_for_owner(kind, owner).await?,
            None => self.find_global(kind).await?,
        };

        let template = if let Some(existing) = existing {
            sqlx::query_as::<_, Template>(&format!(
                "UPDATE templates SET body = $2, updated_at = $3 WHERE id = $1 RETURNING {TEMPLATE_COLUMNS}"
            ))
            .bind(existing.id)
            .bind(body)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Template>(&format!(
                r#"
                INSERT INTO templates (kind, owner_telegram_id, body, updated_at)
                VALUES ($1, $2, $3, $4)
                RETURNING {TEMPLATE_COLUMNS}
                "#
            ))
            .bind(kind.as_str())
            .bind(owner_telegram_id)
            .bind(body)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?
        };

        Ok(template)
    }

    /// All overrides for one owner
    pub async fn list_for_owner(&self, owner_telegram_id: i64) -> Result<Vec<Template>, LottoBotError> {
        let templates = sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE owner_telegram_id = $1 ORDER BY kind ASC"
        ))
        .bind(owner_telegram_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    /// Delete an owner's override, falling back to the global/built-in body
    pub async fn delete_for_owner(
        &self,
        kind: TemplateKind,
        owner_telegram_id: i64,
    ) -> Result<bool, LottoBotError> {
        let result = sqlx::query("DELETE FROM templates WHERE kind = $1 AND owner_telegram_id = $2")
            .bind(kind.as_str())
            .bind(owner_telegram_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
